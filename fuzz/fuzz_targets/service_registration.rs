#![no_main]

use libfuzzer_sys::fuzz_target;
use scoped_injector::{Lifetime, Provision, Resolver, ServiceCollection, Token};

fn lifetime_of(byte: u8) -> Lifetime {
    match byte % 3 {
        0 => Lifetime::Singleton,
        1 => Lifetime::Scoped,
        _ => Lifetime::Transient,
    }
}

// Each pair of bytes is one registration: (token index, lifetime + value/factory bit).
// The first lifetime registered for a token must stick; conflicting or
// scoped-value registrations must fail without touching the table.
fuzz_target!(|data: &[u8]| {
    let tokens: Vec<Token<u8>> = (0..4).map(|i| Token::new(format!("t{i}"))).collect();
    let mut first: [Option<Lifetime>; 4] = [None; 4];
    let mut services = ServiceCollection::new();

    for chunk in data.chunks_exact(2) {
        let index = usize::from(chunk[0] % 4);
        let lifetime = lifetime_of(chunk[1]);
        let value = chunk[1];
        let provision = if chunk[1] & 0x80 == 0 {
            Provision::value(value)
        } else {
            Provision::factory(move |_| Ok(value))
        };
        let is_value = chunk[1] & 0x80 == 0;

        let result = services.add_token(&tokens[index], lifetime, provision);
        let expect_ok = first[index].map_or(true, |l| l == lifetime) && !(is_value && lifetime == Lifetime::Scoped);
        assert_eq!(result.is_ok(), expect_ok);
        if expect_ok && first[index].is_none() {
            first[index] = Some(lifetime);
        }
        assert_eq!(services.lifetime_of(&tokens[index].key()), first[index]);
    }

    let provider = services.build();
    let scope = provider.create_scope();
    for (token, lifetime) in tokens.iter().zip(first) {
        let resolved = scope.get_optional_token(token).unwrap();
        assert_eq!(resolved.is_some(), lifetime.is_some());
    }
    assert_eq!(scope.instantiation_depth(), 0);
});
