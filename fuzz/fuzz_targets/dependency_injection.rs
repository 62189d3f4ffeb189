#![no_main]

use libfuzzer_sys::fuzz_target;
use scoped_injector::{DiError, Resolver, ServiceCollection, Token};

const NODES: usize = 8;

// Builds a random dependency graph over token-identified services: byte i
// selects the dependencies of node i as a bit mask. Every resolution must
// either succeed or report a cycle, and no resolution may leave frames behind.
fuzz_target!(|data: &[u8]| {
    if data.len() < NODES + 1 {
        return;
    }

    let tokens: Vec<Token<u64>> = (0..NODES).map(|i| Token::new(format!("n{i}"))).collect();
    let mut services = ServiceCollection::new();

    for (i, token) in tokens.iter().enumerate() {
        let deps: Vec<Token<u64>> = (0..NODES)
            .filter(|j| data[i] & (1 << j) != 0)
            .map(|j| tokens[j].clone())
            .collect();
        let lifetime_byte = data[NODES];
        let factory = move |r: &scoped_injector::ResolverContext<'_>| -> scoped_injector::DiResult<u64> {
            let mut sum = 1u64;
            for dep in &deps {
                sum = sum.saturating_add(*r.get_token(dep)?);
            }
            Ok(sum)
        };
        let result = match (lifetime_byte >> (i % 8)) & 1 {
            0 => services.add_transient_token_factory(token, factory),
            _ => services.add_scoped_token_factory(token, factory),
        };
        assert!(result.is_ok());
    }

    let provider = services.build();
    let scope = provider.create_scope();
    for token in &tokens {
        match scope.get_token(token) {
            Ok(value) => assert!(*value >= 1),
            Err(DiError::Circular(chain)) => assert!(!chain.is_empty() && chain.len() <= NODES),
            Err(other) => panic!("unexpected error: {other}"),
        }
        assert_eq!(scope.instantiation_depth(), 0);
    }
});
