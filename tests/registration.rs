use scoped_injector::{
    key_of_type, ConfigurationError, Declaration, DiError, DiResult, Injectable, InjectableOptions,
    Lifetime, Provision, Resolver, ResolverContext, ServiceCollection, Token,
};
use std::sync::Arc;

struct Service(&'static str);

struct Clock;
impl Injectable for Clock {
    fn construct(_: &ResolverContext<'_>) -> DiResult<Self> {
        Ok(Clock)
    }
}

struct Audit {
    clock: Arc<Clock>,
}
impl Injectable for Audit {
    fn construct(ctx: &ResolverContext<'_>) -> DiResult<Self> {
        Ok(Audit { clock: ctx.get_service::<Clock>()? })
    }
}

#[test]
fn singleton_over_scoped_is_rejected_and_scoped_survives() {
    let mut services = ServiceCollection::new();
    services
        .add_scoped_factory::<Service, _>(|_| Ok(Service("scoped")))
        .unwrap();

    let err = services.add_singleton(Service("singleton")).err().unwrap();
    assert_eq!(
        err,
        DiError::Configuration(ConfigurationError::LifetimeConflict {
            name: std::any::type_name::<Service>().to_string(),
            existing: Lifetime::Scoped,
            requested: Lifetime::Singleton,
        })
    );

    let provider = services.build();
    let a = provider.create_scope().get_service::<Service>().unwrap();
    let b = provider.create_scope().get_service::<Service>().unwrap();
    assert_eq!(a.0, "scoped");
    assert!(!Arc::ptr_eq(&a, &b));
}

#[test]
fn conflict_message_names_both_lifetimes() {
    let mut services = ServiceCollection::new();
    services.add_transient(1u8).unwrap();
    let err = services
        .add_singleton_factory::<u8, _>(|_| Ok(2))
        .err()
        .unwrap();
    assert_eq!(
        err.to_string(),
        "Service u8 is already registered as transient, cannot register it as singleton"
    );
}

#[test]
fn scoped_fixed_value_is_rejected() {
    let token = Token::<u32>::new("limit");
    let mut services = ServiceCollection::new();

    let err = services
        .add_token(&token, Lifetime::Scoped, Provision::value(5))
        .err()
        .unwrap();
    assert_eq!(
        err,
        DiError::Configuration(ConfigurationError::ScopedValue { name: "limit".into() })
    );
    assert!(services.is_empty());
}

#[test]
fn transient_value_is_shared() {
    let mut services = ServiceCollection::new();
    services.add_transient(String::from("fixed")).unwrap();
    let provider = services.build();

    let a = provider.get_service::<String>().unwrap();
    let b = provider.create_scope().get_service::<String>().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn same_lifetime_registration_replaces() {
    let token = Token::<&'static str>::new("greeting");
    let mut services = ServiceCollection::new();
    services.add_singleton_token(&token, "hello").unwrap();
    services.add_singleton_token(&token, "bonjour").unwrap();

    let provider = services.build();
    assert_eq!(*provider.get_token(&token).unwrap(), "bonjour");
}

#[test]
fn validate_add_does_not_register() {
    let services = ServiceCollection::new();
    assert!(services.validate_add(&key_of_type::<u8>(), Lifetime::Scoped).is_ok());
    assert!(services.is_empty());
}

#[test]
fn injectable_types_register_by_reference() {
    let mut services = ServiceCollection::new();
    services.add_singleton_type::<Clock>().unwrap();
    services.add_transient_type::<Audit>().unwrap();

    let provider = services.build();
    let a = provider.get_service::<Audit>().unwrap();
    let b = provider.get_service::<Audit>().unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
    assert!(Arc::ptr_eq(&a.clock, &b.clock));
}

#[test]
fn declarations_apply_in_bulk() {
    let mut services = ServiceCollection::new();
    services
        .add_declared(vec![
            Declaration::of::<Clock>(InjectableOptions::singleton()),
            Declaration::of::<Audit>(InjectableOptions::scoped()),
        ])
        .unwrap();

    assert_eq!(services.lifetime_of(&key_of_type::<Clock>()), Some(Lifetime::Singleton));
    assert_eq!(services.lifetime_of(&key_of_type::<Audit>()), Some(Lifetime::Scoped));

    let provider = services.build();
    let scope = provider.create_scope();
    assert!(Arc::ptr_eq(
        &scope.get_service::<Audit>().unwrap(),
        &scope.get_service::<Audit>().unwrap()
    ));
}

#[test]
fn declaration_without_lifetime_fails_whole_batch() {
    let mut services = ServiceCollection::new();
    let err = services
        .add_declared([
            Declaration::of::<Clock>(InjectableOptions::singleton()),
            Declaration::of::<Audit>(InjectableOptions::default()),
        ])
        .err()
        .unwrap();

    assert!(matches!(
        err,
        DiError::Configuration(ConfigurationError::MissingLifetime { ref name }) if name.ends_with("Audit")
    ));
    assert!(services.is_empty());
}

#[test]
fn conflicting_declarations_in_one_batch_fail() {
    let mut services = ServiceCollection::new();
    let result = services.add_declared([
        Declaration::of::<Clock>(InjectableOptions::singleton()),
        Declaration::of::<Clock>(InjectableOptions::transient()),
    ]);
    assert!(matches!(
        result.err().unwrap(),
        DiError::Configuration(ConfigurationError::LifetimeConflict { .. })
    ));
    assert!(!services.contains_type::<Clock>());
}

#[test]
fn declaration_conflicting_with_table_fails() {
    let mut services = ServiceCollection::new();
    services.add_scoped_type::<Clock>().unwrap();

    assert!(services
        .add_declared([
            Declaration::of::<Audit>(InjectableOptions::scoped()),
            Declaration::of::<Clock>(InjectableOptions::singleton()),
        ])
        .is_err());
    assert!(!services.contains_type::<Audit>());
    assert_eq!(services.lifetime_of(&key_of_type::<Clock>()), Some(Lifetime::Scoped));
}

#[test]
fn descriptors_are_listed_sorted() {
    let token = Token::<u8>::new("b-token");
    let mut services = ServiceCollection::new();
    services.add_singleton(1u32).unwrap();
    services.add_transient_token(&token, 1).unwrap();

    let listed: Vec<_> = services
        .service_descriptors()
        .iter()
        .map(|d| (d.render(), d.lifetime()))
        .collect();
    assert_eq!(
        listed,
        vec![
            ("[Token]b-token".to_string(), Lifetime::Transient),
            ("[Type]u32".to_string(), Lifetime::Singleton),
        ]
    );
}
