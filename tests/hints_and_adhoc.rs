use scoped_injector::{
    key_of_type, DiError, DiResult, Injectable, InjectionHints, Key, KeyKind, Lifetime, ProviderOptions,
    Resolver, ResolverContext, ServiceCollection,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

static CONSTRUCTED: AtomicUsize = AtomicUsize::new(0);

struct RequestState {
    serial: usize,
}

impl Injectable for RequestState {
    fn construct(_: &ResolverContext<'_>) -> DiResult<Self> {
        Ok(RequestState { serial: CONSTRUCTED.fetch_add(1, Ordering::SeqCst) })
    }
}

struct Unlisted;
impl Injectable for Unlisted {
    fn construct(_: &ResolverContext<'_>) -> DiResult<Self> {
        Ok(Unlisted)
    }
}

#[test]
fn unknown_injectable_is_not_found_by_default() {
    let provider = ServiceCollection::new().build();
    assert!(matches!(
        provider.get_injectable::<Unlisted>(),
        Err(DiError::NotFound { kind: KeyKind::Type, .. })
    ));
    assert!(provider.get_optional_injectable::<Unlisted>().unwrap().is_none());
    assert!(!provider.contains(&key_of_type::<Unlisted>()));
}

#[test]
fn unknown_injectable_is_bound_as_scoped_when_allowed() {
    let seen: Arc<Mutex<Vec<Key>>> = Arc::default();
    let s = seen.clone();

    let mut services = ServiceCollection::new();
    services
        .allow_unknown_scoped_services()
        .on_unknown_scoped_service(move |key| s.lock().unwrap().push(key.clone()));
    let root = services.build();

    let a = root.get_injectable::<RequestState>().unwrap();
    let b = root.get_injectable::<RequestState>().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(root.lifetime_of(&key_of_type::<RequestState>()), Some(Lifetime::Scoped));

    // The ad hoc descriptor is copied into scopes created afterwards
    let child = root.create_scope();
    assert!(child.contains(&key_of_type::<RequestState>()));
    let c = child.get_service::<RequestState>().unwrap();
    assert_ne!(a.serial, c.serial);

    assert_eq!(*seen.lock().unwrap(), vec![key_of_type::<RequestState>()]);
}

#[test]
fn plain_lookup_never_binds_ad_hoc() {
    let mut services = ServiceCollection::new();
    services.with_options(ProviderOptions::new().allow_unknown_scoped_services(true));
    let provider = services.build();

    assert!(provider.get_optional_service::<Unlisted>().unwrap().is_none());
    assert!(!provider.contains(&key_of_type::<Unlisted>()));
}

#[test]
fn hints_reach_only_the_requested_factory() {
    struct Inner(usize);
    struct Outer {
        label: String,
        inner: Arc<Inner>,
    }

    let mut services = ServiceCollection::new();
    services
        .add_transient_factory::<Inner, _>(|r| Ok(Inner(r.hints().map_or(0, |h| h.len()))))
        .unwrap();
    services
        .add_transient_factory::<Outer, _>(|r| {
            let label = r
                .parameter::<String>(0)
                .map(|s| s.to_string())
                .unwrap_or_default();
            Ok(Outer { label, inner: r.get_service::<Inner>()? })
        })
        .unwrap();
    let provider = services.build();

    let hints = InjectionHints::new().with_parameter("tagged".to_string());
    let outer = provider.get_service_with_hints::<Outer>(&hints).unwrap();
    assert_eq!(outer.label, "tagged");
    assert_eq!(outer.inner.0, 0);
}

#[test]
fn hints_with_wrong_type_are_ignored() {
    let hints = InjectionHints::new().with_parameter(5u32);
    assert!(hints.parameter::<String>(0).is_none());
    assert_eq!(*hints.parameter::<u32>(0).unwrap(), 5);
    assert!(hints.parameter::<u32>(1).is_none());
}

#[test]
fn failed_singleton_is_retried_on_next_request() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let a = attempts.clone();

    let mut services = ServiceCollection::new();
    services
        .add_singleton_factory::<String, _>(move |_| {
            if a.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(DiError::factory("String", "not ready"))
            } else {
                Ok("ready".to_string())
            }
        })
        .unwrap();
    let provider = services.build();

    let err = provider.get_service::<String>().err().unwrap();
    assert_eq!(err, DiError::factory("String", "not ready"));
    assert_eq!(provider.instantiation_depth(), 0);

    let first = provider.get_service::<String>().unwrap();
    let second = provider.create_scope().get_service::<String>().unwrap();
    assert_eq!(first.as_str(), "ready");
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[test]
fn error_from_nested_factory_propagates_unchanged() {
    let mut services = ServiceCollection::new();
    services
        .add_scoped_factory::<u8, _>(|_| Err(DiError::factory("u8", "disk full")))
        .unwrap();
    services
        .add_scoped_factory::<u16, _>(|r| Ok(u16::from(*r.get_service::<u8>()?)))
        .unwrap();
    let provider = services.build();

    assert_eq!(
        provider.get_service::<u16>().err().unwrap(),
        DiError::factory("u8", "disk full")
    );
    assert!(provider.get_optional_service::<u32>().unwrap().is_none());
}
