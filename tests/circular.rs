use scoped_injector::{DiError, Resolver, ServiceCollection, Token};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct SelfReferencing;
struct ServiceA;
struct ServiceB;
struct Unrelated(u32);

#[test]
fn test_self_circular_dependency() {
    let side_effects = Arc::new(AtomicUsize::new(0));
    let se = side_effects.clone();

    let mut sc = ServiceCollection::new();
    sc.add_transient_factory::<SelfReferencing, _>(move |r| {
        r.get_service::<SelfReferencing>()?;
        se.fetch_add(1, Ordering::SeqCst);
        Ok(SelfReferencing)
    })
    .unwrap();

    let sp = sc.build();
    match sp.get_service::<SelfReferencing>() {
        Err(DiError::Circular(chain)) => {
            assert_eq!(chain.len(), 1);
            assert!(chain[0].starts_with("[Type]"));
            assert!(chain[0].ends_with("SelfReferencing"));
        }
        Err(other) => panic!("expected circular error, got {other}"),
        Ok(_) => panic!("expected circular error"),
    }
    assert_eq!(side_effects.load(Ordering::SeqCst), 0);
    assert_eq!(sp.instantiation_depth(), 0);
}

#[test]
fn test_mutual_cycle_reports_two_entries() {
    let mut sc = ServiceCollection::new();
    sc.add_scoped_factory::<ServiceA, _>(|r| {
        r.get_service::<ServiceB>()?;
        Ok(ServiceA)
    })
    .unwrap();
    sc.add_scoped_factory::<ServiceB, _>(|r| {
        r.get_service::<ServiceA>()?;
        Ok(ServiceB)
    })
    .unwrap();
    sc.add_singleton(Unrelated(3)).unwrap();

    let sp = sc.build();
    let err = sp.get_service::<ServiceA>().err().unwrap();
    match &err {
        DiError::Circular(chain) => {
            assert_eq!(chain.len(), 2);
            assert!(chain[0].ends_with("ServiceA"));
            assert!(chain[1].ends_with("ServiceB"));
        }
        other => panic!("expected circular error, got {other}"),
    }
    assert!(err.is_circular());
    assert!(err.to_string().starts_with("Circular dependency: [Type]"));

    assert_eq!(sp.instantiation_depth(), 0);
    assert_eq!(sp.get_service::<Unrelated>().unwrap().0, 3);

    // Entering the cycle from the other side reports it from there
    match sp.get_service::<ServiceB>() {
        Err(DiError::Circular(chain)) => assert!(chain[0].ends_with("ServiceB")),
        _ => panic!("expected circular error"),
    }
}

#[test]
fn test_token_cycle_renders_token_names() {
    let left = Token::<u8>::new("left");
    let right = Token::<u8>::new("right");

    let mut sc = ServiceCollection::new();
    let r2 = right.clone();
    sc.add_transient_token_factory(&left, move |r| Ok(*r.get_token(&r2)?))
        .unwrap();
    let l2 = left.clone();
    sc.add_transient_token_factory(&right, move |r| Ok(*r.get_token(&l2)?))
        .unwrap();

    let sp = sc.build();
    assert_eq!(
        sp.get_token(&left).err().unwrap(),
        DiError::Circular(vec!["[Token]left".to_string(), "[Token]right".to_string()])
    );
}

#[test]
fn test_swallowed_cycle_still_completes() {
    let mut sc = ServiceCollection::new();
    sc.add_scoped_factory::<ServiceA, _>(|r| {
        // Optional back-reference: a cycle here is tolerated
        let _ = r.get_service::<ServiceA>();
        Ok(ServiceA)
    })
    .unwrap();

    let sp = sc.build();
    assert!(sp.get_service::<ServiceA>().is_ok());
    assert_eq!(sp.instantiation_depth(), 0);
}

#[test]
fn test_swallowed_failure_after_reset_is_internal_error() {
    let mut sc = ServiceCollection::new();
    sc.add_scoped_factory::<ServiceB, _>(|_| Err(DiError::factory("ServiceB", "unavailable")))
        .unwrap();
    sc.add_scoped_factory::<ServiceA, _>(|r| {
        let _ = r.get_service::<ServiceB>();
        Ok(ServiceA)
    })
    .unwrap();

    let sp = sc.build();
    match sp.get_service::<ServiceA>() {
        Err(DiError::InternalConsistency { expected, found }) => {
            assert!(expected.ends_with("ServiceA"));
            assert_eq!(found, "<empty>");
        }
        _ => panic!("expected internal consistency error"),
    }
    assert_eq!(sp.instantiation_depth(), 0);
}

#[test]
fn test_panicking_factory_resets_stack() {
    let mut sc = ServiceCollection::new();
    sc.add_scoped_factory::<ServiceA, _>(|_| -> Result<ServiceA, DiError> {
        panic!("factory exploded")
    })
    .unwrap();
    sc.add_singleton(Unrelated(1)).unwrap();

    let sp = sc.build();
    let result = catch_unwind(AssertUnwindSafe(|| sp.get_service::<ServiceA>()));
    assert!(result.is_err());

    assert_eq!(sp.instantiation_depth(), 0);
    assert!(scoped_injector::current_context().is_none());
    assert_eq!(sp.get_service::<Unrelated>().unwrap().0, 1);
}

#[test]
fn test_cycles_are_per_context() {
    let mut sc = ServiceCollection::new();
    sc.add_scoped_factory::<ServiceA, _>(|r| {
        // A child scope has its own stack, so this is not a cycle
        let child = r.provider().create_scope();
        child.get_service::<ServiceB>()?;
        Ok(ServiceA)
    })
    .unwrap();
    sc.add_scoped_factory::<ServiceB, _>(|_| Ok(ServiceB)).unwrap();

    let sp = sc.build();
    assert!(sp.get_service::<ServiceA>().is_ok());
}
