//! # scoped-injector
//!
//! In-process dependency injection with hierarchical resolution contexts.
//!
//! ## Features
//!
//! - **Lifetimes**: Singleton, Scoped, and Transient services
//! - **Identity-keyed identifiers**: type references and opaque [`Token`]s
//! - **Hierarchical scopes**: each scope owns its cache and teardown list
//! - **Circular dependency detection**: reports the full resolution chain
//! - **Ambient context**: [`inject`] works inside factories and entered contexts
//!
//! ## Quick Start
//!
//! ```rust
//! use scoped_injector::{Resolver, ServiceCollection};
//! use std::sync::Arc;
//!
//! struct Database {
//!     connection_string: String,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! let mut services = ServiceCollection::new();
//! services.add_singleton(Database {
//!     connection_string: "postgres://localhost".to_string(),
//! })?;
//! services.add_transient_factory::<UserService, _>(|resolver| {
//!     Ok(UserService {
//!         db: resolver.get_service::<Database>()?,
//!     })
//! })?;
//!
//! let provider = services.build();
//! let user_service = provider.get_service::<UserService>()?;
//! assert_eq!(user_service.db.connection_string, "postgres://localhost");
//! # Ok::<(), scoped_injector::DiError>(())
//! ```
//!
//! ## Service Lifetimes
//!
//! - **Singleton**: Created once and shared by the context it was registered
//!   in and every scope derived from it
//! - **Scoped**: Created once per resolution context
//! - **Transient**: Created fresh on every resolution
//!
//! ## Tokens
//!
//! Tokens identify services that have no suitable type, such as trait objects
//! or several values of one type. Identity is the token itself, not its name.
//!
//! ```rust
//! use scoped_injector::{Resolver, ServiceCollection, Token};
//! use std::sync::Arc;
//!
//! trait Logger: Send + Sync {
//!     fn log(&self, message: &str);
//! }
//!
//! struct ConsoleLogger;
//! impl Logger for ConsoleLogger {
//!     fn log(&self, message: &str) {
//!         println!("[LOG] {}", message);
//!     }
//! }
//!
//! let logger = Token::<Arc<dyn Logger>>::new("logger");
//!
//! let mut services = ServiceCollection::new();
//! services.add_singleton_token(&logger, Arc::new(ConsoleLogger) as Arc<dyn Logger>)?;
//!
//! let provider = services.build();
//! provider.get_token(&logger)?.log("Hello, World!");
//! # Ok::<(), scoped_injector::DiError>(())
//! ```
//!
//! ## Scoped Services
//!
//! ```rust
//! use scoped_injector::{Resolver, ServiceCollection};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! struct RequestId(String);
//!
//! let counter = Arc::new(AtomicUsize::new(0));
//! let c = counter.clone();
//!
//! let mut services = ServiceCollection::new();
//! services.add_scoped_factory::<RequestId, _>(move |_| {
//!     Ok(RequestId(format!("req-{}", c.fetch_add(1, Ordering::SeqCst) + 1)))
//! })?;
//!
//! let provider = services.build();
//! let scope1 = provider.create_scope();
//! let scope2 = provider.create_scope();
//!
//! let req1 = scope1.get_service::<RequestId>()?;
//! let req2 = scope2.get_service::<RequestId>()?;
//! assert_ne!(req1.0, req2.0);
//! # Ok::<(), scoped_injector::DiError>(())
//! ```

// Module declarations
pub mod ambient;
pub mod collection;
pub mod config;
pub mod descriptors;
pub mod error;
pub mod hints;
pub mod key;
pub mod lifetime;
pub mod provider;
pub mod traits;

// Internal modules
mod internal;
mod registration;

// Re-exports
pub use ambient::{current_context, enter_context, inject, inject_optional, inject_token, with_context, AmbientGuard};
pub use collection::{Declaration, InjectableOptions, ServiceCollection, ServiceModule};
pub use config::ProviderOptions;
pub use descriptors::ServiceDescriptor;
pub use error::{ConfigurationError, DiError, DiResult};
pub use hints::InjectionHints;
pub use key::{key_of_type, Key, KeyKind, Token, TokenRef};
pub use lifetime::Lifetime;
pub use provider::{ResolverContext, ServiceProvider};
pub use registration::{AnyArc, Factory, Provision};
pub use traits::{Dispose, Injectable, Resolver, ResolverCore};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_singleton_resolution() {
        let mut sc = ServiceCollection::new();
        sc.add_singleton(42usize).unwrap();

        let sp = sc.build();
        let a = sp.get_service::<usize>().unwrap();
        let b = sp.get_service::<usize>().unwrap();

        assert_eq!(*a, 42);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_transient_resolution() {
        let mut sc = ServiceCollection::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();

        sc.add_transient_factory::<String, _>(move |_| {
            Ok(format!("instance-{}", c.fetch_add(1, Ordering::SeqCst) + 1))
        })
        .unwrap();

        let sp = sc.build();
        let a = sp.get_service::<String>().unwrap();
        let b = sp.get_service::<String>().unwrap();

        assert_eq!(a.as_str(), "instance-1");
        assert_eq!(b.as_str(), "instance-2");
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_scoped_resolution() {
        let mut sc = ServiceCollection::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();

        sc.add_scoped_factory::<String, _>(move |_| {
            Ok(format!("scoped-{}", c.fetch_add(1, Ordering::SeqCst) + 1))
        })
        .unwrap();

        let sp = sc.build();

        let scope1 = sp.create_scope();
        let s1a = scope1.get_service::<String>().unwrap();
        let s1b = scope1.get_service::<String>().unwrap();
        assert!(Arc::ptr_eq(&s1a, &s1b));

        let scope2 = sp.create_scope();
        let s2 = scope2.get_service::<String>().unwrap();
        assert!(!Arc::ptr_eq(&s1a, &s2));
    }

    #[test]
    fn test_token_resolution() {
        trait TestTrait: Send + Sync {
            fn get_value(&self) -> i32;
        }

        struct TestImpl {
            value: i32,
        }

        impl TestTrait for TestImpl {
            fn get_value(&self) -> i32 {
                self.value
            }
        }

        let token = Token::<Arc<dyn TestTrait>>::new("test");
        let mut sc = ServiceCollection::new();
        sc.add_singleton_token(&token, Arc::new(TestImpl { value: 42 }) as Arc<dyn TestTrait>)
            .unwrap();

        let sp = sc.build();
        assert_eq!(sp.get_token(&token).unwrap().get_value(), 42);
    }
}
