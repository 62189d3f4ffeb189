//! Error types for the dependency injection container.

use std::fmt;

use crate::key::KeyKind;
use crate::lifetime::Lifetime;

/// Dependency injection errors
///
/// Represents the various error conditions that can occur during service
/// registration or resolution.
///
/// # Examples
///
/// ```rust
/// use scoped_injector::{DiError, KeyKind, Resolver, ServiceCollection};
///
/// let provider = ServiceCollection::new().build();
/// match provider.get_service::<String>() {
///     Err(DiError::NotFound { kind, name }) => {
///         assert_eq!(kind, KeyKind::Type);
///         assert_eq!(name, "alloc::string::String");
///     }
///     _ => unreachable!(),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiError {
    /// Invalid registration, raised synchronously by the collection
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// No descriptor registered and no ad hoc fallback permitted
    #[error("No service registered for {kind} {name}")]
    NotFound {
        /// Whether the identifier was a type or a token
        kind: KeyKind,
        /// Display name of the identifier
        name: String,
    },

    /// Identifier requested while already under construction (full chain, first pushed first)
    #[error("Circular dependency: {}", .0.join(" -> "))]
    Circular(Vec<String>),

    /// Instantiation stack popped out of order; always a defect
    #[error("Instantiation stack corrupted: expected {expected}, found {found}")]
    InternalConsistency {
        /// Identifier the finished resolution pushed
        expected: String,
        /// What was actually on top of the stack
        found: String,
    },

    /// Type downcast failed
    #[error("Type mismatch for: {0}")]
    TypeMismatch(&'static str),

    /// `inject` called while no resolution context is active on this thread
    #[error("No active resolution context; call inject() inside a resolution or an entered context")]
    NoActiveContext,

    /// A user factory reported a failure
    #[error("Factory for {service} failed: {message}")]
    Factory {
        /// Display name of the service being constructed
        service: String,
        /// Rendered source error
        message: String,
    },
}

impl DiError {
    /// Wraps an arbitrary error raised inside a factory.
    ///
    /// ```rust
    /// use scoped_injector::DiError;
    ///
    /// let err = DiError::factory("Database", "connection refused");
    /// assert_eq!(err.to_string(), "Factory for Database failed: connection refused");
    /// ```
    pub fn factory(service: impl Into<String>, error: impl fmt::Display) -> Self {
        DiError::Factory {
            service: service.into(),
            message: error.to_string(),
        }
    }

    /// Returns true for the circular dependency variant.
    pub fn is_circular(&self) -> bool {
        matches!(self, DiError::Circular(_))
    }
}

/// Registration-time misconfiguration.
///
/// A registration call that fails with one of these leaves the collection
/// exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// The identifier is already registered under another lifetime
    #[error("Service {name} is already registered as {existing}, cannot register it as {requested}")]
    LifetimeConflict {
        /// Display name of the identifier
        name: String,
        /// Lifetime of the existing registration
        existing: Lifetime,
        /// Lifetime that was requested
        requested: Lifetime,
    },

    /// Scoped services need a factory that can run once per scope
    #[error("Scoped service {name} needs a factory, a fixed value cannot be re-created per scope")]
    ScopedValue {
        /// Display name of the identifier
        name: String,
    },

    /// A declaration arrived without a lifetime
    #[error("Missing lifetime for declared service {name}")]
    MissingLifetime {
        /// Display name of the identifier
        name: String,
    },
}

/// Result type for DI operations
///
/// ```rust
/// use scoped_injector::{DiError, DiResult};
///
/// fn create_service() -> DiResult<String> {
///     Ok("service created".to_string())
/// }
///
/// fn failing_operation() -> DiResult<()> {
///     Err(DiError::NoActiveContext)
/// }
///
/// assert!(create_service().is_ok());
/// assert!(failing_operation().is_err());
/// ```
pub type DiResult<T> = Result<T, DiError>;
