//! Construction-time hints forwarded to factories.

use std::any::Any;
use std::sync::Arc;

use crate::registration::AnyArc;

/// Extra values a factory may consult while constructing a service.
///
/// The resolver never interprets hints, it only forwards them to the factory
/// of the service that was requested. Nested resolutions made by that factory
/// do not see them. For cached lifetimes hints only matter on the resolution
/// that actually runs the factory.
///
/// ```rust
/// use scoped_injector::{InjectionHints, Resolver, ServiceCollection};
///
/// struct Greeting(String);
///
/// let mut services = ServiceCollection::new();
/// services.add_transient_factory::<Greeting, _>(|r| {
///     let name = r.parameter::<String>(0).map(|n| n.to_string());
///     Ok(Greeting(format!("hello {}", name.as_deref().unwrap_or("world"))))
/// })?;
///
/// let provider = services.build();
/// let hints = InjectionHints::new().with_parameter("rust".to_string());
/// assert_eq!(provider.get_service_with_hints::<Greeting>(&hints)?.0, "hello rust");
/// assert_eq!(provider.get_service::<Greeting>()?.0, "hello world");
/// # Ok::<(), scoped_injector::DiError>(())
/// ```
#[derive(Clone, Default)]
pub struct InjectionHints {
    insert_parameters: Vec<AnyArc>,
}

impl InjectionHints {
    /// Creates empty hints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional parameter.
    pub fn with_parameter<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.insert_parameters.push(Arc::new(value));
        self
    }

    /// Appends an already shared positional parameter.
    pub fn with_shared_parameter<T: Any + Send + Sync>(mut self, value: Arc<T>) -> Self {
        self.insert_parameters.push(value);
        self
    }

    /// Positional parameter `index`, if present and of type `T`.
    pub fn parameter<T: Any + Send + Sync>(&self, index: usize) -> Option<Arc<T>> {
        self.insert_parameters
            .get(index)
            .and_then(|p| p.clone().downcast::<T>().ok())
    }

    /// Number of positional parameters.
    pub fn len(&self) -> usize {
        self.insert_parameters.len()
    }

    /// True when no parameters were supplied.
    pub fn is_empty(&self) -> bool {
        self.insert_parameters.is_empty()
    }
}

impl std::fmt::Debug for InjectionHints {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InjectionHints")
            .field("insert_parameters", &self.insert_parameters.len())
            .finish()
    }
}
