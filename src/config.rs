//! Provider configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Options fixed at build time and inherited by every child scope.
///
/// # Examples
///
/// ```rust
/// use scoped_injector::{ProviderOptions, ServiceCollection};
///
/// let mut services = ServiceCollection::new();
/// services.with_options(ProviderOptions::new().allow_unknown_scoped_services(true));
///
/// let provider = services.build();
/// assert!(provider.options().allow_unknown_scoped_services);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ProviderOptions {
    /// Bind an unregistered [`Injectable`](crate::Injectable) type as scoped
    /// the first time it is requested through
    /// [`get_injectable`](crate::Resolver::get_injectable). Tokens are never
    /// bound ad hoc.
    pub allow_unknown_scoped_services: bool,
}

impl ProviderOptions {
    /// Default options: no ad hoc binding.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets [`allow_unknown_scoped_services`](Self::allow_unknown_scoped_services).
    pub fn allow_unknown_scoped_services(mut self, allow: bool) -> Self {
        self.allow_unknown_scoped_services = allow;
        self
    }
}
