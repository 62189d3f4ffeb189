//! Resolver context for dependency injection.
//!
//! This module contains the ResolverContext type which provides
//! the interface for factory functions to resolve dependencies.

use std::any::Any;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::DiResult;
use crate::hints::InjectionHints;
use crate::internal::TeardownList;
use crate::key::Key;
use crate::registration::Factory;
use crate::traits::ResolverCore;

use super::ServiceProvider;

/// Context passed to factory functions for resolving dependencies.
///
/// Wraps the resolution context that is constructing the service, plus any
/// [`InjectionHints`] the caller supplied for this resolution. Nested lookups
/// made through the context re-enter the same context, extending its
/// instantiation stack; they do not inherit the hints.
///
/// Teardown callbacks pushed through the context attach to the constructing
/// context, except for singletons, whose callbacks attach to the root.
///
/// # Examples
///
/// ```
/// use scoped_injector::{Resolver, ServiceCollection};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct UserService { db: Arc<Database> }
///
/// let mut services = ServiceCollection::new();
/// services.add_singleton(Database { url: "postgres://localhost".to_string() })?;
/// services.add_transient_factory::<UserService, _>(|resolver| {
///     Ok(UserService { db: resolver.get_service::<Database>()? })
/// })?;
///
/// let provider = services.build();
/// assert_eq!(provider.get_service::<UserService>()?.db.url, "postgres://localhost");
/// # Ok::<(), scoped_injector::DiError>(())
/// ```
pub struct ResolverContext<'a> {
    provider: &'a ServiceProvider,
    hints: Option<&'a InjectionHints>,
    disposers: &'a Mutex<TeardownList>,
}

impl<'a> ResolverContext<'a> {
    pub(crate) fn new(provider: &'a ServiceProvider, hints: Option<&'a InjectionHints>) -> Self {
        Self {
            provider,
            hints,
            disposers: provider.teardown_list(),
        }
    }

    /// Routes teardown callbacks to the root provider.
    pub(crate) fn with_root_teardown(self) -> Self {
        Self {
            disposers: self.provider.root_teardown_list(),
            ..self
        }
    }

    /// The resolution context constructing the service.
    pub fn provider(&self) -> &'a ServiceProvider {
        self.provider
    }

    /// Hints supplied by the caller of this resolution, if any.
    pub fn hints(&self) -> Option<&'a InjectionHints> {
        self.hints
    }

    /// Shortcut for positional hint parameter `index`.
    pub fn parameter<T: Any + Send + Sync>(&self, index: usize) -> Option<Arc<T>> {
        self.hints.and_then(|h| h.parameter::<T>(index))
    }
}

impl ResolverCore for ResolverContext<'_> {
    fn resolve_any(
        &self,
        key: &Key,
        hints: Option<&InjectionHints>,
    ) -> DiResult<Option<Arc<dyn Any + Send + Sync>>> {
        self.provider.resolve_key(key, hints, None)
    }

    fn resolve_or_construct(
        &self,
        key: &Key,
        hints: Option<&InjectionHints>,
        constructor: &Factory,
    ) -> DiResult<Option<Arc<dyn Any + Send + Sync>>> {
        self.provider.resolve_key(key, hints, Some(constructor))
    }

    fn push_teardown(&self, f: Arc<dyn Fn() + Send + Sync>) {
        self.disposers.lock().push(f);
    }
}
