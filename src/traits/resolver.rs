//! Resolver traits for service resolution.

use std::any::Any;
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::hints::InjectionHints;
use crate::key::{key_of_type, Key, Token};
use crate::registration::Factory;
use crate::traits::{Dispose, Injectable};

/// Core resolver trait for object-safe service resolution.
///
/// Implemented by [`ServiceProvider`](crate::ServiceProvider) and by the
/// [`ResolverContext`](crate::ResolverContext) handed to factories. Most users
/// should call the generic methods of [`Resolver`] instead.
pub trait ResolverCore: Send + Sync {
    /// Resolves `key` with cycle detection.
    ///
    /// Returns `Ok(None)` when nothing is registered for `key`.
    fn resolve_any(
        &self,
        key: &Key,
        hints: Option<&InjectionHints>,
    ) -> DiResult<Option<Arc<dyn Any + Send + Sync>>>;

    /// Like [`resolve_any`](Self::resolve_any), but an unregistered type may be
    /// created ad hoc with `constructor` when the context permits it.
    fn resolve_or_construct(
        &self,
        key: &Key,
        hints: Option<&InjectionHints>,
        constructor: &Factory,
    ) -> DiResult<Option<Arc<dyn Any + Send + Sync>>>;

    /// Registers a teardown callback on the resolution context.
    fn push_teardown(&self, f: Arc<dyn Fn() + Send + Sync>);
}

/// High-level resolver interface with generic methods for type-safe service resolution.
///
/// # Examples
///
/// ```
/// use scoped_injector::{Resolver, ServiceCollection, Token};
///
/// let name = Token::<String>::new("app-name");
///
/// let mut services = ServiceCollection::new();
/// services.add_singleton(42usize)?;
/// services.add_singleton_token(&name, "demo".to_string())?;
///
/// let provider = services.build();
/// assert_eq!(*provider.get_service::<usize>()?, 42);
/// assert_eq!(provider.get_token(&name)?.as_str(), "demo");
/// assert!(provider.get_optional_service::<u8>()?.is_none());
/// # Ok::<(), scoped_injector::DiError>(())
/// ```
pub trait Resolver: ResolverCore {
    /// Resolves a type, or `None` if it is not registered.
    fn get_optional_service<T: Send + Sync + 'static>(&self) -> DiResult<Option<Arc<T>>> {
        resolve_typed(self, &key_of_type::<T>(), None)
    }

    /// Like [`get_optional_service`](Self::get_optional_service), forwarding hints to the factory.
    fn get_optional_service_with_hints<T: Send + Sync + 'static>(
        &self,
        hints: &InjectionHints,
    ) -> DiResult<Option<Arc<T>>> {
        resolve_typed(self, &key_of_type::<T>(), Some(hints))
    }

    /// Resolves a type, failing with [`DiError::NotFound`] if it is not registered.
    fn get_service<T: Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        let key = key_of_type::<T>();
        resolve_typed(self, &key, None)?.ok_or_else(|| not_found(&key))
    }

    /// Like [`get_service`](Self::get_service), forwarding hints to the factory.
    fn get_service_with_hints<T: Send + Sync + 'static>(&self, hints: &InjectionHints) -> DiResult<Arc<T>> {
        let key = key_of_type::<T>();
        resolve_typed(self, &key, Some(hints))?.ok_or_else(|| not_found(&key))
    }

    /// Resolves a token, or `None` if it is not registered.
    fn get_optional_token<T: Send + Sync + 'static>(&self, token: &Token<T>) -> DiResult<Option<Arc<T>>> {
        resolve_typed(self, &token.key(), None)
    }

    /// Resolves a token, failing with [`DiError::NotFound`] if it is not registered.
    fn get_token<T: Send + Sync + 'static>(&self, token: &Token<T>) -> DiResult<Arc<T>> {
        let key = token.key();
        resolve_typed(self, &key, None)?.ok_or_else(|| not_found(&key))
    }

    /// Like [`get_token`](Self::get_token), forwarding hints to the factory.
    fn get_token_with_hints<T: Send + Sync + 'static>(
        &self,
        token: &Token<T>,
        hints: &InjectionHints,
    ) -> DiResult<Arc<T>> {
        let key = token.key();
        resolve_typed(self, &key, Some(hints))?.ok_or_else(|| not_found(&key))
    }

    /// Resolves an [`Injectable`] type; if it is unregistered and the context
    /// allows unknown scoped services, it is constructed and cached as scoped.
    fn get_optional_injectable<T: Injectable>(&self) -> DiResult<Option<Arc<T>>> {
        let key = key_of_type::<T>();
        let constructor = crate::traits::injectable::constructor_of::<T>();
        self.resolve_or_construct(&key, None, &constructor)?
            .map(downcast::<T>)
            .transpose()
    }

    /// Like [`get_optional_injectable`](Self::get_optional_injectable), failing when absent.
    fn get_injectable<T: Injectable>(&self) -> DiResult<Arc<T>> {
        self.get_optional_injectable::<T>()?
            .ok_or_else(|| not_found(&key_of_type::<T>()))
    }

    /// Registers a zero-argument teardown callback on the resolving context.
    fn add_scope_teardown<F>(&self, f: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.push_teardown(Arc::new(f));
    }

    /// Registers `service` to be disposed when the context is torn down.
    ///
    /// ```
    /// use scoped_injector::{Dispose, Resolver, ServiceCollection};
    /// use std::sync::atomic::{AtomicBool, Ordering};
    /// use std::sync::Arc;
    ///
    /// struct Connection(AtomicBool);
    /// impl Dispose for Connection {
    ///     fn dispose(&self) {
    ///         self.0.store(true, Ordering::SeqCst);
    ///     }
    /// }
    ///
    /// let provider = ServiceCollection::new().build();
    /// let conn = Arc::new(Connection(AtomicBool::new(false)));
    /// provider.register_disposer(conn.clone());
    /// provider.teardown();
    /// assert!(conn.0.load(Ordering::SeqCst));
    /// ```
    fn register_disposer<T: Dispose>(&self, service: Arc<T>) {
        self.push_teardown(Arc::new(move || service.dispose()));
    }
}

impl<R: ResolverCore + ?Sized> Resolver for R {}

fn resolve_typed<T, R>(resolver: &R, key: &Key, hints: Option<&InjectionHints>) -> DiResult<Option<Arc<T>>>
where
    T: Send + Sync + 'static,
    R: ResolverCore + ?Sized,
{
    resolver.resolve_any(key, hints)?.map(downcast::<T>).transpose()
}

fn downcast<T: Send + Sync + 'static>(any: Arc<dyn Any + Send + Sync>) -> DiResult<Arc<T>> {
    any.downcast::<T>()
        .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
}

pub(crate) fn not_found(key: &Key) -> DiError {
    DiError::NotFound {
        kind: key.kind(),
        name: key.display_name().to_string(),
    }
}
