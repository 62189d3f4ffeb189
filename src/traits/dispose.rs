//! Disposal trait for resource cleanup.

/// Trait for synchronous resource disposal.
///
/// Implement this for services that need structured teardown (flushing
/// caches, closing connections). Register the instance with
/// [`Resolver::register_disposer`](crate::Resolver::register_disposer); it is
/// disposed when the owning context runs [`teardown`](crate::ServiceProvider::teardown).
/// Inside a factory the owning context is the one constructing the service,
/// except for singletons: their disposers belong to the root provider, so a
/// child scope's teardown never disposes a shared instance.
///
/// # Examples
///
/// ```
/// use scoped_injector::{Dispose, Resolver, ServiceCollection};
/// use std::sync::Arc;
///
/// struct Cache {
///     name: String,
/// }
///
/// impl Dispose for Cache {
///     fn dispose(&self) {
///         println!("Flushing cache: {}", self.name);
///     }
/// }
///
/// let mut services = ServiceCollection::new();
/// services.add_scoped_factory::<Arc<Cache>, _>(|resolver| {
///     let cache = Arc::new(Cache { name: "user_cache".to_string() });
///     resolver.register_disposer(cache.clone());
///     Ok(cache)
/// })?;
/// # Ok::<(), scoped_injector::DiError>(())
/// ```
pub trait Dispose: Send + Sync + 'static {
    /// Perform synchronous cleanup of resources.
    fn dispose(&self);
}
