//! Service descriptors: one identifier's creation policy and cache cell.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{ConfigurationError, DiResult};
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::provider::ResolverContext;

// Type-erased Arc for storage
pub type AnyArc = Arc<dyn Any + Send + Sync>;

/// Type-erased factory stored in descriptors
pub type Factory = Arc<dyn for<'a> Fn(&ResolverContext<'a>) -> DiResult<AnyArc> + Send + Sync>;

#[cfg(feature = "ahash")]
pub(crate) type DescriptorMap = HashMap<Key, Arc<Descriptor>, ahash::RandomState>;
#[cfg(not(feature = "ahash"))]
pub(crate) type DescriptorMap = HashMap<Key, Arc<Descriptor>>;

/// How a registration produces its instance.
///
/// ```rust
/// use scoped_injector::{Lifetime, Provision, Resolver, ServiceCollection};
///
/// let mut services = ServiceCollection::new();
/// services.add(Lifetime::Singleton, Provision::value(42u32))?;
/// services.add(Lifetime::Transient, Provision::factory(|_| Ok(String::from("fresh"))))?;
///
/// // Scoped services must be re-creatable per scope
/// assert!(services.add(Lifetime::Scoped, Provision::value(1u8)).is_err());
/// # Ok::<(), scoped_injector::DiError>(())
/// ```
pub enum Provision<T> {
    /// A fixed value shared by every resolution
    Value(T),
    /// A factory invoked according to the lifetime
    Factory(Box<dyn for<'a> Fn(&ResolverContext<'a>) -> DiResult<T> + Send + Sync>),
}

impl<T: Send + Sync + 'static> Provision<T> {
    /// Fixed value.
    pub fn value(value: T) -> Self {
        Provision::Value(value)
    }

    /// Factory receiving the resolving context.
    pub fn factory<F>(factory: F) -> Self
    where
        F: Fn(&ResolverContext<'_>) -> DiResult<T> + Send + Sync + 'static,
    {
        Provision::Factory(Box::new(factory))
    }

    /// Converts into a type-erased factory for `lifetime`, rejecting fixed scoped values.
    pub(crate) fn into_factory(self, key: &Key, lifetime: Lifetime) -> DiResult<Factory> {
        match self {
            Provision::Value(_) if lifetime == Lifetime::Scoped => Err(ConfigurationError::ScopedValue {
                name: key.display_name().to_string(),
            }
            .into()),
            Provision::Value(value) => {
                let shared: AnyArc = Arc::new(value);
                Ok(Arc::new(move |_: &ResolverContext<'_>| -> DiResult<AnyArc> { Ok(shared.clone()) }))
            }
            Provision::Factory(factory) => Ok(Arc::new(move |ctx: &ResolverContext<'_>| {
                factory(ctx).map(|v| Arc::new(v) as AnyArc)
            })),
        }
    }
}

/// Cache state of a descriptor. Populated only after a factory call succeeded.
pub(crate) enum CacheState {
    Empty,
    Populated(AnyArc),
}

/// Creation policy for one identifier inside one resolution context.
pub(crate) struct Descriptor {
    lifetime: Lifetime,
    factory: Factory,
    cache: Mutex<CacheState>,
}

impl Descriptor {
    pub(crate) fn new(lifetime: Lifetime, factory: Factory) -> Self {
        Self {
            lifetime,
            factory,
            cache: Mutex::new(CacheState::Empty),
        }
    }

    pub(crate) fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    pub(crate) fn is_populated(&self) -> bool {
        matches!(&*self.cache.lock(), CacheState::Populated(_))
    }

    /// Returns the cached instance or runs the factory.
    ///
    /// The cache lock is never held across the factory call: the factory may
    /// re-enter the resolver. A failed factory leaves the cache empty so the
    /// next call retries. If two callers race on an empty cache the first
    /// stored instance wins and both return it.
    pub(crate) fn get_instance(&self, ctx: &ResolverContext<'_>) -> DiResult<AnyArc> {
        if !self.lifetime.is_cached() {
            return (self.factory)(ctx);
        }

        if let CacheState::Populated(value) = &*self.cache.lock() {
            return Ok(value.clone());
        }

        let created = (self.factory)(ctx)?;

        let mut cache = self.cache.lock();
        match &*cache {
            CacheState::Populated(existing) => Ok(existing.clone()),
            CacheState::Empty => {
                *cache = CacheState::Populated(created.clone());
                Ok(created)
            }
        }
    }

    /// Descriptor to place into a new resolution context.
    ///
    /// Singletons hand out the same descriptor so the cache cell is shared by
    /// the whole scope tree; scoped and transient get a fresh, empty copy.
    pub(crate) fn for_scoped_provider(self: &Arc<Self>) -> Arc<Self> {
        match self.lifetime {
            Lifetime::Singleton => Arc::clone(self),
            Lifetime::Scoped | Lifetime::Transient => {
                Arc::new(Descriptor::new(self.lifetime, self.factory.clone()))
            }
        }
    }
}

/// Maps every descriptor of `source` through [`Descriptor::for_scoped_provider`].
pub(crate) fn scoped_copy(source: &DescriptorMap) -> DescriptorMap {
    source
        .iter()
        .map(|(key, descriptor)| (key.clone(), descriptor.for_scoped_provider()))
        .collect()
}
