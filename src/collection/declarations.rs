//! Declarative registration of injectable types.
//!
//! A [`Declaration`] pairs an [`Injectable`] type with its
//! [`InjectableOptions`]. Declarations are applied in bulk through
//! [`ServiceCollection::add_declared`](crate::ServiceCollection::add_declared).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::key::{key_of_type, Key};
use crate::lifetime::Lifetime;
use crate::registration::Factory;
use crate::traits::injectable::constructor_of;
use crate::traits::Injectable;

/// Per-type registration options.
///
/// `lifetime` is optional so that options can be assembled from partial
/// sources (for example deserialized configuration); a declaration without
/// one is rejected when applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct InjectableOptions {
    /// Lifetime to register the type with.
    pub lifetime: Option<Lifetime>,
}

impl InjectableOptions {
    pub fn new(lifetime: Lifetime) -> Self {
        Self {
            lifetime: Some(lifetime),
        }
    }

    pub fn singleton() -> Self {
        Self::new(Lifetime::Singleton)
    }

    pub fn scoped() -> Self {
        Self::new(Lifetime::Scoped)
    }

    pub fn transient() -> Self {
        Self::new(Lifetime::Transient)
    }
}

/// An injectable type together with its options.
///
/// ```rust
/// use scoped_injector::{
///     Declaration, DiResult, Injectable, InjectableOptions, Resolver, ResolverContext,
///     ServiceCollection,
/// };
///
/// struct Clock;
/// impl Injectable for Clock {
///     fn construct(_: &ResolverContext<'_>) -> DiResult<Self> { Ok(Clock) }
/// }
///
/// struct Audit;
/// impl Injectable for Audit {
///     fn construct(_: &ResolverContext<'_>) -> DiResult<Self> { Ok(Audit) }
/// }
///
/// let mut services = ServiceCollection::new();
/// services.add_declared([
///     Declaration::of::<Clock>(InjectableOptions::singleton()),
///     Declaration::of::<Audit>(InjectableOptions::transient()),
/// ])?;
///
/// let provider = services.build();
/// provider.get_service::<Clock>()?;
/// # Ok::<(), scoped_injector::DiError>(())
/// ```
#[derive(Clone)]
pub struct Declaration {
    key: Key,
    options: InjectableOptions,
    constructor: Factory,
}

impl Declaration {
    /// Declares `T` with `options`.
    pub fn of<T: Injectable>(options: InjectableOptions) -> Self {
        Self {
            key: key_of_type::<T>(),
            options,
            constructor: constructor_of::<T>(),
        }
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn options(&self) -> InjectableOptions {
        self.options
    }

    pub(crate) fn into_parts(self) -> (Key, InjectableOptions, Factory) {
        (self.key, self.options, self.constructor)
    }
}

impl std::fmt::Debug for Declaration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Declaration")
            .field("key", &self.key)
            .field("options", &self.options)
            .finish()
    }
}
