//! Types that know how to construct themselves from a resolution context.

use std::sync::Arc;

use crate::error::DiResult;
use crate::provider::ResolverContext;
use crate::registration::{AnyArc, Factory};

/// A type that can be registered by type reference alone.
///
/// `construct` plays the role of the type's constructor: it receives the
/// resolving context and pulls whatever further dependencies it needs.
/// There is no signature introspection; the implementation decides what to
/// resolve.
///
/// ```
/// use scoped_injector::{DiResult, Injectable, Resolver, ResolverContext, ServiceCollection};
/// use std::sync::Arc;
///
/// struct Config { url: String }
///
/// struct Repository { config: Arc<Config> }
///
/// impl Injectable for Repository {
///     fn construct(ctx: &ResolverContext<'_>) -> DiResult<Self> {
///         Ok(Repository { config: ctx.get_service::<Config>()? })
///     }
/// }
///
/// let mut services = ServiceCollection::new();
/// services.add_singleton(Config { url: "postgres://localhost".into() })?;
/// services.add_scoped_type::<Repository>()?;
///
/// let provider = services.build();
/// assert_eq!(provider.get_service::<Repository>()?.config.url, "postgres://localhost");
/// # Ok::<(), scoped_injector::DiError>(())
/// ```
pub trait Injectable: Sized + Send + Sync + 'static {
    /// Builds an instance, resolving dependencies from `ctx`.
    fn construct(ctx: &ResolverContext<'_>) -> DiResult<Self>;
}

pub(crate) fn constructor_of<T: Injectable>() -> Factory {
    Arc::new(|ctx: &ResolverContext<'_>| T::construct(ctx).map(|v| Arc::new(v) as AnyArc))
}
