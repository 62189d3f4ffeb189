//! Service module system for modular registration.
//!
//! This module provides the trait for organizing service registrations into
//! reusable modules.

use crate::{DiResult, ServiceCollection};

/// A module that can register services with a ServiceCollection.
///
/// Closures taking `&mut ServiceCollection` are modules too.
///
/// # Example
///
/// ```rust
/// use scoped_injector::{DiResult, Resolver, ServiceCollection, ServiceModule};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct UserConfig;
///
/// struct UserService {
///     _config: Arc<UserConfig>,
/// }
///
/// struct UserModule;
///
/// impl ServiceModule for UserModule {
///     fn register_services(self, services: &mut ServiceCollection) -> DiResult<()> {
///         services.add_singleton(UserConfig::default())?;
///         services.add_scoped_factory::<UserService, _>(|r| {
///             Ok(UserService { _config: r.get_service::<UserConfig>()? })
///         })?;
///         Ok(())
///     }
/// }
///
/// let mut services = ServiceCollection::new();
/// services
///     .add_module(UserModule)?
///     .add_module(|s: &mut ServiceCollection| -> DiResult<()> {
///         s.add_singleton(7u8)?;
///         Ok(())
///     })?;
///
/// let provider = services.build();
/// provider.create_scope().get_service::<UserService>()?;
/// # Ok::<(), scoped_injector::DiError>(())
/// ```
pub trait ServiceModule {
    /// Register this module's services with the ServiceCollection.
    fn register_services(self, services: &mut ServiceCollection) -> DiResult<()>;
}

impl<F> ServiceModule for F
where
    F: FnOnce(&mut ServiceCollection) -> DiResult<()>,
{
    fn register_services(self, services: &mut ServiceCollection) -> DiResult<()> {
        self(services)
    }
}
