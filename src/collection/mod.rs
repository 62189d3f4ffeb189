//! Service collection module for dependency injection.
//!
//! This module contains the ServiceCollection type, the registry that
//! services are registered into before a root provider is built.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::ProviderOptions;
use crate::descriptors::ServiceDescriptor;
use crate::error::{ConfigurationError, DiError, DiResult};
use crate::key::{key_of_type, Key, Token};
use crate::lifetime::Lifetime;
use crate::provider::{ResolverContext, ServiceProvider, UnknownScopedHook};
use crate::registration::{scoped_copy, Descriptor, DescriptorMap, Factory, Provision};
use crate::traits::injectable::constructor_of;
use crate::traits::Injectable;

pub mod declarations;
pub mod module_system;
pub use declarations::{Declaration, InjectableOptions};
pub use module_system::ServiceModule;

/// Registry of service descriptors.
///
/// Every registration is validated before it touches the table: re-registering
/// an identifier with a *different* lifetime is rejected (and leaves the
/// existing registration in place), while re-registering with the same
/// lifetime replaces it.
///
/// # Examples
///
/// ```rust
/// use scoped_injector::{Resolver, ServiceCollection};
///
/// struct Config { database_url: String }
///
/// let mut services = ServiceCollection::new();
/// services.add_singleton(Config { database_url: "postgres://localhost".to_string() })?;
///
/// // Singleton already registered
/// assert!(services.add_transient_factory::<Config, _>(|_| {
///     Ok(Config { database_url: String::new() })
/// }).is_err());
///
/// let provider = services.build();
/// assert_eq!(provider.get_service::<Config>()?.database_url, "postgres://localhost");
/// # Ok::<(), scoped_injector::DiError>(())
/// ```
pub struct ServiceCollection {
    descriptors: DescriptorMap,
    options: ProviderOptions,
    on_unknown_scoped: Option<UnknownScopedHook>,
}

impl ServiceCollection {
    /// Creates a new empty service collection.
    pub fn new() -> Self {
        Self {
            descriptors: DescriptorMap::default(),
            options: ProviderOptions::default(),
            on_unknown_scoped: None,
        }
    }

    // ----- Options -----

    /// Replaces the provider options.
    pub fn with_options(&mut self, options: ProviderOptions) -> &mut Self {
        self.options = options;
        self
    }

    /// Enables ad hoc scoped binding of unregistered [`Injectable`] types.
    pub fn allow_unknown_scoped_services(&mut self) -> &mut Self {
        self.options.allow_unknown_scoped_services = true;
        self
    }

    /// Installs a callback run each time a context binds an unregistered type
    /// ad hoc.
    pub fn on_unknown_scoped_service<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(&Key) + Send + Sync + 'static,
    {
        self.on_unknown_scoped = Some(Arc::new(callback));
        self
    }

    pub fn options(&self) -> &ProviderOptions {
        &self.options
    }

    // ----- Core registration -----

    /// Registers `T` with an explicit lifetime.
    ///
    /// Fails with [`ConfigurationError::LifetimeConflict`] if `T` is already
    /// registered with another lifetime, and with
    /// [`ConfigurationError::ScopedValue`] for a fixed value registered as
    /// scoped.
    pub fn add<T: Send + Sync + 'static>(
        &mut self,
        lifetime: Lifetime,
        provision: Provision<T>,
    ) -> DiResult<&mut Self> {
        self.register(key_of_type::<T>(), lifetime, provision)
    }

    /// Registers `token` with an explicit lifetime.
    pub fn add_token<T: Send + Sync + 'static>(
        &mut self,
        token: &Token<T>,
        lifetime: Lifetime,
        provision: Provision<T>,
    ) -> DiResult<&mut Self> {
        self.register(token.key(), lifetime, provision)
    }

    /// Checks that `key` may be registered with `lifetime`.
    pub fn validate_add(&self, key: &Key, lifetime: Lifetime) -> DiResult<()> {
        check_lifetime(key, self.lifetime_of(key), lifetime)
    }

    fn register<T: Send + Sync + 'static>(
        &mut self,
        key: Key,
        lifetime: Lifetime,
        provision: Provision<T>,
    ) -> DiResult<&mut Self> {
        let checked = self
            .validate_add(&key, lifetime)
            .and_then(|()| provision.into_factory(&key, lifetime));
        let factory = checked.inspect_err(|err| warn!(error = %err, "Rejected service registration"))?;
        self.insert(key, lifetime, factory);
        Ok(self)
    }

    fn register_constructor(&mut self, key: Key, lifetime: Lifetime, constructor: Factory) -> DiResult<&mut Self> {
        self.validate_add(&key, lifetime)
            .inspect_err(|err| warn!(error = %err, "Rejected service registration"))?;
        self.insert(key, lifetime, constructor);
        Ok(self)
    }

    fn insert(&mut self, key: Key, lifetime: Lifetime, factory: Factory) {
        debug!(service = %key.render(), %lifetime, "Registered service");
        self.descriptors.insert(key, Arc::new(Descriptor::new(lifetime, factory)));
    }

    // ----- Concrete Type Registrations -----

    /// Registers a singleton instance shared across the entire scope tree.
    ///
    /// ```rust
    /// # use scoped_injector::ServiceCollection;
    /// struct Config { database_url: String }
    ///
    /// let mut services = ServiceCollection::new();
    /// services.add_singleton(Config { database_url: "postgres://localhost".to_string() })?;
    /// # Ok::<(), scoped_injector::DiError>(())
    /// ```
    pub fn add_singleton<T: Send + Sync + 'static>(&mut self, value: T) -> DiResult<&mut Self> {
        self.add(Lifetime::Singleton, Provision::value(value))
    }

    /// Registers a singleton factory, called once on first request.
    pub fn add_singleton_factory<T, F>(&mut self, factory: F) -> DiResult<&mut Self>
    where
        T: Send + Sync + 'static,
        F: Fn(&ResolverContext<'_>) -> DiResult<T> + Send + Sync + 'static,
    {
        self.add(Lifetime::Singleton, Provision::factory(factory))
    }

    /// Registers a scoped factory, called once per resolution context.
    pub fn add_scoped_factory<T, F>(&mut self, factory: F) -> DiResult<&mut Self>
    where
        T: Send + Sync + 'static,
        F: Fn(&ResolverContext<'_>) -> DiResult<T> + Send + Sync + 'static,
    {
        self.add(Lifetime::Scoped, Provision::factory(factory))
    }

    /// Registers a fixed value as transient.
    ///
    /// Every resolution returns the same shared value; use
    /// [`add_transient_factory`](Self::add_transient_factory) for fresh
    /// instances.
    pub fn add_transient<T: Send + Sync + 'static>(&mut self, value: T) -> DiResult<&mut Self> {
        self.add(Lifetime::Transient, Provision::value(value))
    }

    /// Registers a transient factory, called on every request.
    pub fn add_transient_factory<T, F>(&mut self, factory: F) -> DiResult<&mut Self>
    where
        T: Send + Sync + 'static,
        F: Fn(&ResolverContext<'_>) -> DiResult<T> + Send + Sync + 'static,
    {
        self.add(Lifetime::Transient, Provision::factory(factory))
    }

    // ----- Injectable Registrations -----

    /// Registers `T` as a singleton built by [`Injectable::construct`].
    pub fn add_singleton_type<T: Injectable>(&mut self) -> DiResult<&mut Self> {
        self.add_type::<T>(Lifetime::Singleton)
    }

    /// Registers `T` as scoped, built by [`Injectable::construct`].
    pub fn add_scoped_type<T: Injectable>(&mut self) -> DiResult<&mut Self> {
        self.add_type::<T>(Lifetime::Scoped)
    }

    /// Registers `T` as transient, built by [`Injectable::construct`].
    pub fn add_transient_type<T: Injectable>(&mut self) -> DiResult<&mut Self> {
        self.add_type::<T>(Lifetime::Transient)
    }

    /// Registers `T` with `lifetime`, built by [`Injectable::construct`].
    pub fn add_type<T: Injectable>(&mut self, lifetime: Lifetime) -> DiResult<&mut Self> {
        self.register_constructor(key_of_type::<T>(), lifetime, constructor_of::<T>())
    }

    // ----- Token Registrations -----

    pub fn add_singleton_token<T: Send + Sync + 'static>(
        &mut self,
        token: &Token<T>,
        value: T,
    ) -> DiResult<&mut Self> {
        self.add_token(token, Lifetime::Singleton, Provision::value(value))
    }

    pub fn add_singleton_token_factory<T, F>(&mut self, token: &Token<T>, factory: F) -> DiResult<&mut Self>
    where
        T: Send + Sync + 'static,
        F: Fn(&ResolverContext<'_>) -> DiResult<T> + Send + Sync + 'static,
    {
        self.add_token(token, Lifetime::Singleton, Provision::factory(factory))
    }

    pub fn add_scoped_token_factory<T, F>(&mut self, token: &Token<T>, factory: F) -> DiResult<&mut Self>
    where
        T: Send + Sync + 'static,
        F: Fn(&ResolverContext<'_>) -> DiResult<T> + Send + Sync + 'static,
    {
        self.add_token(token, Lifetime::Scoped, Provision::factory(factory))
    }

    pub fn add_transient_token<T: Send + Sync + 'static>(
        &mut self,
        token: &Token<T>,
        value: T,
    ) -> DiResult<&mut Self> {
        self.add_token(token, Lifetime::Transient, Provision::value(value))
    }

    pub fn add_transient_token_factory<T, F>(&mut self, token: &Token<T>, factory: F) -> DiResult<&mut Self>
    where
        T: Send + Sync + 'static,
        F: Fn(&ResolverContext<'_>) -> DiResult<T> + Send + Sync + 'static,
    {
        self.add_token(token, Lifetime::Transient, Provision::factory(factory))
    }

    // ----- Bulk Registration -----

    /// Applies a batch of declarations.
    ///
    /// The batch is validated as a whole before anything is registered: a
    /// declaration without a lifetime, or whose lifetime conflicts with the
    /// table or with an earlier declaration of the same type, fails the
    /// batch and leaves the collection unchanged.
    pub fn add_declared<I>(&mut self, declarations: I) -> DiResult<&mut Self>
    where
        I: IntoIterator<Item = Declaration>,
    {
        let mut staged: Vec<(Key, Lifetime, Factory)> = Vec::new();
        let mut pending: HashMap<Key, Lifetime> = HashMap::new();

        for declaration in declarations {
            let (key, options, constructor) = declaration.into_parts();
            let checked = options
                .lifetime
                .ok_or_else(|| {
                    DiError::from(ConfigurationError::MissingLifetime {
                        name: key.display_name().to_string(),
                    })
                })
                .and_then(|lifetime| {
                    let existing = pending.get(&key).copied().or_else(|| self.lifetime_of(&key));
                    check_lifetime(&key, existing, lifetime).map(|()| lifetime)
                });
            let lifetime = checked.inspect_err(|err| warn!(error = %err, "Rejected declaration batch"))?;

            pending.insert(key.clone(), lifetime);
            staged.push((key, lifetime, constructor));
        }

        for (key, lifetime, constructor) in staged {
            self.insert(key, lifetime, constructor);
        }
        Ok(self)
    }

    /// Lets `module` register its services.
    pub fn add_module<M: ServiceModule>(&mut self, module: M) -> DiResult<&mut Self> {
        module.register_services(self)?;
        Ok(self)
    }

    // ----- Introspection -----

    pub fn contains(&self, key: &Key) -> bool {
        self.descriptors.contains_key(key)
    }

    pub fn contains_type<T: ?Sized + 'static>(&self) -> bool {
        self.contains(&key_of_type::<T>())
    }

    /// Lifetime registered for `key`, if any.
    pub fn lifetime_of(&self, key: &Key) -> Option<Lifetime> {
        self.descriptors.get(key).map(|d| d.lifetime())
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Snapshot of all registrations, sorted by rendered identifier.
    pub fn service_descriptors(&self) -> Vec<ServiceDescriptor> {
        let mut out: Vec<_> = self
            .descriptors
            .iter()
            .map(|(key, d)| ServiceDescriptor::new(key, d.lifetime(), false))
            .collect();
        out.sort_by(|a, b| a.render().cmp(&b.render()));
        out
    }

    /// Builds the root resolution context.
    ///
    /// The root gets its own copy of the table, as if it were a scope of the
    /// collection: every cache starts empty.
    pub fn build(self) -> ServiceProvider {
        debug!(services = self.descriptors.len(), "Building root provider");
        ServiceProvider::new(scoped_copy(&self.descriptors), self.options, self.on_unknown_scoped)
    }
}

impl Default for ServiceCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ServiceCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceCollection")
            .field("services", &self.descriptors.len())
            .field("options", &self.options)
            .finish()
    }
}

fn check_lifetime(key: &Key, existing: Option<Lifetime>, requested: Lifetime) -> DiResult<()> {
    match existing {
        Some(existing) if existing != requested => Err(ConfigurationError::LifetimeConflict {
            name: key.display_name().to_string(),
            existing,
            requested,
        }
        .into()),
        _ => Ok(()),
    }
}
