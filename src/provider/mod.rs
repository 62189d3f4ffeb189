//! Service provider module for dependency injection.
//!
//! This module contains the ServiceProvider type: one resolution context in
//! a tree of scopes, owning its descriptor table, instantiation stack and
//! teardown callbacks.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, trace, warn};

use crate::ambient;
use crate::config::ProviderOptions;
use crate::descriptors::ServiceDescriptor;
use crate::error::DiResult;
use crate::hints::InjectionHints;
use crate::internal::{InstantiationStacks, StackFrame, TeardownFn, TeardownList};
use crate::key::{Key, KeyKind};
use crate::lifetime::Lifetime;
use crate::registration::{scoped_copy, Descriptor, DescriptorMap, Factory};
use crate::traits::ResolverCore;

pub mod context;
pub use context::ResolverContext;

/// Callback notified when an unregistered type is bound ad hoc.
pub(crate) type UnknownScopedHook = Arc<dyn Fn(&Key) + Send + Sync>;

/// A resolution context: the root provider or any scope created from it.
///
/// Every context owns its own descriptor table, instantiation stacks (one
/// per resolving thread) and teardown list. Singletons are shared with the
/// whole tree through shared descriptors; scoped services are cached once per
/// context; transients are created on every request.
///
/// Cloning is cheap and yields a handle to the *same* context.
///
/// # Examples
///
/// ```
/// use scoped_injector::{Resolver, ServiceCollection};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// struct RequestId(usize);
///
/// let counter = Arc::new(AtomicUsize::new(0));
/// let c = counter.clone();
///
/// let mut services = ServiceCollection::new();
/// services.add_scoped_factory::<RequestId, _>(move |_| {
///     Ok(RequestId(c.fetch_add(1, Ordering::SeqCst)))
/// })?;
///
/// let provider = services.build();
/// let scope1 = provider.create_scope();
/// let scope2 = provider.create_scope();
///
/// let a = scope1.get_service::<RequestId>()?;
/// let b = scope1.get_service::<RequestId>()?;
/// let c = scope2.get_service::<RequestId>()?;
///
/// assert!(Arc::ptr_eq(&a, &b));
/// assert_ne!(a.0, c.0);
/// # Ok::<(), scoped_injector::DiError>(())
/// ```
#[derive(Clone)]
pub struct ServiceProvider {
    inner: Arc<ProviderInner>,
}

struct ProviderInner {
    descriptors: RwLock<DescriptorMap>,
    stacks: InstantiationStacks,
    teardown: Arc<Mutex<TeardownList>>,
    root_teardown: Arc<Mutex<TeardownList>>,
    options: ProviderOptions,
    on_unknown_scoped: Option<UnknownScopedHook>,
    depth: usize,
}

impl ServiceProvider {
    pub(crate) fn new(
        descriptors: DescriptorMap,
        options: ProviderOptions,
        on_unknown_scoped: Option<UnknownScopedHook>,
    ) -> Self {
        let teardown = Arc::new(Mutex::new(TeardownList::default()));
        Self::with_depth(descriptors, options, on_unknown_scoped, teardown, 0)
    }

    fn with_depth(
        descriptors: DescriptorMap,
        options: ProviderOptions,
        on_unknown_scoped: Option<UnknownScopedHook>,
        root_teardown: Arc<Mutex<TeardownList>>,
        depth: usize,
    ) -> Self {
        let teardown = if depth == 0 {
            root_teardown.clone()
        } else {
            Arc::new(Mutex::new(TeardownList::default()))
        };
        Self {
            inner: Arc::new(ProviderInner {
                descriptors: RwLock::new(descriptors),
                stacks: InstantiationStacks::default(),
                teardown,
                root_teardown,
                options,
                on_unknown_scoped,
                depth,
            }),
        }
    }

    /// Creates a child context.
    ///
    /// The child's table is derived from this context's *current* table,
    /// including services bound ad hoc here. Singleton descriptors are
    /// shared; scoped and transient ones start with an empty cache. The
    /// child starts with an empty stack and no teardown callbacks.
    pub fn create_scope(&self) -> ServiceProvider {
        let descriptors = scoped_copy(&self.inner.descriptors.read());
        let depth = self.inner.depth + 1;
        debug!(depth, services = descriptors.len(), "Creating child scope");
        Self::with_depth(
            descriptors,
            self.inner.options.clone(),
            self.inner.on_unknown_scoped.clone(),
            self.inner.root_teardown.clone(),
            depth,
        )
    }

    /// Runs every teardown callback registered on this context, in
    /// registration order.
    ///
    /// Callbacks are not removed: calling `teardown` again runs them again.
    /// Children are not torn down; each context is torn down explicitly.
    pub fn teardown(&self) {
        let callbacks = self.inner.teardown.lock().snapshot();
        debug!(depth = self.inner.depth, callbacks = callbacks.len(), "Running teardown");
        for callback in callbacks {
            callback();
        }
    }

    /// Number of teardown callbacks registered on this context.
    pub fn teardown_count(&self) -> usize {
        self.inner.teardown.lock().len()
    }

    /// Number of resolutions the calling thread currently has in progress on
    /// this context.
    ///
    /// Zero whenever no resolution is running, including after a failed one.
    pub fn instantiation_depth(&self) -> usize {
        self.inner.stacks.depth()
    }

    /// Distance from the root provider; the root is `0`.
    pub fn scope_depth(&self) -> usize {
        self.inner.depth
    }

    /// The options this context was built with.
    pub fn options(&self) -> &ProviderOptions {
        &self.inner.options
    }

    /// Whether `key` has a descriptor in this context's table.
    pub fn contains(&self, key: &Key) -> bool {
        self.inner.descriptors.read().contains_key(key)
    }

    /// Lifetime of the descriptor for `key`, if bound here.
    pub fn lifetime_of(&self, key: &Key) -> Option<Lifetime> {
        self.inner.descriptors.read().get(key).map(|d| d.lifetime())
    }

    /// Snapshot of this context's table, sorted by rendered identifier.
    pub fn service_descriptors(&self) -> Vec<ServiceDescriptor> {
        let table = self.inner.descriptors.read();
        let mut out: Vec<_> = table
            .iter()
            .map(|(key, d)| ServiceDescriptor::new(key, d.lifetime(), d.is_populated()))
            .collect();
        out.sort_by(|a, b| a.render().cmp(&b.render()));
        out
    }

    /// True when both handles refer to the same context.
    pub fn ptr_eq(&self, other: &ServiceProvider) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Human-readable dump of the descriptor table.
    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        use std::fmt::Write;

        let mut out = format!(
            "ServiceProvider (scope depth {}, in flight {}, teardown {})\n",
            self.inner.depth,
            self.instantiation_depth(),
            self.teardown_count()
        );
        for descriptor in self.service_descriptors() {
            let _ = writeln!(
                out,
                "  {} {}{}",
                descriptor.render(),
                descriptor.lifetime(),
                if descriptor.is_instantiated() { " (cached)" } else { "" }
            );
        }
        out
    }

    pub(crate) fn push_teardown(&self, f: TeardownFn) {
        self.inner.teardown.lock().push(f);
    }

    pub(crate) fn teardown_list(&self) -> &Mutex<TeardownList> {
        &self.inner.teardown
    }

    /// Teardown list of the root provider, which owns singleton disposers.
    pub(crate) fn root_teardown_list(&self) -> &Mutex<TeardownList> {
        &self.inner.root_teardown
    }

    /// Finds the descriptor for `key`, binding an ad hoc scoped descriptor
    /// when allowed and a constructor is available.
    fn lookup(&self, key: &Key, constructor: Option<&Factory>) -> Option<Arc<Descriptor>> {
        if let Some(descriptor) = self.inner.descriptors.read().get(key) {
            return Some(descriptor.clone());
        }

        let constructor = constructor?;
        if !self.inner.options.allow_unknown_scoped_services || key.kind() != KeyKind::Type {
            return None;
        }

        let mut inserted = false;
        let descriptor = self
            .inner
            .descriptors
            .write()
            .entry(key.clone())
            .or_insert_with(|| {
                inserted = true;
                Arc::new(Descriptor::new(Lifetime::Scoped, constructor.clone()))
            })
            .clone();

        if inserted {
            debug!(service = %key.render(), depth = self.inner.depth, "Bound unregistered service as scoped");
            if let Some(hook) = &self.inner.on_unknown_scoped {
                hook(key);
            }
        }
        Some(descriptor)
    }

    /// Resolves `key` in this context.
    ///
    /// The key is pushed onto the instantiation stack before anything else;
    /// a key already on the stack fails with a circular error before any
    /// factory runs. While the factory runs this context is the ambient
    /// context. Teardown callbacks registered by a singleton factory go to
    /// the root provider. Any failure (or panic) unwinds the frame, which clears the
    /// whole stack.
    pub(crate) fn resolve_key(
        &self,
        key: &Key,
        hints: Option<&InjectionHints>,
        constructor: Option<&Factory>,
    ) -> DiResult<Option<Arc<dyn Any + Send + Sync>>> {
        trace!(service = %key.render(), depth = self.inner.depth, "Resolving");

        let frame = StackFrame::enter(&self.inner.stacks, key).inspect_err(|err| {
            warn!(error = %err, "Circular dependency detected");
        })?;

        let instance = match self.lookup(key, constructor) {
            Some(descriptor) => {
                let _ambient = ambient::enter_context(self);
                let mut ctx = ResolverContext::new(self, hints);
                // Singletons outlive the scope that first builds them.
                if descriptor.lifetime() == Lifetime::Singleton {
                    ctx = ctx.with_root_teardown();
                }
                Some(descriptor.get_instance(&ctx)?)
            }
            None => None,
        };

        frame.complete()?;
        Ok(instance)
    }
}

impl ResolverCore for ServiceProvider {
    fn resolve_any(
        &self,
        key: &Key,
        hints: Option<&InjectionHints>,
    ) -> DiResult<Option<Arc<dyn Any + Send + Sync>>> {
        self.resolve_key(key, hints, None)
    }

    fn resolve_or_construct(
        &self,
        key: &Key,
        hints: Option<&InjectionHints>,
        constructor: &Factory,
    ) -> DiResult<Option<Arc<dyn Any + Send + Sync>>> {
        self.resolve_key(key, hints, Some(constructor))
    }

    fn push_teardown(&self, f: Arc<dyn Fn() + Send + Sync>) {
        ServiceProvider::push_teardown(self, f);
    }
}

impl fmt::Debug for ServiceProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceProvider")
            .field("scope_depth", &self.inner.depth)
            .field("services", &self.inner.descriptors.read().len())
            .field("instantiation_depth", &self.instantiation_depth())
            .finish()
    }
}
