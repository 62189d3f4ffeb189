//! Ambient ("current") resolution context.
//!
//! Each thread keeps a stack of entered contexts. The top of the stack is the
//! current context, which [`inject`] and friends resolve against. Every
//! resolution enters its context for the duration of the factory call, so
//! code running inside a factory can use [`inject`] without being handed a
//! resolver.
//!
//! ```
//! use scoped_injector::{enter_context, inject, DiError, ServiceCollection};
//!
//! let mut services = ServiceCollection::new();
//! services.add_singleton(String::from("hello"))?;
//! let provider = services.build();
//!
//! assert!(matches!(inject::<String>(), Err(DiError::NoActiveContext)));
//! {
//!     let _guard = enter_context(&provider);
//!     assert_eq!(*inject::<String>()?, "hello");
//! }
//! assert!(matches!(inject::<String>(), Err(DiError::NoActiveContext)));
//! # Ok::<(), DiError>(())
//! ```

use std::cell::RefCell;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::key::Token;
use crate::provider::ServiceProvider;
use crate::traits::Resolver;

thread_local! {
    static CONTEXT_STACK: RefCell<Vec<ServiceProvider>> = const { RefCell::new(Vec::new()) };
}

/// Keeps a context entered on the current thread until dropped.
///
/// Guards must be dropped in reverse order of creation; dropping a guard
/// also leaves any context entered after it.
#[must_use = "the context is left as soon as the guard is dropped"]
pub struct AmbientGuard {
    depth: usize,
    _not_send: PhantomData<*const ()>,
}

impl Drop for AmbientGuard {
    fn drop(&mut self) {
        // The thread-local may already be gone during thread teardown.
        let _ = CONTEXT_STACK.try_with(|stack| {
            stack.borrow_mut().truncate(self.depth - 1);
        });
    }
}

/// Makes `provider` the current context on this thread.
pub fn enter_context(provider: &ServiceProvider) -> AmbientGuard {
    CONTEXT_STACK.with(|stack| {
        let mut stack = stack.borrow_mut();
        stack.push(provider.clone());
        AmbientGuard {
            depth: stack.len(),
            _not_send: PhantomData,
        }
    })
}

/// The current context, if any.
pub fn current_context() -> Option<ServiceProvider> {
    CONTEXT_STACK.with(|stack| stack.borrow().last().cloned())
}

/// Runs `f` with `provider` as the current context.
///
/// The previous context is restored when `f` returns or unwinds.
pub fn with_context<R>(provider: &ServiceProvider, f: impl FnOnce() -> R) -> R {
    let _guard = enter_context(provider);
    f()
}

fn require_context() -> DiResult<ServiceProvider> {
    current_context().ok_or(DiError::NoActiveContext)
}

/// Resolves `T` from the current context.
pub fn inject<T: Send + Sync + 'static>() -> DiResult<Arc<T>> {
    require_context()?.get_service::<T>()
}

/// Resolves `T` from the current context, `Ok(None)` if unregistered.
pub fn inject_optional<T: Send + Sync + 'static>() -> DiResult<Option<Arc<T>>> {
    require_context()?.get_optional_service::<T>()
}

/// Resolves `token` from the current context.
pub fn inject_token<T: Send + Sync + 'static>(token: &Token<T>) -> DiResult<Arc<T>> {
    require_context()?.get_token(token)
}
