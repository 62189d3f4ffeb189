//! Internal teardown list for scope cleanup hooks.

use std::sync::Arc;

pub(crate) type TeardownFn = Arc<dyn Fn() + Send + Sync>;

/// Flat list of teardown callbacks, run in registration order.
///
/// Running the list does not drain it: a second `teardown()` re-runs every
/// callback. Guarding against that is left to the caller.
#[derive(Default)]
pub(crate) struct TeardownList {
    callbacks: Vec<TeardownFn>,
}

impl TeardownList {
    pub(crate) fn push(&mut self, f: TeardownFn) {
        self.callbacks.push(f);
    }

    /// Copy of the callbacks so they can run without the list locked.
    pub(crate) fn snapshot(&self) -> Vec<TeardownFn> {
        self.callbacks.clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.callbacks.len()
    }
}
