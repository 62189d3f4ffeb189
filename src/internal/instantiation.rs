//! Circular dependency detection infrastructure.
//!
//! Every resolution context owns one [`InstantiationStacks`], holding one
//! [`InstantiationStack`] per thread that is resolving in it. Each lookup
//! pushes its key through a [`StackFrame`] guard; re-entrant lookups made by
//! factories extend the same stack, so a key that is requested while it is
//! already on the stack closes a cycle. Threads resolving the same context
//! concurrently never see each other's frames.

use std::collections::HashMap;
use std::thread::{self, ThreadId};

use parking_lot::Mutex;

use crate::error::{DiError, DiResult};
use crate::key::Key;

#[cfg(feature = "smallvec")]
type Frames = smallvec::SmallVec<[Key; 8]>;
#[cfg(not(feature = "smallvec"))]
type Frames = Vec<Key>;

/// Ordered record of identifiers currently under construction.
#[derive(Default)]
pub(crate) struct InstantiationStack {
    frames: Frames,
}

impl InstantiationStack {
    /// Pushes `key`, or reports the chain if it is already being constructed.
    fn push(&mut self, key: &Key) -> DiResult<()> {
        if self.frames.iter().any(|k| k == key) {
            let chain: Vec<String> = self.frames.iter().map(Key::render).collect();
            return Err(DiError::Circular(chain));
        }
        self.frames.push(key.clone());
        Ok(())
    }

    /// Pops the top frame, which must be `key`.
    fn pop_expecting(&mut self, key: &Key) -> DiResult<()> {
        match self.frames.pop() {
            Some(top) if top == *key => Ok(()),
            other => {
                self.frames.clear();
                Err(DiError::InternalConsistency {
                    expected: key.render(),
                    found: other.map(|k| k.render()).unwrap_or_else(|| "<empty>".to_string()),
                })
            }
        }
    }

    fn clear(&mut self) {
        self.frames.clear();
    }

    fn len(&self) -> usize {
        self.frames.len()
    }
}

/// Per-thread instantiation stacks of one resolution context.
#[derive(Default)]
pub(crate) struct InstantiationStacks {
    by_thread: Mutex<HashMap<ThreadId, InstantiationStack>>,
}

impl InstantiationStacks {
    fn with_current<R>(&self, f: impl FnOnce(&mut InstantiationStack) -> R) -> R {
        let id = thread::current().id();
        let mut stacks = self.by_thread.lock();
        let stack = stacks.entry(id).or_default();
        let result = f(stack);
        if stack.len() == 0 {
            stacks.remove(&id);
        }
        result
    }

    /// Depth of the calling thread's stack.
    pub(crate) fn depth(&self) -> usize {
        self.by_thread
            .lock()
            .get(&thread::current().id())
            .map_or(0, InstantiationStack::len)
    }
}

/// Guard for one pushed key.
///
/// Dropping a frame that was not completed (error return or unwinding panic)
/// clears the whole stack of the thread, so a failed resolution never leaves
/// keys behind that would flag later, unrelated lookups as circular.
pub(crate) struct StackFrame<'a> {
    stacks: &'a InstantiationStacks,
    key: Key,
    completed: bool,
}

impl<'a> StackFrame<'a> {
    pub(crate) fn enter(stacks: &'a InstantiationStacks, key: &Key) -> DiResult<Self> {
        stacks.with_current(|stack| stack.push(key))?;
        Ok(Self {
            stacks,
            key: key.clone(),
            completed: false,
        })
    }

    /// Pops the frame after a successful resolution.
    pub(crate) fn complete(mut self) -> DiResult<()> {
        self.completed = true;
        self.stacks.with_current(|stack| stack.pop_expecting(&self.key))
    }
}

impl Drop for StackFrame<'_> {
    fn drop(&mut self) {
        if !self.completed {
            self.stacks.with_current(InstantiationStack::clear);
        }
    }
}
