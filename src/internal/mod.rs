//! Internal implementation details.

pub(crate) mod instantiation;
pub(crate) mod teardown;

pub(crate) use instantiation::{InstantiationStacks, StackFrame};
pub(crate) use teardown::{TeardownFn, TeardownList};
