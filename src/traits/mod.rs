//! Core traits for the dependency injection container.

mod dispose;
pub(crate) mod injectable;
mod resolver;

pub use dispose::Dispose;
pub use injectable::Injectable;
pub use resolver::{Resolver, ResolverCore};
