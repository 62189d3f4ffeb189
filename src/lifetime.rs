//! Service lifetime definitions.

use std::fmt;

/// Service lifetimes controlling instance caching behavior
///
/// # Examples
///
/// ```rust
/// use scoped_injector::{Lifetime, Resolver, ServiceCollection};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct Repository { db_url: String }
/// struct RequestModel { id: u32 }
///
/// let mut services = ServiceCollection::new();
///
/// // Singleton: one instance for the whole scope tree
/// services.add_singleton(Database { url: "postgres://localhost".to_string() })?;
///
/// // Scoped: one instance per resolution context
/// services.add_scoped_factory::<Repository, _>(|r| {
///     let db = r.get_service::<Database>()?;
///     Ok(Repository { db_url: db.url.clone() })
/// })?;
///
/// // Transient: new instance every time
/// services.add_transient_factory::<RequestModel, _>(|_| Ok(RequestModel { id: 12345 }))?;
///
/// let provider = services.build();
///
/// let db1 = provider.get_service::<Database>()?;
/// let scope1 = provider.create_scope();
/// let db2 = scope1.get_service::<Database>()?;
/// assert!(Arc::ptr_eq(&db1, &db2));
///
/// let repo1a = scope1.get_service::<Repository>()?;
/// let repo1b = scope1.get_service::<Repository>()?;
/// assert!(Arc::ptr_eq(&repo1a, &repo1b));
///
/// let scope2 = provider.create_scope();
/// let repo2 = scope2.get_service::<Repository>()?;
/// assert!(!Arc::ptr_eq(&repo1a, &repo2));
///
/// let model1 = scope1.get_service::<RequestModel>()?;
/// let model2 = scope1.get_service::<RequestModel>()?;
/// assert!(!Arc::ptr_eq(&model1, &model2));
/// # Ok::<(), scoped_injector::DiError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Lifetime {
    /// Single instance for the root context and every descendant scope
    ///
    /// Created on first access anywhere in the tree and reused everywhere
    /// after that.
    Singleton,
    /// Single instance per resolution context
    ///
    /// The root context and every child scope each hold their own cache;
    /// siblings and ancestors never share.
    Scoped,
    /// New instance per resolution, never cached
    Transient,
}

impl Lifetime {
    /// Whether descriptors of this lifetime keep a cache cell.
    pub fn is_cached(self) -> bool {
        !matches!(self, Lifetime::Transient)
    }
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifetime::Singleton => f.write_str("singleton"),
            Lifetime::Scoped => f.write_str("scoped"),
            Lifetime::Transient => f.write_str("transient"),
        }
    }
}
