//! Service descriptors for introspection and diagnostics.

use crate::key::{Key, KeyKind};
use crate::lifetime::Lifetime;

/// Snapshot of one registered service.
///
/// Returned by [`ServiceCollection::service_descriptors`](crate::ServiceCollection::service_descriptors)
/// and [`ServiceProvider::service_descriptors`](crate::ServiceProvider::service_descriptors).
/// Collection snapshots never report an instance; provider snapshots report
/// whether that context has cached one.
///
/// # Examples
///
/// ```rust
/// use scoped_injector::{KeyKind, Lifetime, ServiceCollection, Token};
///
/// struct Database { url: String }
///
/// let port = Token::<u16>::new("port");
///
/// let mut services = ServiceCollection::new();
/// services.add_singleton(Database { url: "postgres://localhost".to_string() })?;
/// services.add_singleton_token(&port, 5432)?;
///
/// let descriptors = services.service_descriptors();
///
/// let db = descriptors.iter().find(|d| d.name().contains("Database")).unwrap();
/// assert_eq!(db.lifetime(), Lifetime::Singleton);
/// assert_eq!(db.kind(), KeyKind::Type);
///
/// let port = descriptors.iter().find(|d| d.kind() == KeyKind::Token).unwrap();
/// assert_eq!(port.render(), "[Token]port");
/// # Ok::<(), scoped_injector::DiError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ServiceDescriptor {
    key: Key,
    lifetime: Lifetime,
    instantiated: bool,
}

impl ServiceDescriptor {
    pub(crate) fn new(key: &Key, lifetime: Lifetime, instantiated: bool) -> Self {
        Self {
            key: key.clone(),
            lifetime,
            instantiated,
        }
    }

    /// The service identifier.
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// Type or token name.
    pub fn name(&self) -> &str {
        self.key.display_name()
    }

    /// Whether the identifier is a type or a token.
    pub fn kind(&self) -> KeyKind {
        self.key.kind()
    }

    /// `[Type]name` or `[Token]name`.
    pub fn render(&self) -> String {
        self.key.render()
    }

    /// Service lifetime
    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    /// Whether a cached instance exists in the context that produced this snapshot.
    pub fn is_instantiated(&self) -> bool {
        self.instantiated
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ServiceDescriptor {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("ServiceDescriptor", 4)?;
        state.serialize_field("kind", &self.kind())?;
        state.serialize_field("name", self.name())?;
        state.serialize_field("lifetime", &self.lifetime)?;
        state.serialize_field("instantiated", &self.instantiated)?;
        state.end()
    }
}
