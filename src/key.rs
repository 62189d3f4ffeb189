//! Service identifiers for the dependency injection container.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static ANONYMOUS_TOKENS: AtomicU64 = AtomicU64::new(0);

/// Key for service storage and lookup.
///
/// Equality is identity based for both variants: a type key is equal only to
/// a key for the same `TypeId`, and a token key is equal only to a key created
/// from the same [`Token`] (or a clone of it). Display names never take part
/// in equality or hashing.
///
/// # Examples
///
/// ```rust
/// use scoped_injector::{key_of_type, Key, KeyKind, Token};
///
/// let a = Token::<u32>::new("port");
/// let b = Token::<u32>::new("port");
///
/// assert_eq!(a.key(), a.clone().key());
/// assert_ne!(a.key(), b.key());
/// assert_eq!(key_of_type::<String>().kind(), KeyKind::Type);
/// assert_eq!(a.key().render(), "[Token]port");
/// ```
#[derive(Clone)]
pub enum Key {
    /// Concrete type key with TypeId and name for diagnostics
    Type(TypeId, &'static str),
    /// Opaque token; identity is the token allocation
    Token(TokenRef),
}

impl Key {
    /// Get the type or token name for display
    pub fn display_name(&self) -> &str {
        match self {
            Key::Type(_, name) => name,
            Key::Token(token) => token.name(),
        }
    }

    /// Whether this key names a type or a token.
    pub fn kind(&self) -> KeyKind {
        match self {
            Key::Type(..) => KeyKind::Type,
            Key::Token(_) => KeyKind::Token,
        }
    }

    /// Renders the key as `[Type]name` or `[Token]name` for resolution chains.
    pub fn render(&self) -> String {
        match self.kind() {
            KeyKind::Type => format!("[Type]{}", self.display_name()),
            KeyKind::Token => format!("[Token]{}", self.display_name()),
        }
    }
}

impl PartialEq for Key {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Key::Type(a, _), Key::Type(b, _)) => a == b,
            (Key::Token(a), Key::Token(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Key {}

impl Hash for Key {
    #[inline(always)]
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Key::Type(id, _) => {
                0u8.hash(state);
                id.hash(state);
            }
            Key::Token(token) => {
                1u8.hash(state);
                token.hash(state);
            }
        }
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Identifier category, reported by not-found errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum KeyKind {
    /// A type reference
    Type,
    /// A [`Token`]
    Token,
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyKind::Type => f.write_str("type"),
            KeyKind::Token => f.write_str("token"),
        }
    }
}

struct TokenInner {
    name: Box<str>,
}

/// Untyped, identity-compared reference to a token allocation.
///
/// This is the reference-identity adapter that lets tokens live in hashed
/// maps: equality and hashing use the allocation address only.
#[derive(Clone)]
pub struct TokenRef(Arc<TokenInner>);

impl TokenRef {
    /// Diagnostic name of the token.
    pub fn name(&self) -> &str {
        &self.0.name
    }
}

impl PartialEq for TokenRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for TokenRef {}

impl Hash for TokenRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as usize).hash(state);
    }
}

impl fmt::Debug for TokenRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TokenRef").field(&self.name()).finish()
    }
}

/// Opaque identifier for a service of type `T`.
///
/// Use a token when no type reference is suitable, for example to register
/// several values of the same type. The name is for diagnostics only.
///
/// ```rust
/// use scoped_injector::{Resolver, ServiceCollection, Token};
///
/// let port = Token::<u16>::new("http-port");
/// let admin_port = Token::<u16>::new("http-port");
///
/// let mut services = ServiceCollection::new();
/// services.add_singleton_token(&port, 8080)?;
/// services.add_singleton_token(&admin_port, 9090)?;
///
/// let provider = services.build();
/// assert_eq!(*provider.get_token(&port)?, 8080);
/// assert_eq!(*provider.get_token(&admin_port)?, 9090);
/// # Ok::<(), scoped_injector::DiError>(())
/// ```
pub struct Token<T: ?Sized> {
    inner: TokenRef,
    _marker: PhantomData<fn() -> Box<T>>,
}

impl<T: ?Sized> Token<T> {
    /// Creates a new token; every call yields a distinct identity.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: TokenRef(Arc::new(TokenInner {
                name: name.into().into_boxed_str(),
            })),
            _marker: PhantomData,
        }
    }

    /// Creates a token with a generated diagnostic name.
    pub fn anonymous() -> Self {
        let n = ANONYMOUS_TOKENS.fetch_add(1, Ordering::Relaxed);
        Self::new(format!("Anonymous-{}", n))
    }

    /// Diagnostic name of the token.
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Registry key of this token.
    pub fn key(&self) -> Key {
        Key::Token(self.inner.clone())
    }
}

impl<T: ?Sized> Clone for Token<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: ?Sized> PartialEq for Token<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T: ?Sized> Eq for Token<T> {}

impl<T: ?Sized> fmt::Debug for Token<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("name", &self.name())
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

// Helper function for creating type keys
#[inline(always)]
pub fn key_of_type<T: ?Sized + 'static>() -> Key {
    Key::Type(TypeId::of::<T>(), std::any::type_name::<T>())
}
