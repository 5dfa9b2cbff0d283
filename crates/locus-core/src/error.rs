//! Error types for the caching resolver.

/// Malformed lookup keys. Raised before the delegate is consulted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    /// Scope identifier is empty.
    #[error("scope identifier is empty")]
    EmptyScope,

    /// Resource path is empty.
    #[error("resource path is empty (scope {scope})")]
    EmptyPath { scope: String },

    /// Key does not have the shape of a locate request.
    #[error("key has {found} parameters, expected 1 or {expected}")]
    Arity { found: usize, expected: usize },

    /// Strict flag is not `true` or `false`.
    #[error("invalid strict flag: {value}")]
    StrictFlag { value: String },
}

/// Errors surfaced by [`CachingResolver::resolve`](crate::CachingResolver::resolve).
///
/// `E` is the delegate's own error type; it is handed back unchanged.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError<E> {
    /// Caller supplied a malformed key. Nothing was cached.
    #[error("invalid lookup key: {0}")]
    InvalidKey(#[from] KeyError),

    /// Delegate failed. The outcome was not cached and the next call retries.
    #[error("delegate failed: {0}")]
    Delegate(#[source] E),
}

impl<E> ResolveError<E> {
    /// Whether retrying the same key may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Delegate(_))
    }

    /// The delegate error, if this is a delegate failure.
    pub fn delegate_error(&self) -> Option<&E> {
        match self {
            Self::Delegate(e) => Some(e),
            Self::InvalidKey(_) => None,
        }
    }

    /// Consume into the delegate error, if this is a delegate failure.
    pub fn into_delegate_error(self) -> Option<E> {
        match self {
            Self::Delegate(e) => Some(e),
            Self::InvalidKey(_) => None,
        }
    }
}

/// Policy/configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Policy values out of range.
    #[error("invalid cache policy: {message}")]
    Invalid { message: String },

    /// Policy document could not be parsed.
    #[error("failed to parse cache policy: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Policy file could not be read.
    #[error("failed to read cache policy {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for resolver operations.
pub type ResolveResult<T, E> = Result<T, ResolveError<E>>;
