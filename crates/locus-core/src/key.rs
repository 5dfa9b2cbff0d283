//! Lookup keys.
//!
//! A [`LookupKey`] is a scope tag plus an ordered list of optional string
//! parameters. Keys compare and hash by value, component by component, so an
//! absent parameter (`None`) at position `i` is different from any present
//! value at that position, and keys of different length never collide.

use std::borrow::Cow;
use std::fmt;

use serde::Serialize;

use crate::error::KeyError;

/// Scope a lookup is performed in (usually a type name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ScopeId(Cow<'static, str>);

impl ScopeId {
    /// Scope with an explicit name.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// Scope named after a Rust type, e.g. `alloc::string::String`.
    pub fn of<T: ?Sized>() -> Self {
        Self(Cow::Borrowed(std::any::type_name::<T>()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for ScopeId {
    fn from(name: &'static str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ScopeId {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// Immutable identity of one resolution request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LookupKey {
    scope: ScopeId,
    params: Vec<Option<String>>,
}

impl LookupKey {
    /// Key with no parameters.
    pub fn new(scope: impl Into<ScopeId>) -> Self {
        Self {
            scope: scope.into(),
            params: Vec::new(),
        }
    }

    /// Key from a scope and a full parameter list.
    pub fn from_parts(scope: impl Into<ScopeId>, params: Vec<Option<String>>) -> Self {
        Self {
            scope: scope.into(),
            params,
        }
    }

    /// Append a present parameter.
    pub fn param(mut self, value: impl Into<String>) -> Self {
        self.params.push(Some(value.into()));
        self
    }

    /// Append an absent parameter.
    pub fn absent(mut self) -> Self {
        self.params.push(None);
        self
    }

    /// Append a parameter that may be absent.
    pub fn optional<S: Into<String>>(mut self, value: Option<S>) -> Self {
        self.params.push(value.map(Into::into));
        self
    }

    pub fn scope(&self) -> &ScopeId {
        &self.scope
    }

    pub fn params(&self) -> &[Option<String>] {
        &self.params
    }

    /// Parameter at `index`; `None` when absent or out of range.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.params.get(index).and_then(|p| p.as_deref())
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Reject keys that can never identify a resource.
    pub fn validate(&self) -> Result<(), KeyError> {
        if self.scope.is_empty() {
            return Err(KeyError::EmptyScope);
        }
        Ok(())
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.scope)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match param {
                Some(value) => write!(f, "{:?}", value)?,
                None => f.write_str("-")?,
            }
        }
        f.write_str(")")
    }
}
