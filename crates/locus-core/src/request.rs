//! Resource locate requests.
//!
//! A locate request comes in two shapes, and each shape produces its own
//! kind of [`LookupKey`]:
//!
//! - short: `(scope, path)` → params `[path]`
//! - full: `(scope, path, style, variation, locale, extension, strict)` →
//!   params `[path, style, variation, locale, extension, "true"|"false"]`

use crate::error::KeyError;
use crate::key::{LookupKey, ScopeId};

/// Number of key parameters produced by a full request.
pub const FULL_ARITY: usize = 6;

/// A request to locate a resource relative to a scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocateRequest {
    scope: ScopeId,
    path: String,
    style: Option<String>,
    variation: Option<String>,
    locale: Option<String>,
    extension: Option<String>,
    strict: bool,
    full: bool,
}

impl LocateRequest {
    /// Short-form request: scope and path only.
    pub fn new(scope: impl Into<ScopeId>, path: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            path: path.into(),
            style: None,
            variation: None,
            locale: None,
            extension: None,
            strict: false,
            full: false,
        }
    }

    /// Full-form request with every optional part absent.
    pub fn full(scope: impl Into<ScopeId>, path: impl Into<String>) -> Self {
        Self {
            full: true,
            ..Self::new(scope, path)
        }
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self.full = true;
        self
    }

    pub fn with_variation(mut self, variation: impl Into<String>) -> Self {
        self.variation = Some(variation.into());
        self.full = true;
        self
    }

    /// Locale as `ll`, `ll_CC` or `ll_CC_variant`.
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self.full = true;
        self
    }

    /// Extension, or a comma-separated list of extensions tried in order.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self.full = true;
        self
    }

    /// Disable fallback to less specific names.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self.full = true;
        self
    }

    pub fn scope(&self) -> &ScopeId {
        &self.scope
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }

    pub fn variation(&self) -> Option<&str> {
        self.variation.as_deref()
    }

    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn is_full(&self) -> bool {
        self.full
    }

    /// Convert to the cache key for this request.
    pub fn to_key(&self) -> Result<LookupKey, KeyError> {
        if self.scope.is_empty() {
            return Err(KeyError::EmptyScope);
        }
        if self.path.is_empty() {
            return Err(KeyError::EmptyPath {
                scope: self.scope.to_string(),
            });
        }

        let key = LookupKey::new(self.scope.clone()).param(self.path.clone());
        if !self.full {
            return Ok(key);
        }

        Ok(key
            .optional(self.style.clone())
            .optional(self.variation.clone())
            .optional(self.locale.clone())
            .optional(self.extension.clone())
            .param(if self.strict { "true" } else { "false" }))
    }

    /// Decode a key produced by [`LocateRequest::to_key`].
    pub fn from_key(key: &LookupKey) -> Result<Self, KeyError> {
        key.validate()?;

        let path = match key.get(0) {
            Some(path) if !path.is_empty() => path.to_string(),
            _ => {
                return Err(KeyError::EmptyPath {
                    scope: key.scope().to_string(),
                })
            }
        };

        match key.len() {
            1 => Ok(Self::new(key.scope().clone(), path)),
            FULL_ARITY => {
                let strict = match key.get(5) {
                    Some("true") => true,
                    Some("false") | None => false,
                    Some(other) => {
                        return Err(KeyError::StrictFlag {
                            value: other.to_string(),
                        })
                    }
                };
                Ok(Self {
                    scope: key.scope().clone(),
                    path,
                    style: key.get(1).map(String::from),
                    variation: key.get(2).map(String::from),
                    locale: key.get(3).map(String::from),
                    extension: key.get(4).map(String::from),
                    strict,
                    full: true,
                })
            }
            found => Err(KeyError::Arity {
                found,
                expected: FULL_ARITY,
            }),
        }
    }
}
