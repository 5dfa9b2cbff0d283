//! File-system resource locator.
//!
//! [`FileSystemLocator`] is a [`Delegate`] that finds resource files below a
//! list of root directories. A key's scope selects a directory (`a::b::Page`
//! → `a/b`), the request's qualifiers select candidate file names (see
//! [`candidate_names`]), and the first regular file that exists wins.
//!
//! Wrap it in a [`CachingResolver`](crate::CachingResolver) so repeated
//! lookups skip the file-system probing.

mod names;

use std::io;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use tracing::{debug, trace};

use crate::error::KeyError;
use crate::key::{LookupKey, ScopeId};
use crate::request::LocateRequest;
use crate::resolver::Delegate;

pub use names::{candidate_names, Candidate};

/// File-system locator errors.
#[derive(Debug, thiserror::Error)]
pub enum LocatorError {
    /// Key does not describe a locate request.
    #[error("invalid locate key: {0}")]
    InvalidKey(#[from] KeyError),

    /// Path escapes the root directories.
    #[error("path escapes resource roots: {path}")]
    PathTraversal { path: String },

    /// I/O failure other than "not found".
    #[error("failed to probe {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// A resource file found by [`FileSystemLocator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocatedResource {
    /// Absolute or root-relative path of the file.
    pub path: PathBuf,

    /// Candidate name that matched, relative to the scope directory.
    pub name: String,

    /// Style qualifier of the matched name.
    pub style: Option<String>,

    /// Variation qualifier of the matched name.
    pub variation: Option<String>,

    /// Locale qualifier of the matched name.
    pub locale: Option<String>,
}

/// Locates resource files below one or more root directories.
#[derive(Debug, Clone, Default)]
pub struct FileSystemLocator {
    roots: Vec<PathBuf>,
}

impl FileSystemLocator {
    pub fn new(roots: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    /// Add a root, searched after the existing ones.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.roots.push(root.into());
        self
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Locate the resource described by `request`.
    pub fn locate(
        &self,
        request: &LocateRequest,
    ) -> Result<Option<LocatedResource>, LocatorError> {
        let dir = scope_dir(request.scope(), request.path());
        let candidates = candidate_names(request);

        for candidate in &candidates {
            let relative = dir.join(candidate.name.trim_start_matches('/'));
            ensure_contained(&relative)?;

            for root in &self.roots {
                let path = root.join(&relative);
                trace!(path = %path.display(), "probing candidate");
                if is_file(&path)? {
                    debug!(
                        scope = %request.scope(),
                        path = %path.display(),
                        "located resource"
                    );
                    return Ok(Some(LocatedResource {
                        path,
                        name: candidate.name.clone(),
                        style: candidate.style.clone(),
                        variation: candidate.variation.clone(),
                        locale: candidate.locale.clone(),
                    }));
                }
            }
        }

        debug!(
            scope = %request.scope(),
            path = request.path(),
            candidates = candidates.len(),
            "resource not found"
        );
        Ok(None)
    }
}

impl Delegate for FileSystemLocator {
    type Resource = LocatedResource;
    type Error = LocatorError;

    fn resolve(&self, key: &LookupKey) -> Result<Option<LocatedResource>, LocatorError> {
        let request = LocateRequest::from_key(key)?;
        self.locate(&request)
    }

    fn validate_key(&self, key: &LookupKey) -> Result<(), KeyError> {
        LocateRequest::from_key(key).map(|_| ())
    }
}

/// Directory a scope maps to: `a::b::Page` → `a/b`.
///
/// Absolute request paths (`/x/y`) ignore the scope.
fn scope_dir(scope: &ScopeId, path: &str) -> PathBuf {
    if path.starts_with('/') {
        return PathBuf::new();
    }
    let scope = scope.as_str();
    // Generic arguments are not part of the module path.
    let scope = scope.split('<').next().unwrap_or(scope);
    let mut segments: Vec<&str> = scope.split("::").filter(|s| !s.is_empty()).collect();
    segments.pop();
    segments.into_iter().collect()
}

fn ensure_contained(relative: &Path) -> Result<(), LocatorError> {
    let escapes = relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(LocatorError::PathTraversal {
            path: relative.display().to_string(),
        });
    }
    Ok(())
}

fn is_file(path: &Path) -> Result<bool, LocatorError> {
    match std::fs::metadata(path) {
        Ok(meta) => Ok(meta.is_file()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(LocatorError::Io {
            path: path.display().to_string(),
            source: e,
        }),
    }
}
