//! Memoizing resolver over fallible keyed lookups.
//!
//! This crate provides:
//!
//! - [`CachingResolver`]: wraps any [`Delegate`] and asks it at most once per
//!   distinct [`LookupKey`], keeping found resources (and optionally "not
//!   found") until invalidated, evicted or expired
//! - [`CachePolicy`]: negative caching, capacity bound and time-to-live
//! - [`LocateRequest`]: the `(scope, path, style, variation, locale,
//!   extension, strict)` request shape and its key encoding
//! - [`FileSystemLocator`]: a delegate that finds resource files on disk
//!
//! # Quick Start
//!
//! ```no_run
//! use locus_core::{CachingResolver, FileSystemLocator, LocateRequest};
//!
//! # fn example() -> anyhow::Result<()> {
//! let resolver = CachingResolver::new(FileSystemLocator::new(["./resources"]));
//!
//! let request = LocateRequest::new("app::pages::Home", "Home.html").with_locale("de_CH");
//! if let Some(found) = resolver.locate_request(&request)? {
//!     println!("found {}", found.path.display());
//! }
//!
//! // Second lookup is served from the cache.
//! resolver.locate_request(&request)?;
//! assert_eq!(resolver.stats().delegate_calls, 1);
//! # Ok(())
//! # }
//! ```
//!
//! # Outcomes
//!
//! | Delegate returns | Caller gets | Cached |
//! |------------------|-------------|--------|
//! | `Ok(Some(r))` | `Ok(Some(Arc<r>))` | yes |
//! | `Ok(None)` | `Ok(None)` | only with `cache_not_found` |
//! | `Err(e)` | `Err(ResolveError::Delegate(e))` | never |
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `LOCUS_CACHE_NOT_FOUND` | Cache "not found" outcomes (default: off) |
//! | `LOCUS_CACHE_MAX_ENTRIES` | Entry bound (default: unbounded) |
//! | `LOCUS_CACHE_TTL_SECS` | Entry time-to-live in seconds (default: none) |

pub mod error;
pub mod key;
pub mod locator;
pub mod policy;
pub mod request;
pub mod resolver;
pub mod stats;

pub use error::{ConfigError, KeyError, ResolveError, ResolveResult};
pub use key::{LookupKey, ScopeId};
pub use locator::{FileSystemLocator, LocatedResource, LocatorError};
pub use policy::CachePolicy;
pub use request::LocateRequest;
pub use resolver::{delegate_fn, CachingResolver, Delegate, FnDelegate};
pub use stats::CacheStats;
