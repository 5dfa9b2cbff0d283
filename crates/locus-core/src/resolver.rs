//! Memoizing resolver.
//!
//! [`CachingResolver`] wraps a [`Delegate`] and remembers every terminal
//! outcome the delegate reports:
//!
//! 1. Found resource: always cached, returned as the same `Arc` on every hit.
//! 2. Not found: cached only when [`CachePolicy::cache_not_found`] is set.
//! 3. Delegate error: never cached, the next call asks the delegate again.
//!
//! Misses on the same key are coalesced: one caller runs the delegate while
//! the others wait for its outcome, so a key never has more than one visible
//! value. Waiters on a failed lookup retry with a delegate call of their own.

use std::fmt;
use std::sync::Arc;

use moka::notification::RemovalCause;
use moka::sync::Cache;
use tracing::{debug, warn};

use crate::error::{ConfigError, KeyError, ResolveError, ResolveResult};
use crate::key::{LookupKey, ScopeId};
use crate::policy::CachePolicy;
use crate::request::LocateRequest;
use crate::stats::{CacheStats, Counters};

/// Keyed lookup the resolver defers to on a miss.
pub trait Delegate: Send + Sync {
    /// What a successful lookup produces. Opaque to the cache.
    type Resource: Send + Sync + 'static;

    /// Failure that is not a plain "not found".
    type Error: std::error::Error + Send + Sync + 'static;

    /// `Ok(None)` means nothing exists for `key`.
    fn resolve(&self, key: &LookupKey) -> Result<Option<Self::Resource>, Self::Error>;

    /// Reject keys this delegate can never answer. Checked before the cache
    /// is consulted, so a rejected key is never cached or retried.
    fn validate_key(&self, _key: &LookupKey) -> Result<(), KeyError> {
        Ok(())
    }
}

impl<D: Delegate + ?Sized> Delegate for Box<D> {
    type Resource = D::Resource;
    type Error = D::Error;

    fn resolve(&self, key: &LookupKey) -> Result<Option<Self::Resource>, Self::Error> {
        (**self).resolve(key)
    }

    fn validate_key(&self, key: &LookupKey) -> Result<(), KeyError> {
        (**self).validate_key(key)
    }
}

/// [`Delegate`] backed by a closure. Build with [`delegate_fn`].
pub struct FnDelegate<F> {
    f: F,
}

/// Wrap a closure as a [`Delegate`].
pub fn delegate_fn<F, R, E>(f: F) -> FnDelegate<F>
where
    F: Fn(&LookupKey) -> Result<Option<R>, E> + Send + Sync,
    R: Send + Sync + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    FnDelegate { f }
}

impl<F, R, E> Delegate for FnDelegate<F>
where
    F: Fn(&LookupKey) -> Result<Option<R>, E> + Send + Sync,
    R: Send + Sync + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    type Resource = R;
    type Error = E;

    fn resolve(&self, key: &LookupKey) -> Result<Option<R>, E> {
        (self.f)(key)
    }
}

impl<F> fmt::Debug for FnDelegate<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnDelegate").finish_non_exhaustive()
    }
}

/// Stored outcome for one key.
enum Cached<R> {
    Found(Arc<R>),
    NotFound,
}

impl<R> Clone for Cached<R> {
    fn clone(&self) -> Self {
        match self {
            Self::Found(resource) => Self::Found(Arc::clone(resource)),
            Self::NotFound => Self::NotFound,
        }
    }
}

/// Why a coalesced lookup left nothing in the cache.
#[derive(Debug)]
enum Uncached {
    NotFound,
    Failed,
}

impl<R> Cached<R> {
    fn into_option(self) -> Option<Arc<R>> {
        match self {
            Self::Found(resource) => Some(resource),
            Self::NotFound => None,
        }
    }
}

/// Memoizing view over a [`Delegate`].
pub struct CachingResolver<D: Delegate> {
    delegate: D,
    cache: Cache<LookupKey, Cached<D::Resource>>,
    policy: CachePolicy,
    counters: Arc<Counters>,
}

impl<D: Delegate> CachingResolver<D> {
    /// Resolver with the default policy: unbounded, no TTL, "not found" not cached.
    pub fn new(delegate: D) -> Self {
        Self::build(delegate, CachePolicy::default())
    }

    /// Resolver with a custom policy.
    pub fn with_policy(delegate: D, policy: CachePolicy) -> Result<Self, ConfigError> {
        policy.validate()?;
        Ok(Self::build(delegate, policy))
    }

    fn build(delegate: D, policy: CachePolicy) -> Self {
        let counters = Arc::new(Counters::default());

        let listener_counters = Arc::clone(&counters);
        let mut builder = Cache::<LookupKey, Cached<D::Resource>>::builder()
            .eviction_listener(move |key: Arc<LookupKey>, _value, cause: RemovalCause| {
                match cause {
                    RemovalCause::Size => {
                        Counters::bump(&listener_counters.evictions);
                        debug!(key = %key, "evicted to respect capacity");
                    }
                    RemovalCause::Expired => {
                        Counters::bump(&listener_counters.expirations);
                        debug!(key = %key, "entry expired");
                    }
                    _ => {}
                }
            });
        if let Some(max_entries) = policy.max_entries {
            builder = builder.max_capacity(max_entries);
        }
        if let Some(ttl) = policy.ttl {
            builder = builder.time_to_live(ttl);
        }

        Self {
            delegate,
            cache: builder.build(),
            policy,
            counters,
        }
    }

    /// Resolve `key`, consulting the delegate only on a miss.
    ///
    /// Returns `Ok(None)` when nothing exists for `key`.
    pub fn resolve(&self, key: &LookupKey) -> ResolveResult<Option<Arc<D::Resource>>, D::Error> {
        key.validate()?;
        self.delegate.validate_key(key)?;

        if let Some(cached) = self.cache.get(key) {
            Counters::bump(&self.counters.hits);
            debug!(key = %key, "cache hit");
            return Ok(cached.into_option());
        }

        loop {
            let mut failure = None;
            let result = self
                .cache
                .entry(key.clone())
                .or_try_insert_with(|| self.load(key, &mut failure));

            match result {
                Ok(entry) => {
                    if entry.is_fresh() {
                        debug!(key = %key, "cached delegate outcome");
                    } else {
                        Counters::bump(&self.counters.hits);
                        debug!(key = %key, "joined in-flight lookup");
                    }
                    return Ok(entry.into_value().into_option());
                }
                Err(reason) => {
                    if let Some(e) = failure {
                        return Err(ResolveError::Delegate(e));
                    }
                    match *reason {
                        Uncached::NotFound => return Ok(None),
                        Uncached::Failed => {
                            debug!(key = %key, "in-flight lookup failed, retrying");
                        }
                    }
                }
            }
        }
    }

    /// Ask the delegate. Runs at most once per key at a time.
    fn load(
        &self,
        key: &LookupKey,
        failure: &mut Option<D::Error>,
    ) -> Result<Cached<D::Resource>, Uncached> {
        Counters::bump(&self.counters.misses);
        Counters::bump(&self.counters.delegate_calls);
        debug!(key = %key, "cache miss, asking delegate");

        match self.delegate.resolve(key) {
            Ok(Some(resource)) => Ok(Cached::Found(Arc::new(resource))),
            Ok(None) => {
                Counters::bump(&self.counters.not_found);
                if self.policy.cache_not_found {
                    Ok(Cached::NotFound)
                } else {
                    debug!(key = %key, "not found, not cached");
                    Err(Uncached::NotFound)
                }
            }
            Err(e) => {
                Counters::bump(&self.counters.delegate_failures);
                warn!(key = %key, error = %e, "delegate failed, result not cached");
                *failure = Some(e);
                Err(Uncached::Failed)
            }
        }
    }

    /// Short-form locate: `(scope, path)`.
    pub fn locate(
        &self,
        scope: impl Into<ScopeId>,
        path: impl Into<String>,
    ) -> ResolveResult<Option<Arc<D::Resource>>, D::Error> {
        self.locate_request(&LocateRequest::new(scope, path))
    }

    /// Locate with style, variation, locale, extension and strictness.
    pub fn locate_request(
        &self,
        request: &LocateRequest,
    ) -> ResolveResult<Option<Arc<D::Resource>>, D::Error> {
        let key = request.to_key()?;
        self.resolve(&key)
    }

    /// Drop the entry for `key`. Returns whether one was cached.
    pub fn invalidate(&self, key: &LookupKey) -> bool {
        let removed = self.cache.remove(key).is_some();
        if removed {
            debug!(key = %key, "invalidated cache entry");
        }
        removed
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks();
        debug!("cleared resolver cache");
    }

    /// Whether an outcome (found or not found) is cached for `key`.
    pub fn contains(&self, key: &LookupKey) -> bool {
        self.cache.contains_key(key)
    }

    /// Number of cached entries.
    pub fn len(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of hit/miss/delegate counters.
    pub fn stats(&self) -> CacheStats {
        let entries = self.len();
        self.counters.snapshot(entries)
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    pub fn delegate(&self) -> &D {
        &self.delegate
    }
}

impl<D: Delegate + fmt::Debug> fmt::Debug for CachingResolver<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachingResolver")
            .field("delegate", &self.delegate)
            .field("policy", &self.policy)
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}
