//! Resolver counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Point-in-time view of a resolver's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,

    /// Lookups that had to consult the delegate.
    pub misses: u64,

    /// Delegate invocations (successful or not).
    pub delegate_calls: u64,

    /// Delegate invocations that returned an error.
    pub delegate_failures: u64,

    /// Delegate invocations that found nothing.
    pub not_found: u64,

    /// Entries dropped to respect the capacity bound.
    pub evictions: u64,

    /// Entries dropped because their time-to-live elapsed.
    pub expirations: u64,

    /// Entries currently cached.
    pub entries: u64,
}

impl CacheStats {
    /// Fraction of lookups served from the cache (0.0 when idle).
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0.0;
        }
        self.hits as f64 / total as f64
    }
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub(crate) hits: AtomicU64,
    pub(crate) misses: AtomicU64,
    pub(crate) delegate_calls: AtomicU64,
    pub(crate) delegate_failures: AtomicU64,
    pub(crate) not_found: AtomicU64,
    pub(crate) evictions: AtomicU64,
    pub(crate) expirations: AtomicU64,
}

impl Counters {
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, entries: u64) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            delegate_calls: self.delegate_calls.load(Ordering::Relaxed),
            delegate_failures: self.delegate_failures.load(Ordering::Relaxed),
            not_found: self.not_found.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            entries,
        }
    }
}
