//! Integration tests for CachingResolver.
//!
//! Cover memoization, negative-caching policy, key discrimination, identity
//! of returned resources, failure handling, bounds/TTL and concurrent use.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Mutex};
use std::thread;
use std::time::Duration;

use locus_core::{
    delegate_fn, CachePolicy, CachingResolver, Delegate, LocateRequest, LookupKey, ResolveError,
    ScopeId,
};

#[derive(Debug, thiserror::Error)]
enum StubError {
    #[error("stub backend timed out")]
    Timeout,
}

/// Mock delegate: answers from a table, records every call.
#[derive(Default)]
struct StubDelegate {
    answers: HashMap<LookupKey, Arc<str>>,
    calls: Mutex<Vec<LookupKey>>,
    fail_next: AtomicUsize,
}

impl StubDelegate {
    fn when(mut self, key: LookupKey, answer: &str) -> Self {
        self.answers.insert(key, Arc::from(answer));
        self
    }

    fn times(&self, key: &LookupKey) -> usize {
        self.calls.lock().unwrap().iter().filter(|k| *k == key).count()
    }

    fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Delegate for StubDelegate {
    type Resource = Arc<str>;
    type Error = StubError;

    fn resolve(&self, key: &LookupKey) -> Result<Option<Arc<str>>, StubError> {
        self.calls.lock().unwrap().push(key.clone());
        if self
            .fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(StubError::Timeout);
        }
        Ok(self.answers.get(key).cloned())
    }
}

fn full_request() -> LocateRequest {
    LocateRequest::new(ScopeId::of::<String>(), "path")
        .with_style("style")
        .with_variation("variation")
        .with_extension("extension")
        .strict(true)
}

#[test]
fn test_file_resource_hits_delegate_once() {
    let key = full_request().to_key().unwrap();
    let resolver = CachingResolver::new(
        StubDelegate::default().when(
            key.clone(),
            "style=style, variation=variation, extension=extension",
        ),
    );

    resolver.locate_request(&full_request()).unwrap();
    resolver.locate_request(&full_request()).unwrap();

    assert_eq!(resolver.delegate().times(&key), 1);
}

#[test]
fn test_url_resource_hits_delegate_once() {
    let key = LocateRequest::new(ScopeId::of::<String>(), "path")
        .to_key()
        .unwrap();
    let resolver =
        CachingResolver::new(StubDelegate::default().when(key.clone(), "file:///"));

    let first = resolver.locate(ScopeId::of::<String>(), "path").unwrap();
    let second = resolver.locate(ScopeId::of::<String>(), "path").unwrap();

    assert_eq!(resolver.delegate().times(&key), 1);
    assert_eq!(first.as_deref().map(|s| &**s), Some("file:///"));
    assert_eq!(second.as_deref().map(|s| &**s), Some("file:///"));
}

#[test]
fn test_missing_resource_asks_delegate_every_time() {
    let resolver = CachingResolver::new(StubDelegate::default());

    assert!(resolver.locate(ScopeId::of::<String>(), "path").unwrap().is_none());
    assert!(resolver.locate(ScopeId::of::<String>(), "path").unwrap().is_none());

    let key = LookupKey::new(ScopeId::of::<String>()).param("path");
    assert_eq!(resolver.delegate().times(&key), 2);

    let stats = resolver.stats();
    assert_eq!(stats.not_found, 2);
    assert_eq!(stats.hits, 0);
    assert_eq!(stats.entries, 0);
}

#[test]
fn test_missing_resource_cached_when_policy_allows() {
    let policy = CachePolicy::default().with_cache_not_found(true);
    let resolver = CachingResolver::with_policy(StubDelegate::default(), policy).unwrap();

    for _ in 0..3 {
        assert!(resolver.locate(ScopeId::of::<String>(), "path").unwrap().is_none());
    }

    assert_eq!(resolver.delegate().total_calls(), 1);
    assert_eq!(resolver.stats().hits, 2);
}

#[test]
fn test_style_presence_is_a_distinct_key() {
    let styled = LocateRequest::new("app::Page", "Page.html").with_style("dark");
    let unstyled = LocateRequest::full("app::Page", "Page.html");
    let resolver = CachingResolver::new(
        StubDelegate::default()
            .when(styled.to_key().unwrap(), "dark")
            .when(unstyled.to_key().unwrap(), "plain"),
    );

    let a = resolver.locate_request(&styled).unwrap().unwrap();
    let b = resolver.locate_request(&unstyled).unwrap().unwrap();

    assert_eq!(&**a, "dark");
    assert_eq!(&**b, "plain");
    assert_eq!(resolver.delegate().total_calls(), 2);
    assert_eq!(resolver.len(), 2);
}

#[test]
fn test_returns_the_delegates_instance() {
    let produced: Mutex<Option<Arc<Vec<u8>>>> = Mutex::new(None);
    let resolver = CachingResolver::new(delegate_fn(|_key: &LookupKey| {
        let bytes = Arc::new(vec![1u8, 2, 3]);
        *produced.lock().unwrap() = Some(Arc::clone(&bytes));
        Ok::<_, StubError>(Some(bytes))
    }));

    let first = resolver.locate("scope", "blob").unwrap().unwrap();
    let second = resolver.locate("scope", "blob").unwrap().unwrap();

    let made = produced.lock().unwrap().clone().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&*first, &made));
}

#[test]
fn test_failure_then_success_is_cached() {
    let key = LookupKey::new("scope").param("flaky");
    let delegate = StubDelegate::default().when(key.clone(), "ok");
    delegate.fail_next.store(1, Ordering::SeqCst);
    let resolver = CachingResolver::new(delegate);

    let err = resolver.resolve(&key).unwrap_err();
    assert!(err.is_retryable());
    assert!(matches!(err, ResolveError::Delegate(StubError::Timeout)));

    assert_eq!(&**resolver.resolve(&key).unwrap().unwrap(), "ok");
    assert_eq!(&**resolver.resolve(&key).unwrap().unwrap(), "ok");
    assert_eq!(resolver.delegate().times(&key), 2);
}

#[test]
fn test_misuse_is_rejected_before_delegate() {
    let resolver = CachingResolver::new(StubDelegate::default());

    assert!(matches!(
        resolver.resolve(&LookupKey::new("").param("path")),
        Err(ResolveError::InvalidKey(_))
    ));
    assert!(matches!(
        resolver.locate("scope", ""),
        Err(ResolveError::InvalidKey(_))
    ));
    assert_eq!(resolver.delegate().total_calls(), 0);
    assert!(resolver.is_empty());
}

#[test]
fn test_capacity_bound_is_respected() {
    let policy = CachePolicy::default().with_max_entries(8);
    let resolver = CachingResolver::with_policy(
        delegate_fn(|key: &LookupKey| Ok::<_, StubError>(key.get(0).map(String::from))),
        policy,
    )
    .unwrap();

    for i in 0..64 {
        let value = resolver.locate("scope", format!("item-{i}")).unwrap().unwrap();
        assert_eq!(value.as_str(), format!("item-{i}"));
    }

    assert!(resolver.len() <= 8);
    assert!(resolver.stats().evictions > 0);
}

#[test]
fn test_entries_expire_after_ttl() {
    let policy = CachePolicy::default().with_ttl(Duration::from_millis(50));
    let resolver = CachingResolver::with_policy(
        StubDelegate::default().when(LookupKey::new("scope").param("p"), "v"),
        policy,
    )
    .unwrap();
    let key = LookupKey::new("scope").param("p");

    resolver.resolve(&key).unwrap();
    resolver.resolve(&key).unwrap();
    assert_eq!(resolver.delegate().times(&key), 1);

    thread::sleep(Duration::from_millis(120));

    assert!(!resolver.contains(&key));
    let stats = resolver.stats();
    assert!(stats.expirations >= 1);
    assert_eq!(stats.entries, 0);

    resolver.resolve(&key).unwrap();
    assert_eq!(resolver.delegate().times(&key), 2);
}

#[test]
fn test_concurrent_distinct_keys() {
    const THREADS: usize = 16;
    const ROUNDS: usize = 50;

    let mut delegate = StubDelegate::default();
    for i in 0..THREADS {
        delegate = delegate.when(
            LookupKey::new("scope").param(format!("key-{i}")),
            &format!("value-{i}"),
        );
    }
    let resolver = Arc::new(CachingResolver::new(delegate));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let resolver = Arc::clone(&resolver);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let key = LookupKey::new("scope").param(format!("key-{i}"));
                barrier.wait();
                for _ in 0..ROUNDS {
                    let value = resolver.resolve(&key).unwrap().unwrap();
                    assert_eq!(&**value, format!("value-{i}"));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    // Distinct keys never race each other, so each one misses exactly once.
    assert_eq!(resolver.delegate().total_calls(), THREADS);
    let stats = resolver.stats();
    assert_eq!(stats.entries, THREADS as u64);
    assert_eq!(stats.hits, (THREADS * (ROUNDS - 1)) as u64);
}

#[test]
fn test_concurrent_same_key_has_single_visible_value() {
    const THREADS: usize = 8;

    let counter = AtomicUsize::new(0);
    let resolver = Arc::new(CachingResolver::new(delegate_fn(
        move |_key: &LookupKey| {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(20));
            Ok::<_, StubError>(Some(n))
        },
    )));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let resolver = Arc::clone(&resolver);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                resolver.locate("scope", "shared").unwrap().unwrap()
            })
        })
        .collect();

    let results: Vec<Arc<usize>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let cached = resolver.locate("scope", "shared").unwrap().unwrap();
    for result in &results {
        assert!(Arc::ptr_eq(result, &cached));
    }
    assert_eq!(*cached, 0);
    let stats = resolver.stats();
    assert_eq!(stats.delegate_calls, 1);
    assert_eq!(stats.hits, THREADS as u64);
    assert_eq!(resolver.len(), 1);
}

#[test]
fn test_concurrent_same_key_not_found_is_shared() {
    const THREADS: usize = 8;

    let resolver = Arc::new(CachingResolver::new(delegate_fn(|_key: &LookupKey| {
        thread::sleep(Duration::from_millis(20));
        Ok::<Option<String>, StubError>(None)
    })));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let resolver = Arc::clone(&resolver);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                resolver.locate("scope", "missing").unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap().is_none());
    }
    assert!(resolver.is_empty());
    assert!(resolver.stats().delegate_calls >= 1);
}
