//! Node identity cache and signed URL cache, both backed by Moka.
//!
//! # NodeCache
//!
//! Canonical path -> [`Node`], bounded, least-recently-used eviction. Nodes
//! are never explicitly destroyed; they leave only when capacity forces them
//! out. Memory-only and rebuildable.
//!
//! # UrlCache
//!
//! Content identity `(hash, size)` -> signed URL plus its adjusted expiry.
//! Expiry is checked lazily on every read against an injectable [`Clock`];
//! Moka's per-entry expiry additionally reclaims dead entries. Concurrent
//! misses for the same key join a single signing call.

use crate::gateway::GatewayError;
use crate::node::Node;
use moka::Expiry;
use moka::policy::EvictionPolicy;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tracing::{debug, trace, warn};
use url::Url;

/// Source of wall-clock time, in unix seconds.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Current unix timestamp in seconds.
    fn unix_now(&self) -> i64;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_now(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
    }
}

// ============================================================================
// NodeCache
// ============================================================================

/// Bounded LRU cache of resolved nodes keyed by canonical path.
#[derive(Clone)]
pub struct NodeCache {
    inner: moka::sync::Cache<String, Node>,
}

impl fmt::Debug for NodeCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeCache")
            .field("entries", &self.inner.entry_count())
            .finish()
    }
}

impl NodeCache {
    /// Create an empty cache holding at most `capacity` nodes.
    pub fn new(capacity: u64) -> Self {
        Self {
            inner: moka::sync::Cache::builder()
                .max_capacity(capacity)
                .eviction_policy(EvictionPolicy::lru())
                .build(),
        }
    }

    /// Look up a node by canonical path.
    pub fn get(&self, path: &str) -> Option<Node> {
        self.inner.get(path)
    }

    /// Insert or replace the node at `path`.
    pub fn insert(&self, path: String, node: Node) {
        self.inner.insert(path, node);
    }

    /// Return the cached node at `path`, or build and insert one.
    ///
    /// Check and insert happen under one per-key critical section: concurrent
    /// callers for the same path all observe the same node.
    pub fn get_or_insert_with(&self, path: String, make: impl FnOnce() -> Node) -> Node {
        self.inner.get_with(path, make)
    }

    /// Whether a node is cached at `path`.
    pub fn contains(&self, path: &str) -> bool {
        self.inner.contains_key(path)
    }

    /// Drop the node cached at `path`.
    pub fn invalidate(&self, path: &str) {
        self.inner.invalidate(path);
    }

    /// Drop every cached node.
    pub fn clear(&self) {
        self.inner.invalidate_all();
    }

    /// Approximate number of cached nodes.
    ///
    /// Call [`NodeCache::sync`] first for an exact count.
    pub fn len(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Whether the cache is empty (approximate).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply pending evictions and bookkeeping.
    pub fn sync(&self) {
        self.inner.run_pending_tasks();
    }
}

// ============================================================================
// UrlCache
// ============================================================================

/// Content identity of a file: stable across paths and re-resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentKey {
    /// Remote content hash.
    pub hash: String,
    /// Size in bytes.
    pub size: u64,
}

impl ContentKey {
    /// Create a content key.
    pub fn new(hash: String, size: u64) -> Self {
        Self { hash, size }
    }
}

/// A signed URL with its adjusted expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedUrl {
    /// Unix timestamp after which the URL must not be served.
    pub expires_at: i64,
    /// The signed URL.
    pub url: String,
}

impl CachedUrl {
    /// Whether the URL may still be served at `now`.
    pub fn is_fresh(&self, now: i64) -> bool {
        now < self.expires_at
    }
}

/// Extract the absolute expiry (`t` query parameter, unix seconds) of a signed URL.
pub fn signed_url_expiry(url: &str) -> Option<i64> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .query_pairs()
        .find(|(k, _)| k == "t")
        .and_then(|(_, v)| v.parse().ok())
}

/// Moka expiry derived from each entry's own adjusted expiry.
struct UrlExpiry {
    clock: Arc<dyn Clock>,
}

impl UrlExpiry {
    fn remaining(&self, value: &CachedUrl) -> Duration {
        let secs = value.expires_at.saturating_sub(self.clock.unix_now());
        Duration::from_secs(u64::try_from(secs).unwrap_or(0))
    }
}

impl Expiry<ContentKey, CachedUrl> for UrlExpiry {
    fn expire_after_create(
        &self,
        _key: &ContentKey,
        value: &CachedUrl,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(self.remaining(value))
    }

    fn expire_after_update(
        &self,
        _key: &ContentKey,
        value: &CachedUrl,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(self.remaining(value))
    }
}

/// Bounded, expiry-aware cache of signed download URLs.
#[derive(Clone)]
pub struct UrlCache {
    inner: moka::future::Cache<ContentKey, CachedUrl>,
    clock: Arc<dyn Clock>,
    margin: i64,
}

impl fmt::Debug for UrlCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UrlCache")
            .field("entries", &self.inner.entry_count())
            .field("margin", &self.margin)
            .finish_non_exhaustive()
    }
}

impl UrlCache {
    /// Create an empty cache holding at most `capacity` URLs.
    pub fn new(capacity: u64, safety_margin: Duration, clock: Arc<dyn Clock>) -> Self {
        let inner = moka::future::Cache::builder()
            .max_capacity(capacity)
            .expire_after(UrlExpiry {
                clock: Arc::clone(&clock),
            })
            .build();
        Self {
            inner,
            clock,
            margin: i64::try_from(safety_margin.as_secs()).unwrap_or(i64::MAX),
        }
    }

    /// Return the cached URL for `key` if it has not reached its adjusted expiry.
    ///
    /// A stale entry is dropped on the way out.
    pub async fn get_fresh(&self, key: &ContentKey) -> Option<CachedUrl> {
        let cached = self.inner.get(key).await?;
        if cached.is_fresh(self.clock.unix_now()) {
            return Some(cached);
        }
        trace!(hash = %key.hash, expires_at = cached.expires_at, "signed url expired");
        self.inner.invalidate(key).await;
        None
    }

    /// Return a fresh cached URL for `key`, or obtain one with `sign` and cache it.
    ///
    /// Concurrent callers missing the same key share one `sign` call. The
    /// stored expiry is the URL's own `t` parameter minus the safety margin.
    pub async fn get_or_sign<F>(&self, key: ContentKey, sign: F) -> Result<String, Arc<GatewayError>>
    where
        F: Future<Output = Result<String, GatewayError>>,
    {
        if let Some(hit) = self.get_fresh(&key).await {
            trace!(hash = %key.hash, "signed url cache hit");
            return Ok(hit.url);
        }

        let clock = Arc::clone(&self.clock);
        let margin = self.margin;
        let hash = key.hash.clone();
        let cached = self
            .inner
            .try_get_with(key, async move {
                let url = sign.await?;
                let expires_at = match signed_url_expiry(&url) {
                    Some(t) => t.saturating_sub(margin),
                    None => {
                        // Without a declared expiry the URL is handed out once, never reused
                        warn!(hash = %hash, "signed url carries no expiry parameter");
                        clock.unix_now()
                    }
                };
                debug!(hash = %hash, expires_at, "signed url cached");
                Ok(CachedUrl { expires_at, url })
            })
            .await?;
        Ok(cached.url)
    }

    /// Store a URL directly.
    pub async fn insert(&self, key: ContentKey, value: CachedUrl) {
        self.inner.insert(key, value).await;
    }

    /// Approximate number of cached URLs.
    pub fn len(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Whether the cache is empty (approximate).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply pending evictions and bookkeeping.
    pub async fn sync(&self) {
        self.inner.run_pending_tasks().await;
    }
}
