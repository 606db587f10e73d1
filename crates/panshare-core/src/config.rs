//! Namespace configuration.

use std::time::Duration;

/// Default capacity of the node cache.
pub const DEFAULT_NODE_CACHE_CAPACITY: u64 = 65_536;

/// Default capacity of the signed URL cache.
pub const DEFAULT_URL_CACHE_CAPACITY: u64 = 1_024;

/// Subtracted from the remote-declared URL expiry at insertion time, so a
/// consumer never receives a URL that expires mid-transfer.
pub const URL_SAFETY_MARGIN: Duration = Duration::from_secs(5 * 60);

/// Capacities and margins for a [`Namespace`](crate::Namespace).
#[derive(Debug, Clone)]
pub struct NamespaceConfig {
    /// Maximum number of cached nodes (LRU eviction).
    pub node_cache_capacity: u64,
    /// Maximum number of cached signed URLs.
    pub url_cache_capacity: u64,
    /// Margin subtracted from each signed URL's declared expiry.
    pub url_safety_margin: Duration,
}

impl Default for NamespaceConfig {
    fn default() -> Self {
        Self {
            node_cache_capacity: DEFAULT_NODE_CACHE_CAPACITY,
            url_cache_capacity: DEFAULT_URL_CACHE_CAPACITY,
            url_safety_margin: URL_SAFETY_MARGIN,
        }
    }
}

impl NamespaceConfig {
    /// Set the node cache capacity.
    #[must_use]
    pub fn with_node_cache_capacity(mut self, capacity: u64) -> Self {
        self.node_cache_capacity = capacity;
        self
    }

    /// Set the URL cache capacity.
    #[must_use]
    pub fn with_url_cache_capacity(mut self, capacity: u64) -> Self {
        self.url_cache_capacity = capacity;
        self
    }
}
