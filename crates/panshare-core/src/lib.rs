//! Path resolution and caching engine for a unified cloud-drive namespace.
//!
//! This crate presents a remote cloud-storage account together with any number
//! of publicly shared links as one slash-separated, read-mostly namespace:
//!
//! | Path | Designates |
//! |------|------------|
//! | `/` | synthetic root: the drive plus every active share the account created |
//! | `/0/...` | the account's own drive |
//! | `/<key>/...` | a shared link without password |
//! | `/<key>:<pwd>/...` | a shared link protected by a 4-character password |
//!
//! # Components
//!
//! - [`RemoteGateway`] - the four remote operations the engine consumes
//! - [`Namespace`] - path resolution, lazy child enumeration, signed URLs
//! - [`NodeCache`] - bounded LRU map of canonical path to [`Node`]
//! - [`UrlCache`] - bounded, expiry-aware map of content identity to signed URL
//!
//! # How It Works
//!
//! Resolving a path consults the [`NodeCache`] first, then walks down from the
//! deepest cached ancestor. Each folder fetches its children at most once per
//! instance; every child produced is registered in the cache under its own
//! path, so later requests for siblings or descendants start deeper.
//!
//! File content is never proxied. [`Namespace::content_url`] hands back a
//! time-limited signed URL the protocol layer redirects to. URLs are keyed by
//! `(content hash, size)` so that the same content reached via different paths
//! shares one cache entry.
//!
//! # Example
//!
//! ```ignore
//! use panshare_core::{Namespace, NamespaceConfig};
//!
//! let ns = Namespace::new(gateway, NamespaceConfig::default());
//!
//! let node = ns.resolve("/0/docs/a.txt").await?;
//! if let Some(file) = node.as_file() {
//!     let url = ns.content_url(file).await?;
//!     println!("redirect to {url}");
//! }
//! ```

pub mod address;
pub mod cache;
mod config;
mod error;
pub mod gateway;
pub mod model;
mod namespace;
pub mod node;

/// In-memory gateway and clock for tests.
///
/// Available to this crate's unit tests and, with the `testing` feature, to
/// downstream integration tests.
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use cache::{CachedUrl, Clock, ContentKey, NodeCache, SystemClock, UrlCache};
pub use config::{
    NamespaceConfig, DEFAULT_NODE_CACHE_CAPACITY, DEFAULT_URL_CACHE_CAPACITY, URL_SAFETY_MARGIN,
};
pub use error::{Error, ErrorCategory, Result};
pub use gateway::{GatewayError, RemoteGateway};
pub use model::{Entry, SharePage, ShareRecord, ShareScope};
pub use namespace::Namespace;
pub use node::{Children, FileNode, FolderNode, FolderRole, Node};
