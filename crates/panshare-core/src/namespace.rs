//! Path resolution, lazy child enumeration and signed URL lookup.
//!
//! [`Namespace`] owns the two caches and the gateway. It is cheap to share
//! behind an `Arc` and safe to call from many tasks at once.

use crate::address::{self, CanonicalPath, DRIVE_SEGMENT, ScopeToken};
use crate::cache::{Clock, NodeCache, SystemClock, UrlCache};
use crate::config::NamespaceConfig;
use crate::error::{Error, Result};
use crate::gateway::RemoteGateway;
use crate::model::{Entry, ShareRecord, ShareScope};
use crate::node::{Children, FileNode, FolderNode, FolderRole, Node};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument, trace, warn};

/// Cursor of the first page of the account's share list.
const FIRST_SHARE_PAGE: &str = "0";

/// The unified drive + shares namespace.
pub struct Namespace {
    gateway: Arc<dyn RemoteGateway>,
    nodes: NodeCache,
    urls: UrlCache,
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Namespace")
            .field("nodes", &self.nodes)
            .field("urls", &self.urls)
            .finish_non_exhaustive()
    }
}

impl Namespace {
    /// Create a namespace with empty caches.
    pub fn new(gateway: Arc<dyn RemoteGateway>, config: NamespaceConfig) -> Self {
        Self::with_clock(gateway, config, Arc::new(SystemClock))
    }

    /// Create a namespace whose URL expiry is judged by `clock`.
    pub fn with_clock(
        gateway: Arc<dyn RemoteGateway>,
        config: NamespaceConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            gateway,
            nodes: NodeCache::new(config.node_cache_capacity),
            urls: UrlCache::new(config.url_cache_capacity, config.url_safety_margin, clock),
        }
    }

    /// Wrap in an `Arc` for sharing between request handlers.
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// The node cache.
    pub fn node_cache(&self) -> &NodeCache {
        &self.nodes
    }

    /// The signed URL cache.
    pub fn url_cache(&self) -> &UrlCache {
        &self.urls
    }

    /// Resolve an arbitrary path to the node it designates.
    ///
    /// The path is normalized first; a cached node is returned without any
    /// remote call. Otherwise the walk starts from the deepest cached ancestor
    /// and enumerates one folder per remaining segment.
    #[instrument(level = "debug", skip(self))]
    pub async fn resolve(&self, path: &str) -> Result<Node> {
        let canonical = CanonicalPath::parse(path);
        let key = canonical.as_string();
        if let Some(node) = self.nodes.get(&key) {
            trace!(path = %key, "node cache hit");
            return Ok(node);
        }

        if canonical.is_root() {
            return Ok(self.root());
        }

        if canonical.is_well_known_probe() {
            trace!(path = %key, "well-known probe rejected");
            return Err(Error::not_found(key));
        }

        let (canonical, scope) = canonical.with_explicit_scope();
        let segments = canonical.segments();
        let scope_root = self.scope_root(&segments[0], scope);
        if segments.len() == 1 {
            return Ok(Node::Folder(scope_root));
        }

        // The implicit drive prefix may turn this into an already cached path
        let full = canonical.as_string();
        if full != key
            && let Some(node) = self.nodes.get(&full)
        {
            return Ok(node);
        }

        let (mut current, depth) = self.deepest_cached_ancestor(segments, scope_root);
        trace!(path = %full, depth, "walking from cached ancestor");

        for name in &segments[depth..] {
            let Node::Folder(folder) = &current else {
                return Err(Error::not_found(full));
            };
            let children = self.list_children(folder).await?;
            current = match children.get(name) {
                Some(child) => child.clone(),
                None => return Err(Error::not_found(full)),
            };
        }
        Ok(current)
    }

    /// The synthetic root, registered like any other folder so that its
    /// share listing is paged at most once per instance.
    fn root(&self) -> Node {
        self.nodes.get_or_insert_with(address::ROOT_PATH.to_string(), || {
            Node::Folder(Arc::new(FolderNode::root()))
        })
    }

    /// Return the cached scope root for `segment`, creating it if needed.
    fn scope_root(&self, segment: &str, scope: ScopeToken) -> Arc<FolderNode> {
        let path = address::join(address::ROOT_PATH, segment);
        let node = self.nodes.get_or_insert_with(path.clone(), || match scope {
            ScopeToken::Drive => Node::Folder(Arc::new(FolderNode::new(
                path.clone(),
                Entry::synthetic_folder(DRIVE_SEGMENT),
                None,
            ))),
            ScopeToken::Share(share) => {
                Node::from_entry(path.clone(), Entry::share_root(share), None)
            }
        });
        match node {
            Node::Folder(folder) => folder,
            // Only folders are ever registered directly under the root
            Node::File(_) => {
                warn!(path = %path, "file cached at scope root, replacing");
                let folder = Arc::new(FolderNode::new(
                    path.clone(),
                    Entry::synthetic_folder(segment),
                    None,
                ));
                self.nodes.insert(path, Node::Folder(Arc::clone(&folder)));
                folder
            }
        }
    }

    /// Find the deepest cached strict ancestor of `segments` below the scope root.
    ///
    /// Returns the node to start walking from and how many segments it covers.
    fn deepest_cached_ancestor(
        &self,
        segments: &[String],
        scope_root: Arc<FolderNode>,
    ) -> (Node, usize) {
        for len in (2..segments.len()).rev() {
            if let Some(node) = self.nodes.get(&address::prefix(segments, len)) {
                return (node, len);
            }
        }
        (Node::Folder(scope_root), 1)
    }

    /// Children of `folder`, enumerated at most once per folder instance.
    ///
    /// Concurrent callers join a single in-flight enumeration. A failed
    /// enumeration is not memoized; the next caller tries again.
    pub async fn list_children(&self, folder: &FolderNode) -> Result<Arc<Children>> {
        folder
            .children
            .get_or_try_init(|| self.enumerate(folder))
            .await
            .cloned()
    }

    #[instrument(level = "debug", skip_all, fields(path = %folder.path()))]
    async fn enumerate(&self, folder: &FolderNode) -> Result<Arc<Children>> {
        let children = match folder.role() {
            FolderRole::Root => self.enumerate_root().await?,
            FolderRole::Drive => {
                debug!(id = folder.entry().id, "listing drive directory");
                let entries = self.gateway.list_drive(folder.entry().id).await.inspect_err(
                    |e| warn!(path = %folder.path(), error = %e, "drive listing failed"),
                )?;
                self.adopt(folder.path(), entries, None)
            }
            FolderRole::Share(share) => {
                debug!(share = %share, id = folder.entry().id, "listing share directory");
                let entries = self
                    .gateway
                    .list_share(share, folder.entry().id)
                    .await
                    .inspect_err(
                        |e| warn!(path = %folder.path(), error = %e, "share listing failed"),
                    )?;
                self.adopt(folder.path(), entries, Some(share))
            }
        };
        debug!(count = children.len(), "enumerated");
        Ok(Arc::new(children))
    }

    /// Turn listed entries into nodes and register each under its own path.
    fn adopt(&self, parent: &str, entries: Vec<Entry>, share: Option<&ShareScope>) -> Children {
        entries
            .into_iter()
            .map(|entry| {
                let path = address::join(parent, &entry.name);
                let node = Node::from_entry(path.clone(), entry, share.cloned());
                self.nodes.insert(path, node.clone());
                node
            })
            .collect()
    }

    /// The drive root plus one folder per active share, across all pages.
    async fn enumerate_root(&self) -> Result<Children> {
        let mut records: Vec<ShareRecord> = Vec::new();
        let mut cursor = FIRST_SHARE_PAGE.to_string();
        loop {
            debug!(cursor = %cursor, "listing own shares");
            let page = self
                .gateway
                .list_my_shares(&cursor)
                .await
                .inspect_err(|e| warn!(error = %e, "share list failed"))?;
            let done = page.is_last() || page.next == cursor;
            records.extend(page.entries.into_iter().filter(ShareRecord::is_active));
            if done {
                break;
            }
            cursor = page.next;
        }

        // Registration happens only after every page arrived
        let drive = self.scope_root(DRIVE_SEGMENT, ScopeToken::Drive);
        let mut children = Children::default();
        children.push(Node::Folder(drive));
        for record in records {
            let path = address::join(address::ROOT_PATH, &record.scope.display_name());
            let node = self.nodes.get_or_insert_with(path.clone(), || {
                Node::from_entry(path.clone(), record.to_entry(), None)
            });
            children.push(node);
        }
        trace!(shares = children.len() - 1, "root enumerated");
        Ok(children)
    }

    /// A signed download URL for `file`, served from cache while fresh.
    ///
    /// Callers are expected to redirect to the URL rather than proxy bytes.
    #[instrument(level = "debug", skip_all, fields(path = %file.path()))]
    pub async fn content_url(&self, file: &FileNode) -> Result<String> {
        self.urls
            .get_or_sign(file.content_key(), async {
                debug!(hash = %file.entry().content_hash, "requesting signed url");
                self.gateway.signed_download_url(file).await
            })
            .await
            .map_err(Error::from)
    }
}
