//! Path-addressed nodes of the namespace.
//!
//! A [`Node`] is either a [`FileNode`] or a [`FolderNode`]. Both are immutable
//! records built from a remote [`Entry`]; a folder additionally memoizes its
//! children the first time they are requested.

use crate::address::ROOT_PATH;
use crate::cache::ContentKey;
use crate::model::{Entry, ShareScope};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::OnceCell;

/// How a folder enumerates its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderRole {
    /// The synthetic root: drive root plus the account's active shares.
    Root,
    /// A directory of the account's drive.
    Drive,
    /// A directory inside a shared link.
    Share(ShareScope),
}

/// A file in the namespace.
#[derive(Debug)]
pub struct FileNode {
    path: String,
    entry: Entry,
    share: Option<ShareScope>,
}

/// A folder in the namespace.
#[derive(Debug)]
pub struct FolderNode {
    path: String,
    entry: Entry,
    role: FolderRole,
    pub(crate) children: OnceCell<Arc<Children>>,
}

/// A resolved node. Cheap to clone.
#[derive(Debug, Clone)]
pub enum Node {
    /// A file.
    File(Arc<FileNode>),
    /// A folder.
    Folder(Arc<FolderNode>),
}

impl FileNode {
    /// Build a file node at `path` resolved under `share` (`None` = drive).
    pub fn new(path: String, entry: Entry, share: Option<ShareScope>) -> Self {
        Self { path, entry, share }
    }

    /// Canonical path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The remote entry this node was built from.
    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    /// Share scope the file was resolved under; `None` for drive files.
    pub fn share(&self) -> Option<&ShareScope> {
        self.share.as_ref()
    }

    /// Identity used to cache signed URLs.
    ///
    /// Stable across re-resolution of the same remote object.
    pub fn content_key(&self) -> ContentKey {
        ContentKey::new(self.entry.content_hash.clone(), self.entry.byte_size)
    }
}

impl FolderNode {
    /// The synthetic root folder.
    pub fn root() -> Self {
        Self::with_role(ROOT_PATH.to_string(), Entry::synthetic_folder(""), FolderRole::Root)
    }

    /// Build a folder node at `path` resolved under `share` (`None` = drive).
    pub fn new(path: String, entry: Entry, share: Option<ShareScope>) -> Self {
        let role = match share {
            Some(share) => FolderRole::Share(share),
            None => FolderRole::Drive,
        };
        Self::with_role(path, entry, role)
    }

    fn with_role(path: String, entry: Entry, role: FolderRole) -> Self {
        Self {
            path,
            entry,
            role,
            children: OnceCell::new(),
        }
    }

    /// Canonical path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The remote (or synthetic) entry this node was built from.
    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    /// Enumeration strategy.
    pub fn role(&self) -> &FolderRole {
        &self.role
    }

    /// Share scope the folder was opened under; `None` for drive and root.
    pub fn share(&self) -> Option<&ShareScope> {
        match &self.role {
            FolderRole::Share(share) => Some(share),
            FolderRole::Root | FolderRole::Drive => None,
        }
    }

    /// Children, if they have already been enumerated.
    pub fn cached_children(&self) -> Option<Arc<Children>> {
        self.children.get().cloned()
    }
}

impl Node {
    /// Build the node for a listed entry under the parent's share scope.
    pub fn from_entry(path: String, entry: Entry, share: Option<ShareScope>) -> Self {
        let share = entry.share.clone().or(share);
        if entry.is_folder {
            Node::Folder(Arc::new(FolderNode::new(path, entry, share)))
        } else {
            Node::File(Arc::new(FileNode::new(path, entry, share)))
        }
    }

    fn entry(&self) -> &Entry {
        match self {
            Node::File(f) => &f.entry,
            Node::Folder(d) => &d.entry,
        }
    }

    /// Canonical path.
    pub fn path(&self) -> &str {
        match self {
            Node::File(f) => &f.path,
            Node::Folder(d) => &d.path,
        }
    }

    /// Display name (last path segment; empty for the root).
    pub fn name(&self) -> &str {
        &self.entry().name
    }

    /// Remote object id; 0 for synthetic folders.
    pub fn id(&self) -> u64 {
        self.entry().id
    }

    /// Creation time.
    pub fn created(&self) -> SystemTime {
        SystemTime::from(self.entry().created_at)
    }

    /// Last modification time.
    pub fn modified(&self) -> SystemTime {
        SystemTime::from(self.entry().updated_at)
    }

    /// Size in bytes; folders report 0.
    pub fn byte_size(&self) -> u64 {
        match self {
            Node::File(f) => f.entry.byte_size,
            Node::Folder(_) => 0,
        }
    }

    /// Content identity tag (the remote content hash).
    pub fn etag(&self) -> &str {
        &self.entry().content_hash
    }

    /// Whether this is a folder.
    pub fn is_folder(&self) -> bool {
        matches!(self, Node::Folder(_))
    }

    /// Share scope; `None` for drive nodes and the root.
    pub fn share(&self) -> Option<&ShareScope> {
        match self {
            Node::File(f) => f.share(),
            Node::Folder(d) => d.share(),
        }
    }

    /// The file, if this is one.
    pub fn as_file(&self) -> Option<&Arc<FileNode>> {
        match self {
            Node::File(f) => Some(f),
            Node::Folder(_) => None,
        }
    }

    /// The folder, if this is one.
    pub fn as_folder(&self) -> Option<&Arc<FolderNode>> {
        match self {
            Node::Folder(d) => Some(d),
            Node::File(_) => None,
        }
    }
}

/// Children of a folder in remote listing order, indexed by name.
///
/// A later entry with a duplicate name replaces the earlier one in place.
#[derive(Debug, Default)]
pub struct Children {
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
}

impl Children {
    pub(crate) fn push(&mut self, node: Node) {
        match self.index.get(node.name()) {
            Some(&slot) => self.nodes[slot] = node,
            None => {
                self.index.insert(node.name().to_string(), self.nodes.len());
                self.nodes.push(node);
            }
        }
    }

    /// Look up a child by name.
    pub fn get(&self, name: &str) -> Option<&Node> {
        self.index.get(name).map(|&slot| &self.nodes[slot])
    }

    /// Children in listing order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Child names in listing order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(Node::name)
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the folder is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl FromIterator<Node> for Children {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        let mut children = Children::default();
        for node in iter {
            children.push(node);
        }
        children
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{file_entry, folder_entry};

    #[test]
    fn test_file_metadata() {
        let node = Node::from_entry(
            "/0/a.txt".to_string(),
            file_entry(7, 0, "a.txt", "H1", 10),
            None,
        );
        assert!(!node.is_folder());
        assert_eq!(node.name(), "a.txt");
        assert_eq!(node.byte_size(), 10);
        assert_eq!(node.etag(), "H1");
        assert_eq!(node.id(), 7);
        assert!(node.share().is_none());

        let file = node.as_file().expect("file");
        assert_eq!(file.content_key(), ContentKey::new("H1".to_string(), 10));
    }

    #[test]
    fn test_folder_reports_zero_size() {
        let node = Node::from_entry("/0/docs".to_string(), folder_entry(3, 0, "docs"), None);
        assert!(node.is_folder());
        assert_eq!(node.byte_size(), 0);
        assert_eq!(node.as_folder().map(|d| d.role().clone()), Some(FolderRole::Drive));
    }

    #[test]
    fn test_share_scope_is_inherited() {
        let share = ShareScope::new("abcd-wxyz", "1234");
        let node = Node::from_entry(
            "/abcd-wxyz:1234/sub".to_string(),
            folder_entry(9, 0, "sub"),
            Some(share.clone()),
        );
        assert_eq!(node.share(), Some(&share));
        assert_eq!(
            node.as_folder().map(|d| d.role().clone()),
            Some(FolderRole::Share(share))
        );
    }

    #[test]
    fn test_share_root_entry_sets_scope() {
        let share = ShareScope::new("abcd-wxyz", "");
        let node = Node::from_entry(
            "/abcd-wxyz".to_string(),
            Entry::share_root(share.clone()),
            None,
        );
        assert_eq!(node.share(), Some(&share));
    }

    #[test]
    fn test_root_role() {
        let root = FolderNode::root();
        assert_eq!(root.path(), "/");
        assert_eq!(root.role(), &FolderRole::Root);
        assert!(root.share().is_none());
        assert!(root.cached_children().is_none());
    }

    #[test]
    fn test_children_order_and_duplicates() {
        let children: Children = [
            Node::from_entry("/0/b".to_string(), folder_entry(1, 0, "b"), None),
            Node::from_entry("/0/a".to_string(), file_entry(2, 0, "a", "H", 1), None),
            Node::from_entry("/0/b".to_string(), file_entry(3, 0, "b", "H2", 2), None),
        ]
        .into_iter()
        .collect();

        assert_eq!(children.len(), 2);
        assert_eq!(children.names().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(children.get("b").map(Node::id), Some(3));
        assert!(children.get("c").is_none());
    }
}
