//! WebDAV directory entries for folder listings.

use crate::metadata::NodeMetaData;
use dav_server::fs::{DavDirEntry, DavMetaData, FsFuture};
use panshare_core::Node;

/// A child of a listed folder.
#[derive(Debug, Clone)]
pub struct NodeDirEntry {
    node: Node,
}

impl NodeDirEntry {
    /// Wrap a listed child.
    pub fn new(node: Node) -> Self {
        Self { node }
    }
}

impl DavDirEntry for NodeDirEntry {
    fn name(&self) -> Vec<u8> {
        self.node.name().as_bytes().to_vec()
    }

    fn metadata(&self) -> FsFuture<'_, Box<dyn DavMetaData>> {
        let meta = NodeMetaData::from(&self.node);
        Box::pin(async move { Ok(Box::new(meta) as Box<dyn DavMetaData>) })
    }

    fn is_dir(&self) -> FsFuture<'_, bool> {
        let is_dir = self.node.is_folder();
        Box::pin(async move { Ok(is_dir) })
    }

    fn is_file(&self) -> FsFuture<'_, bool> {
        let is_file = !self.node.is_folder();
        Box::pin(async move { Ok(is_file) })
    }

    fn is_symlink(&self) -> FsFuture<'_, bool> {
        Box::pin(async { Ok(false) })
    }
}
