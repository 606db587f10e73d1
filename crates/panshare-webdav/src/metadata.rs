//! WebDAV metadata for namespace nodes.

use dav_server::fs::{DavMetaData, FsError};
use panshare_core::Node;
use std::time::SystemTime;

/// Metadata for a node: a folder or a file.
#[derive(Debug, Clone)]
pub enum NodeMetaData {
    /// Folder metadata. Folders always report length 0.
    Folder(FolderMetaData),
    /// File metadata.
    File(FileMetaData),
}

/// Metadata for a folder.
#[derive(Debug, Clone)]
pub struct FolderMetaData {
    pub created: SystemTime,
    pub modified: SystemTime,
}

/// Metadata for a file.
#[derive(Debug, Clone)]
pub struct FileMetaData {
    /// Size in bytes as reported by the remote.
    pub size: u64,
    /// Remote content hash.
    pub etag: String,
    pub created: SystemTime,
    pub modified: SystemTime,
}

impl From<&Node> for NodeMetaData {
    fn from(node: &Node) -> Self {
        if node.is_folder() {
            NodeMetaData::Folder(FolderMetaData {
                created: node.created(),
                modified: node.modified(),
            })
        } else {
            NodeMetaData::File(FileMetaData {
                size: node.byte_size(),
                etag: node.etag().to_string(),
                created: node.created(),
                modified: node.modified(),
            })
        }
    }
}

impl DavMetaData for NodeMetaData {
    fn len(&self) -> u64 {
        match self {
            NodeMetaData::Folder(_) => 0,
            NodeMetaData::File(f) => f.size,
        }
    }

    fn modified(&self) -> Result<SystemTime, FsError> {
        Ok(match self {
            NodeMetaData::Folder(d) => d.modified,
            NodeMetaData::File(f) => f.modified,
        })
    }

    fn created(&self) -> Result<SystemTime, FsError> {
        Ok(match self {
            NodeMetaData::Folder(d) => d.created,
            NodeMetaData::File(f) => f.created,
        })
    }

    fn is_dir(&self) -> bool {
        matches!(self, NodeMetaData::Folder(_))
    }

    fn is_file(&self) -> bool {
        matches!(self, NodeMetaData::File(_))
    }

    fn etag(&self) -> Option<String> {
        match self {
            NodeMetaData::File(f) if !f.etag.is_empty() => Some(f.etag.clone()),
            // Synthetic and remote folders carry no content hash
            _ => None,
        }
    }

    fn executable(&self) -> Result<bool, FsError> {
        Ok(false)
    }
}
