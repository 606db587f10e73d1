//! WebDAV filesystem over the unified drive + shares namespace.
//!
//! Read-only: every operation that would modify the remote is refused with
//! `403 Forbidden`. Lookups and listings go through [`Namespace`], which
//! caches nodes and enumerations.

use crate::dir_entry::NodeDirEntry;
use crate::error::{WebDavError, namespace_error_to_fs_error};
use crate::file::RemoteFile;
use crate::metadata::NodeMetaData;
use dav_server::davpath::DavPath;
use dav_server::fs::{
    DavDirEntry, DavFile, DavFileSystem, DavMetaData, FsError, FsFuture, FsStream, OpenOptions,
    ReadDirMeta,
};
use futures::stream;
use panshare_core::{Namespace, Node};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, instrument, trace};

/// WebDAV filesystem backed by a [`Namespace`].
#[derive(Clone)]
pub struct ShareDav {
    ns: Arc<Namespace>,
}

impl ShareDav {
    /// Serve `ns` over WebDAV.
    pub fn new(ns: Arc<Namespace>) -> Self {
        Self { ns }
    }

    /// The namespace behind this filesystem.
    pub fn namespace(&self) -> &Arc<Namespace> {
        &self.ns
    }

    /// Decode a WebDAV path into a namespace path.
    ///
    /// Percent-encoding is undone so that non-ASCII names match the remote's.
    pub(crate) fn parse_path(path: &DavPath) -> String {
        let decoded = String::from_utf8_lossy(path.as_bytes());
        let normalized = decoded.trim_start_matches('/').trim_end_matches('/');
        trace!(raw_path = %decoded, normalized = %normalized, "parse_path");
        format!("/{normalized}")
    }

    async fn resolve(&self, path: &DavPath) -> Result<Node, FsError> {
        self.ns
            .resolve(&Self::parse_path(path))
            .await
            .map_err(namespace_error_to_fs_error)
    }

    fn read_only(path: &DavPath) -> FsError {
        debug!(path = %path.as_url_string(), "write refused");
        WebDavError::ReadOnly(Self::parse_path(path)).into()
    }
}

impl DavFileSystem for ShareDav {
    #[instrument(level = "debug", skip(self), fields(path = %path.as_url_string()))]
    fn open<'a>(&'a self, path: &'a DavPath, options: OpenOptions) -> FsFuture<'a, Box<dyn DavFile>> {
        Box::pin(async move {
            if options.write || options.append || options.create || options.create_new {
                return Err(Self::read_only(path));
            }
            let node = self.resolve(path).await?;
            if node.is_folder() {
                return Err(FsError::Forbidden);
            }
            let meta = NodeMetaData::from(&node);
            Ok(Box::new(RemoteFile::new(node.name().to_string(), meta)) as Box<dyn DavFile>)
        })
    }

    #[instrument(level = "debug", skip(self), fields(path = %path.as_url_string()))]
    fn read_dir<'a>(
        &'a self,
        path: &'a DavPath,
        _: ReadDirMeta,
    ) -> FsFuture<'a, FsStream<Box<dyn DavDirEntry>>> {
        Box::pin(async move {
            let node = self.resolve(path).await?;
            let Some(folder) = node.as_folder() else {
                return Err(FsError::Forbidden);
            };
            let children = self
                .ns
                .list_children(folder)
                .await
                .map_err(namespace_error_to_fs_error)?;

            let entries: Vec<Box<dyn DavDirEntry>> = children
                .iter()
                .map(|child| Box::new(NodeDirEntry::new(child.clone())) as Box<dyn DavDirEntry>)
                .collect();
            trace!(count = entries.len(), "Directory entries found");

            Ok(Box::pin(stream::iter(entries.into_iter().map(Ok))) as FsStream<_>)
        })
    }

    #[instrument(level = "debug", skip(self), fields(path = %path.as_url_string()))]
    fn metadata<'a>(&'a self, path: &'a DavPath) -> FsFuture<'a, Box<dyn DavMetaData>> {
        Box::pin(async move {
            let node = self.resolve(path).await?;
            Ok(Box::new(NodeMetaData::from(&node)) as Box<dyn DavMetaData>)
        })
    }

    fn create_dir<'a>(&'a self, path: &'a DavPath) -> FsFuture<'a, ()> {
        Box::pin(async move { Err(Self::read_only(path)) })
    }

    fn remove_dir<'a>(&'a self, path: &'a DavPath) -> FsFuture<'a, ()> {
        Box::pin(async move { Err(Self::read_only(path)) })
    }

    fn remove_file<'a>(&'a self, path: &'a DavPath) -> FsFuture<'a, ()> {
        Box::pin(async move { Err(Self::read_only(path)) })
    }

    fn rename<'a>(&'a self, from: &'a DavPath, _to: &'a DavPath) -> FsFuture<'a, ()> {
        Box::pin(async move { Err(Self::read_only(from)) })
    }

    fn copy<'a>(&'a self, _from: &'a DavPath, to: &'a DavPath) -> FsFuture<'a, ()> {
        Box::pin(async move { Err(Self::read_only(to)) })
    }

    fn have_props<'a>(&'a self, _path: &'a DavPath) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>> {
        // Dead properties are not stored
        Box::pin(async { false })
    }
}
