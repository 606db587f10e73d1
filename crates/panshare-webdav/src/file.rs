//! WebDAV file handle.
//!
//! File bytes are never served by this process: a `GET` is answered with a
//! redirect before it reaches the DAV handler. The handle only carries
//! metadata, which is all `HEAD` and `PROPFIND` need.

use crate::metadata::NodeMetaData;
use bytes::{Buf, Bytes};
use dav_server::fs::{DavFile, DavMetaData, FsError, FsFuture};
use std::io::SeekFrom;
use tracing::debug;

/// A metadata-only handle on a remote file.
#[derive(Debug)]
pub struct RemoteFile {
    name: String,
    meta: NodeMetaData,
    position: u64,
}

impl RemoteFile {
    /// Open a handle on `name` with the given metadata.
    pub fn new(name: String, meta: NodeMetaData) -> Self {
        Self {
            name,
            meta,
            position: 0,
        }
    }
}

impl DavFile for RemoteFile {
    fn metadata(&mut self) -> FsFuture<'_, Box<dyn DavMetaData>> {
        let meta = self.meta.clone();
        Box::pin(async move { Ok(Box::new(meta) as Box<dyn DavMetaData>) })
    }

    fn read_bytes(&mut self, _count: usize) -> FsFuture<'_, Bytes> {
        debug!(name = %self.name, "content read refused, served by redirect");
        Box::pin(async { Err(FsError::NotImplemented) })
    }

    fn write_bytes(&mut self, _buf: Bytes) -> FsFuture<'_, ()> {
        Box::pin(async { Err(FsError::Forbidden) })
    }

    fn write_buf(&mut self, _buf: Box<dyn Buf + Send>) -> FsFuture<'_, ()> {
        Box::pin(async { Err(FsError::Forbidden) })
    }

    fn seek(&mut self, pos: SeekFrom) -> FsFuture<'_, u64> {
        let size = self.meta.len();
        let target = match pos {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::End(delta) => size.checked_add_signed(delta),
            SeekFrom::Current(delta) => self.position.checked_add_signed(delta),
        };
        let result = match target {
            Some(target) => {
                self.position = target;
                Ok(target)
            }
            None => Err(FsError::GeneralFailure),
        };
        Box::pin(async move { result })
    }

    fn flush(&mut self) -> FsFuture<'_, ()> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::FileMetaData;
    use std::time::SystemTime;

    fn handle() -> RemoteFile {
        RemoteFile::new(
            "a.txt".to_string(),
            NodeMetaData::File(FileMetaData {
                size: 10,
                etag: "H1".to_string(),
                created: SystemTime::UNIX_EPOCH,
                modified: SystemTime::UNIX_EPOCH,
            }),
        )
    }

    #[tokio::test]
    async fn test_metadata() {
        let mut file = handle();
        assert_eq!(file.metadata().await.expect("metadata").len(), 10);
    }

    #[tokio::test]
    async fn test_reads_and_writes_refused() {
        let mut file = handle();
        assert!(matches!(file.read_bytes(4).await, Err(FsError::NotImplemented)));
        assert!(matches!(
            file.write_bytes(Bytes::from_static(b"x")).await,
            Err(FsError::Forbidden)
        ));
    }

    #[tokio::test]
    async fn test_seek() {
        let mut file = handle();
        assert_eq!(file.seek(SeekFrom::End(-2)).await.expect("seek"), 8);
        assert_eq!(file.seek(SeekFrom::Current(1)).await.expect("seek"), 9);
        assert!(file.seek(SeekFrom::Current(-20)).await.is_err());
    }
}
