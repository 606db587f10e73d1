//! The remote operations the namespace engine consumes.
//!
//! Authentication, paging of drive and share directories, retries and
//! timeouts all live behind this trait. The engine only relies on the
//! input/output contracts below.

use crate::model::{Entry, SharePage, ShareScope};
use crate::node::FileNode;
use async_trait::async_trait;
use thiserror::Error;

/// Errors a [`RemoteGateway`] may report.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// The remote answered with a non-zero status code.
    #[error("Remote returned status {code}: {message}")]
    Status {
        /// Remote status code.
        code: i64,
        /// Remote message, if any.
        message: String,
    },

    /// Network failure or timeout.
    #[error("Remote unavailable: {0}")]
    Unavailable(String),

    /// The remote answered with a payload we could not interpret.
    #[error("Unexpected remote payload: {0}")]
    Decode(String),

    /// Login was rejected.
    #[error("Authentication failed: {0}")]
    Auth(String),
}

/// Remote storage operations.
///
/// Implementations must be safe to call concurrently. Each listing returns
/// the complete directory: paging, if any, is the implementation's concern.
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// List the entries of a drive directory (`0` is the drive root).
    async fn list_drive(&self, parent_id: u64) -> Result<Vec<Entry>, GatewayError>;

    /// List the entries of a directory inside a shared link (`0` is the share root).
    async fn list_share(
        &self,
        share: &ShareScope,
        parent_id: u64,
    ) -> Result<Vec<Entry>, GatewayError>;

    /// Fetch one page of the shares the account has created.
    ///
    /// The first page is requested with cursor `"0"`; a returned
    /// [`SharePage::next`] of `"-1"` marks the last page.
    async fn list_my_shares(&self, cursor: &str) -> Result<SharePage, GatewayError>;

    /// Produce a time-limited signed download URL for a file.
    ///
    /// The URL's query string carries the absolute expiry instant as a unix
    /// timestamp in the `t` parameter.
    async fn signed_download_url(&self, file: &FileNode) -> Result<String, GatewayError>;
}
