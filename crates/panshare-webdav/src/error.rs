//! Error handling and mapping for the WebDAV server.
//!
//! Namespace errors are mapped through their [`ErrorCategory`] so that a
//! remote outage never shows up to clients as a missing resource.

use dav_server::fs::FsError;
use panshare_core::{Error as NamespaceError, ErrorCategory};
use thiserror::Error;

/// WebDAV-specific errors that can occur during filesystem operations.
#[derive(Debug, Error)]
pub enum WebDavError {
    /// Path resolution or remote listing failed.
    #[error(transparent)]
    Namespace(#[from] NamespaceError),

    /// The namespace is read-only.
    #[error("Read-only filesystem: {0}")]
    ReadOnly(String),
}

impl WebDavError {
    /// Converts this error to a dav-server FsError.
    pub fn to_fs_error(&self) -> FsError {
        match self {
            WebDavError::Namespace(e) => category_to_fs_error(e.category()),
            WebDavError::ReadOnly(_) => FsError::Forbidden,
        }
    }
}

fn category_to_fs_error(category: ErrorCategory) -> FsError {
    match category {
        ErrorCategory::NotFound => FsError::NotFound,
        ErrorCategory::Unavailable => FsError::GeneralFailure,
    }
}

/// Converts a namespace error to a dav-server FsError.
///
/// Takes ownership to work with `.map_err()`.
#[allow(clippy::needless_pass_by_value)]
pub fn namespace_error_to_fs_error(e: NamespaceError) -> FsError {
    category_to_fs_error(e.category())
}

/// Result type for WebDAV operations.
pub type WebDavResult<T> = Result<T, WebDavError>;

impl From<WebDavError> for FsError {
    fn from(e: WebDavError) -> Self {
        e.to_fs_error()
    }
}
