//! Error taxonomy for namespace operations.
//!
//! Only two outcomes reach callers: the path does not designate anything, or
//! the remote side failed. A malformed share token is deliberately folded into
//! [`Error::NotFound`]; a remote failure is never downgraded to "not found",
//! since that would mask outages as missing files.

use crate::gateway::GatewayError;
use std::sync::Arc;
use thiserror::Error;

/// Errors returned by [`Namespace`](crate::Namespace) operations.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The path does not resolve to any node.
    #[error("Path not found: {0}")]
    NotFound(String),

    /// A remote listing or signing call failed.
    #[error(transparent)]
    Remote(#[from] GatewayError),
}

/// Coarse classification used by protocol adapters to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Surface as "does not exist".
    NotFound,
    /// Surface as a server-side failure.
    Unavailable,
}

impl Error {
    /// Returns true if this is a "does not exist" outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Classify this error for protocol mapping.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::NotFound(_) => ErrorCategory::NotFound,
            Error::Remote(_) => ErrorCategory::Unavailable,
        }
    }

    pub(crate) fn not_found(path: impl Into<String>) -> Self {
        Error::NotFound(path.into())
    }
}

// moka hands back initializer errors behind an Arc
impl From<Arc<GatewayError>> for Error {
    fn from(e: Arc<GatewayError>) -> Self {
        Error::Remote(GatewayError::clone(&e))
    }
}

/// Result type for namespace operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert_eq!(
            Error::NotFound("/0/missing".to_string()).category(),
            ErrorCategory::NotFound
        );
        assert_eq!(
            Error::from(GatewayError::Unavailable("timeout".to_string())).category(),
            ErrorCategory::Unavailable
        );
    }

    #[test]
    fn test_remote_error_is_not_not_found() {
        let e = Error::from(GatewayError::Status {
            code: 5066,
            message: "file does not exist".to_string(),
        });
        assert!(!e.is_not_found());
        assert!(e.to_string().contains("5066"));
    }

    #[test]
    fn test_arc_conversion_keeps_variant() {
        let shared = Arc::new(GatewayError::Unavailable("reset".to_string()));
        let e = Error::from(shared);
        assert!(matches!(e, Error::Remote(GatewayError::Unavailable(ref m)) if m == "reset"));
    }
}
