//! Client construction errors and transport error mapping.

use panshare_core::GatewayError;
use thiserror::Error;

/// Errors raised while building a [`PanClient`](crate::PanClient).
#[derive(Debug, Error)]
pub enum ClientError {
    /// The configured origin is not a valid absolute URL.
    #[error("Invalid base URL {url}: {source}")]
    BaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Classify a transport-level failure.
///
/// Timeouts and connection problems mean the remote is unavailable; a body
/// that fails to decode is reported as such.
pub(crate) fn transport(e: &reqwest::Error) -> GatewayError {
    if e.is_decode() {
        GatewayError::Decode(e.to_string())
    } else if e.is_timeout() {
        GatewayError::Unavailable(format!("request timed out: {e}"))
    } else {
        GatewayError::Unavailable(e.to_string())
    }
}

/// Map a non-success HTTP status to a gateway error.
pub(crate) fn http_status(status: reqwest::StatusCode) -> GatewayError {
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        GatewayError::Auth(format!("HTTP {status}"))
    } else if status.is_server_error() {
        GatewayError::Unavailable(format!("HTTP {status}"))
    } else {
        GatewayError::Status {
            code: i64::from(status.as_u16()),
            message: status.canonical_reason().unwrap_or_default().to_string(),
        }
    }
}
