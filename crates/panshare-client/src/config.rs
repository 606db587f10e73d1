//! Client configuration and credentials.

use std::fmt;
use std::time::Duration;

/// Default API origin.
pub const DEFAULT_BASE_URL: &str = "https://www.123pan.com";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of items requested per listing page.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Connection settings for [`PanClient`](crate::PanClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API origin; endpoint paths are joined onto it.
    pub base_url: String,
    /// Per-request timeout. A timed-out call reports the remote as unavailable.
    pub timeout: Duration,
    /// Items per listing page.
    pub page_size: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ClientConfig {
    /// Point the client at another origin.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// How the client authenticates.
#[derive(Clone)]
pub enum Credentials {
    /// A ready access token.
    Token(String),
    /// Account passport (phone number or email) and password, exchanged for a
    /// token on first use.
    Password {
        /// Phone number or email.
        passport: String,
        /// Account password.
        password: String,
    },
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Token(_) => f.write_str("Token(<redacted>)"),
            Credentials::Password { passport, .. } => f
                .debug_struct("Password")
                .field("passport", passport)
                .finish_non_exhaustive(),
        }
    }
}

impl Credentials {
    /// Pick credentials from command-line style inputs: a non-empty token wins,
    /// otherwise both user and password are required.
    pub fn from_parts(user: &str, password: &str, token: &str) -> Option<Self> {
        if !token.is_empty() {
            Some(Credentials::Token(token.to_string()))
        } else if !user.is_empty() && !password.is_empty() {
            Some(Credentials::Password {
                passport: user.to_string(),
                password: password.to_string(),
            })
        } else {
            None
        }
    }
}
