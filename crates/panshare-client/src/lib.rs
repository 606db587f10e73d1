//! 123pan web API client.
//!
//! [`PanClient`] implements [`panshare_core::RemoteGateway`]: drive and share
//! directory listings (all pages), the account's share list (one page per
//! call) and signed download URLs for drive and share files.
//!
//! # Example
//!
//! ```ignore
//! use panshare_client::{ClientConfig, Credentials, PanClient};
//!
//! let client = PanClient::new(
//!     ClientConfig::default(),
//!     Credentials::Token(std::env::var("PANSHARE_TOKEN")?),
//! )?;
//! let entries = client.list_drive(0).await?;
//! ```

mod client;
mod config;
mod error;
pub mod wire;

pub use client::PanClient;
pub use config::{ClientConfig, Credentials, DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE, DEFAULT_TIMEOUT};
pub use error::ClientError;
