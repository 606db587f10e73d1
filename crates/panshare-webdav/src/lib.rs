//! Read-only WebDAV server over the panshare namespace.
//!
//! Exposes the drive and every configured share as one WebDAV tree. Listings
//! and properties are served from the [`Namespace`](panshare_core::Namespace)
//! caches; file content is never proxied.
//!
//! # Architecture
//!
//! - [`ShareDav`] implements `dav_server::fs::DavFileSystem`
//! - [`WebDavServer`] wraps `dav_server::DavHandler` in a hyper server
//! - `GET` on a file short-circuits the handler with `302 Found` to a signed URL
//! - every method that would modify the remote answers `403 Forbidden`
//!
//! # Example
//!
//! ```ignore
//! use panshare_webdav::{ShareDav, ServerConfig, WebDavServer};
//!
//! let fs = ShareDav::new(namespace);
//! let server = WebDavServer::start(fs, ServerConfig::public()).await?;
//! println!("WebDAV server running at {}", server.url());
//! ```

mod dir_entry;
mod error;
mod file;
mod filesystem;
mod metadata;
mod server;

pub use error::{WebDavError, WebDavResult, namespace_error_to_fs_error};
pub use filesystem::ShareDav;
pub use server::{DEFAULT_PORT, ServerConfig, WebDavServer};
