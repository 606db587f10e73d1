//! Serve command - expose the namespace over WebDAV.
//!
//! # Examples
//!
//! ```bash
//! # All interfaces, port 8123
//! panshare serve
//!
//! # Loopback only
//! panshare serve --host 127.0.0.1 --port 9000
//! ```

use std::net::IpAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tokio::sync::Notify;
use tracing::instrument;

use panshare_core::Namespace;
use panshare_webdav::{DEFAULT_PORT, ServerConfig, ShareDav, WebDavServer};

#[derive(ClapArgs, Clone)]
pub struct Args {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,
}

#[instrument(level = "info", name = "cmd::serve", skip_all, fields(host = %args.host, port = args.port))]
pub async fn execute(ns: Arc<Namespace>, args: &Args, quiet: bool) -> Result<()> {
    let config = ServerConfig {
        port: args.port,
        bind_address: args.host,
    };
    let server = WebDavServer::start(ShareDav::new(ns), config)
        .await
        .with_context(|| format!("Failed to listen on {}:{}", args.host, args.port))?;

    if !quiet {
        eprintln!("WebDAV server running at {}", server.url());
        eprintln!("  /0                 your drive");
        eprintln!("  /<key>             a public share");
        eprintln!("  /<key>:<password>  a password-protected share");
        eprintln!("Press Ctrl+C to stop");
    }

    let shutdown = Arc::new(Notify::new());
    let notify = Arc::clone(&shutdown);
    ctrlc::set_handler(move || notify.notify_one()).context("Failed to set signal handler")?;
    shutdown.notified().await;

    if !quiet {
        eprintln!("Stopping...");
    }
    server.stop().await;
    Ok(())
}
