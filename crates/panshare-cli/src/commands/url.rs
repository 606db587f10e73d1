//! Url command - print the signed download URL of a file.
//!
//! ```bash
//! curl -L "$(panshare url /0/docs/report.pdf)" -o report.pdf
//! ```

use anyhow::{Context, Result, bail};
use clap::Args as ClapArgs;
use tracing::instrument;

use panshare_core::Namespace;

use super::normalize_path;

#[derive(ClapArgs, Clone)]
pub struct Args {
    /// Path of a file within the namespace
    pub path: String,
}

#[instrument(level = "info", name = "cmd::url", skip_all, fields(path = %args.path))]
pub async fn execute(ns: &Namespace, args: &Args) -> Result<()> {
    let path = normalize_path(&args.path);
    let node = ns
        .resolve(&path)
        .await
        .with_context(|| format!("Failed to resolve {path}"))?;

    let Some(file) = node.as_file() else {
        bail!("Not a file: {path}");
    };
    let url = ns
        .content_url(file)
        .await
        .with_context(|| format!("Failed to get a download URL for {path}"))?;

    println!("{url}");
    Ok(())
}
