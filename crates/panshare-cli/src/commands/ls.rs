//! List command - list a folder of the namespace.
//!
//! # Examples
//!
//! ```bash
//! # The drive and every active share
//! panshare ls /
//!
//! # Sizes and modification times
//! panshare ls -l /0/docs
//!
//! # Output as JSON for scripting
//! panshare ls --json /abcd-wxyz | jq '.entries[].name'
//! ```

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use clap::Args as ClapArgs;
use comfy_table::presets::NOTHING;
use comfy_table::{CellAlignment, Table};
use serde::Serialize;
use tracing::instrument;

use panshare_core::{Namespace, Node};

use super::normalize_path;

#[derive(ClapArgs, Clone)]
pub struct Args {
    /// Path within the namespace (default: root)
    #[arg(default_value = "/")]
    pub path: String,

    /// Show size and modification time
    #[arg(short, long)]
    pub long: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// JSON output format for ls command
#[derive(Serialize)]
struct LsOutput {
    path: String,
    entries: Vec<EntryInfo>,
}

#[derive(Serialize)]
struct EntryInfo {
    name: String,
    #[serde(rename = "type")]
    entry_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<u64>,
    #[serde(skip_serializing_if = "String::is_empty")]
    etag: String,
}

impl From<&Node> for EntryInfo {
    fn from(node: &Node) -> Self {
        let is_folder = node.is_folder();
        Self {
            name: node.name().to_string(),
            entry_type: if is_folder { "directory" } else { "file" },
            size: (!is_folder).then(|| node.byte_size()),
            etag: node.etag().to_string(),
        }
    }
}

#[instrument(level = "info", name = "cmd::ls", skip_all, fields(path = %args.path))]
pub async fn execute(ns: &Namespace, args: &Args) -> Result<()> {
    let path = normalize_path(&args.path);
    let node = ns
        .resolve(&path)
        .await
        .with_context(|| format!("Failed to resolve {path}"))?;

    // A file lists as itself
    let entries: Vec<Node> = match node.as_folder() {
        Some(folder) => ns
            .list_children(folder)
            .await
            .with_context(|| format!("Failed to list {path}"))?
            .iter()
            .cloned()
            .collect(),
        None => vec![node],
    };

    if args.json {
        let output = LsOutput {
            path,
            entries: entries.iter().map(EntryInfo::from).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if args.long {
        println!("{}", long_table(&entries));
    } else {
        for node in &entries {
            println!("{}", display_name(node));
        }
    }

    Ok(())
}

fn display_name(node: &Node) -> String {
    if node.is_folder() {
        format!("{}/", node.name())
    } else {
        node.name().to_string()
    }
}

fn long_table(entries: &[Node]) -> Table {
    let mut table = Table::new();
    table.load_preset(NOTHING);
    table.set_header(vec!["Size", "Modified", "Name"]);
    for node in entries {
        let size = if node.is_folder() {
            "-".to_string()
        } else {
            format_size(node.byte_size())
        };
        let modified: DateTime<Local> = node.modified().into();
        table.add_row(vec![
            size,
            modified.format("%Y-%m-%d %H:%M").to_string(),
            display_name(node),
        ]);
    }
    if let Some(column) = table.column_mut(0) {
        column.set_cell_alignment(CellAlignment::Right);
    }
    table
}

/// Human-readable byte count.
#[allow(clippy::cast_precision_loss)]
fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1536), "1.5 KiB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.0 GiB");
    }
}
