//! Raw remote records as produced by a [`RemoteGateway`](crate::RemoteGateway).

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use std::fmt;

/// Access scope of a shared link: its key and optional password.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ShareScope {
    /// Share code, e.g. `abcd-wxyz`.
    pub key: String,
    /// Share password; empty when the link is public.
    pub password: String,
}

impl ShareScope {
    /// Create a share scope.
    pub fn new(key: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            password: password.into(),
        }
    }

    /// The path segment naming this share: `key` or `key:password`.
    pub fn display_name(&self) -> String {
        if self.password.is_empty() {
            self.key.clone()
        } else {
            format!("{}:{}", self.key, self.password)
        }
    }
}

impl fmt::Display for ShareScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print the password into logs
        f.write_str(&self.key)
    }
}

/// A directory entry returned by a remote listing. Immutable once returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    /// Remote object id.
    pub id: u64,
    /// Remote id of the containing directory.
    pub parent_id: u64,
    /// Display name.
    pub name: String,
    /// Directory or file.
    pub is_folder: bool,
    /// Content hash (etag); empty for folders.
    pub content_hash: String,
    /// Size in bytes; 0 for folders.
    pub byte_size: u64,
    /// Creation time.
    pub created_at: DateTime<FixedOffset>,
    /// Last modification time.
    pub updated_at: DateTime<FixedOffset>,
    /// Opaque storage token the remote requires when signing downloads.
    pub storage_flag: String,
    /// Set only when the entry is itself a synthetic share root.
    pub share: Option<ShareScope>,
}

/// Timestamp carried by synthetic folders that have no remote counterpart.
pub fn epoch() -> DateTime<FixedOffset> {
    DateTime::<Utc>::UNIX_EPOCH.fixed_offset()
}

impl Entry {
    /// A synthetic, non-remote folder entry with id 0.
    pub fn synthetic_folder(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            parent_id: 0,
            name: name.into(),
            is_folder: true,
            content_hash: String::new(),
            byte_size: 0,
            created_at: epoch(),
            updated_at: epoch(),
            storage_flag: String::new(),
            share: None,
        }
    }

    /// The synthetic root entry of a shared link.
    pub fn share_root(share: ShareScope) -> Self {
        let mut entry = Self::synthetic_folder(share.display_name());
        entry.share = Some(share);
        entry
    }
}

/// One item of the account's own share list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareRecord {
    /// Share key and password.
    pub scope: ShareScope,
    /// When the share was created.
    pub created_at: DateTime<FixedOffset>,
    /// When the share was last updated.
    pub updated_at: DateTime<FixedOffset>,
    /// Remote status flag; non-zero means disabled.
    pub status: i64,
    /// Whether the share has passed its expiry date.
    pub expired: bool,
}

impl ShareRecord {
    /// Whether the share should appear under the root.
    pub fn is_active(&self) -> bool {
        self.status == 0 && !self.expired
    }

    /// The share-root entry this record is listed as.
    pub fn to_entry(&self) -> Entry {
        let mut entry = Entry::share_root(self.scope.clone());
        entry.created_at = self.created_at;
        entry.updated_at = self.updated_at;
        entry
    }
}

/// Cursor value that marks the last page of the share list.
pub const LAST_PAGE: &str = "-1";

/// One page of [`RemoteGateway::list_my_shares`](crate::RemoteGateway::list_my_shares).
#[derive(Debug, Clone, Default)]
pub struct SharePage {
    /// Shares on this page, including inactive ones.
    pub entries: Vec<ShareRecord>,
    /// Cursor for the next page, [`LAST_PAGE`] when done.
    pub next: String,
}

impl SharePage {
    /// Whether no further page follows.
    pub fn is_last(&self) -> bool {
        self.next == LAST_PAGE || self.next.is_empty()
    }
}
