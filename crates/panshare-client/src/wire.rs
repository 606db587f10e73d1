//! JSON payloads of the 123pan web API.
//!
//! Every response is wrapped in `{code, message, data}`. List items use
//! PascalCase keys. Cursors (`Next`) arrive as strings but some endpoints send
//! bare numbers, so both are accepted.

use chrono::DateTime;
use panshare_core::model::{Entry, SharePage, ShareRecord, ShareScope, epoch};
use panshare_core::GatewayError;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

/// Status code of a successful call.
pub const CODE_OK: i64 = 0;

/// Alternate success code used by the login endpoint.
pub const CODE_LOGIN_OK: i64 = 200;

/// Response envelope.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Unwrap `data`, treating any code outside `ok` as a remote failure.
    pub fn into_data(self, ok: &[i64]) -> Result<T, GatewayError> {
        if !ok.contains(&self.code) {
            return Err(GatewayError::Status {
                code: self.code,
                message: self.message,
            });
        }
        self.data
            .ok_or_else(|| GatewayError::Decode(format!("code {} without data", self.code)))
    }
}

fn cursor<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Cursor {
        Text(String),
        Number(i64),
    }
    Ok(match Cursor::deserialize(deserializer)? {
        Cursor::Text(s) => s,
        Cursor::Number(n) => n.to_string(),
    })
}

/// `data` of a paged listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListPage<T> {
    #[serde(default = "Vec::new")]
    pub info_list: Vec<T>,
    #[serde(deserialize_with = "cursor")]
    pub next: String,
}

/// A file or directory item.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FileInfo {
    pub file_id: u64,
    #[serde(default)]
    pub parent_file_id: u64,
    pub file_name: String,
    /// 1 for directories, 0 for files.
    #[serde(rename = "Type")]
    pub kind: u8,
    #[serde(default)]
    pub etag: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub create_at: String,
    #[serde(default)]
    pub update_at: String,
    #[serde(default)]
    pub s3_key_flag: String,
}

/// One of the account's own shares.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ShareInfo {
    pub share_key: String,
    #[serde(default)]
    pub share_pwd: String,
    #[serde(default)]
    pub create_at: String,
    #[serde(default)]
    pub update_at: String,
    #[serde(default)]
    pub status: i64,
    #[serde(default)]
    pub expired: bool,
}

/// `data` of the login call.
#[derive(Debug, Deserialize)]
pub struct LoginData {
    pub token: String,
}

/// `data` of both download-info calls.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DownloadInfo {
    pub download_url: String,
}

/// Body of the login call.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub passport: &'a str,
    pub password: &'a str,
    pub remember: bool,
}

/// Body of the drive download-info call.
#[derive(Debug, Serialize)]
pub struct DriveDownloadRequest<'a> {
    #[serde(rename = "Etag")]
    pub etag: &'a str,
    #[serde(rename = "FileID")]
    pub file_id: u64,
    #[serde(rename = "FileName")]
    pub file_name: &'a str,
    #[serde(rename = "S3KeyFlag")]
    pub s3_key_flag: &'a str,
    #[serde(rename = "Size")]
    pub size: u64,
    #[serde(rename = "Type")]
    pub kind: u8,
    #[serde(rename = "driveId")]
    pub drive_id: u64,
}

/// Body of the share download-info call.
#[derive(Debug, Serialize)]
pub struct ShareDownloadRequest<'a> {
    #[serde(rename = "ShareKey")]
    pub share_key: &'a str,
    #[serde(rename = "SharePwd")]
    pub share_pwd: &'a str,
    #[serde(rename = "Etag")]
    pub etag: &'a str,
    #[serde(rename = "FileID")]
    pub file_id: u64,
    #[serde(rename = "S3KeyFlag")]
    pub s3_key_flag: &'a str,
    #[serde(rename = "Size")]
    pub size: u64,
}

fn timestamp(raw: &str) -> chrono::DateTime<chrono::FixedOffset> {
    DateTime::parse_from_rfc3339(raw).unwrap_or_else(|e| {
        if !raw.is_empty() {
            debug!(raw, error = %e, "unparseable timestamp, using epoch");
        }
        epoch()
    })
}

impl From<FileInfo> for Entry {
    fn from(info: FileInfo) -> Self {
        let is_folder = info.kind == 1;
        Entry {
            id: info.file_id,
            parent_id: info.parent_file_id,
            name: info.file_name,
            is_folder,
            content_hash: if is_folder { String::new() } else { info.etag },
            byte_size: if is_folder { 0 } else { info.size },
            created_at: timestamp(&info.create_at),
            updated_at: timestamp(&info.update_at),
            storage_flag: info.s3_key_flag,
            share: None,
        }
    }
}

impl From<ShareInfo> for ShareRecord {
    fn from(info: ShareInfo) -> Self {
        ShareRecord {
            scope: ShareScope::new(info.share_key, info.share_pwd),
            created_at: timestamp(&info.create_at),
            updated_at: timestamp(&info.update_at),
            status: info.status,
            expired: info.expired,
        }
    }
}

impl From<ListPage<ShareInfo>> for SharePage {
    fn from(page: ListPage<ShareInfo>) -> Self {
        SharePage {
            entries: page.info_list.into_iter().map(ShareRecord::from).collect(),
            next: page.next,
        }
    }
}
