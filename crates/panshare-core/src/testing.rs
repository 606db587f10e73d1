//! Test doubles: an in-memory [`RemoteGateway`] that counts its calls, and a
//! manually driven [`Clock`].

use crate::cache::Clock;
use crate::gateway::{GatewayError, RemoteGateway};
use crate::model::{Entry, LAST_PAGE, SharePage, ShareRecord, ShareScope, epoch};
use crate::node::FileNode;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::time::Duration;

/// Lifetime of URLs produced by [`MockGateway`], in seconds.
pub const MOCK_URL_LIFETIME: i64 = 3_600;

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    /// Create a clock reading `now`.
    pub fn new(now: i64) -> Self {
        Self {
            now: AtomicI64::new(now),
        }
    }

    /// Jump to `now`.
    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Move forward by `secs`.
    pub fn advance(&self, secs: i64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn unix_now(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

fn timestamp(rfc3339: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(rfc3339).unwrap_or_else(|_| epoch())
}

/// A folder entry.
pub fn folder_entry(id: u64, parent_id: u64, name: &str) -> Entry {
    Entry {
        id,
        parent_id,
        name: name.to_string(),
        is_folder: true,
        content_hash: String::new(),
        byte_size: 0,
        created_at: timestamp("2024-03-01T10:00:00+08:00"),
        updated_at: timestamp("2024-03-02T10:00:00+08:00"),
        storage_flag: String::new(),
        share: None,
    }
}

/// A file entry.
pub fn file_entry(id: u64, parent_id: u64, name: &str, hash: &str, size: u64) -> Entry {
    Entry {
        id,
        parent_id,
        name: name.to_string(),
        is_folder: false,
        content_hash: hash.to_string(),
        byte_size: size,
        created_at: timestamp("2024-03-01T10:00:00+08:00"),
        updated_at: timestamp("2024-03-02T10:00:00+08:00"),
        storage_flag: format!("flag-{id}"),
        share: None,
    }
}

/// An item of the account's share list.
pub fn share_record(key: &str, password: &str, status: i64, expired: bool) -> ShareRecord {
    ShareRecord {
        scope: ShareScope::new(key, password),
        created_at: timestamp("2024-05-01T12:00:00+08:00"),
        updated_at: timestamp("2024-05-02T12:00:00+08:00"),
        status,
        expired,
    }
}

/// Remote operation kinds, for call counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// `list_drive`
    ListDrive,
    /// `list_share`
    ListShare,
    /// `list_my_shares`
    ListMyShares,
    /// `signed_download_url`
    Sign,
}

#[derive(Debug, Default)]
struct State {
    drive: HashMap<u64, Vec<Entry>>,
    shares: HashMap<(ShareScope, u64), Vec<Entry>>,
    share_pages: HashMap<String, SharePage>,
    failures: HashMap<Op, GatewayError>,
    /// Fail `ListMyShares` once this many pages have been served.
    fail_share_page_after: Option<usize>,
}

/// In-memory remote that records how often each operation is called.
#[derive(Debug)]
pub struct MockGateway {
    state: Mutex<State>,
    calls: Mutex<HashMap<Op, usize>>,
    signed: AtomicUsize,
    clock: std::sync::Arc<dyn Clock>,
    delay: Option<Duration>,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGateway {
    /// An empty remote whose URLs expire relative to the system clock.
    pub fn new() -> Self {
        Self::with_clock(std::sync::Arc::new(crate::cache::SystemClock))
    }

    /// An empty remote whose URLs expire relative to `clock`.
    pub fn with_clock(clock: std::sync::Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(State::default()),
            calls: Mutex::new(HashMap::new()),
            signed: AtomicUsize::new(0),
            clock,
            delay: None,
        }
    }

    /// Delay every call, to widen race windows.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Set the contents of a drive directory.
    pub fn set_drive_dir(&self, parent_id: u64, entries: Vec<Entry>) {
        self.state().drive.insert(parent_id, entries);
    }

    /// Set the contents of a directory inside a share.
    pub fn set_share_dir(&self, share: &ShareScope, parent_id: u64, entries: Vec<Entry>) {
        self.state()
            .shares
            .insert((share.clone(), parent_id), entries);
    }

    /// Serve `records` for `cursor`, pointing at `next` (use `"-1"` for the last page).
    pub fn set_share_page(&self, cursor: &str, records: Vec<ShareRecord>, next: &str) {
        self.state().share_pages.insert(
            cursor.to_string(),
            SharePage {
                entries: records,
                next: next.to_string(),
            },
        );
    }

    /// Make every subsequent call of `op` fail with `error`.
    pub fn fail(&self, op: Op, error: GatewayError) {
        self.state().failures.insert(op, error);
    }

    /// Make `ListMyShares` fail after `pages` pages have been served.
    pub fn fail_share_list_after(&self, pages: usize) {
        self.state().fail_share_page_after = Some(pages);
    }

    /// Stop injecting failures.
    pub fn heal(&self) {
        let mut state = self.state();
        state.failures.clear();
        state.fail_share_page_after = None;
    }

    /// How many times `op` has been called.
    pub fn calls(&self, op: Op) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(&op)
            .copied()
            .unwrap_or(0)
    }

    /// Total remote calls of any kind.
    pub fn total_calls(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .values()
            .sum()
    }

    async fn enter(&self, op: Op) -> Result<usize, GatewayError> {
        let count = {
            let mut calls = self
                .calls
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            let count = calls.entry(op).or_insert(0);
            *count += 1;
            *count
        };
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.state().failures.get(&op) {
            Some(e) => Err(e.clone()),
            None => Ok(count),
        }
    }
}

#[async_trait]
impl RemoteGateway for MockGateway {
    async fn list_drive(&self, parent_id: u64) -> Result<Vec<Entry>, GatewayError> {
        self.enter(Op::ListDrive).await?;
        Ok(self.state().drive.get(&parent_id).cloned().unwrap_or_default())
    }

    async fn list_share(
        &self,
        share: &ShareScope,
        parent_id: u64,
    ) -> Result<Vec<Entry>, GatewayError> {
        self.enter(Op::ListShare).await?;
        Ok(self
            .state()
            .shares
            .get(&(share.clone(), parent_id))
            .cloned()
            .unwrap_or_default())
    }

    async fn list_my_shares(&self, cursor: &str) -> Result<SharePage, GatewayError> {
        let served = self.enter(Op::ListMyShares).await?;
        let state = self.state();
        if state.fail_share_page_after.is_some_and(|limit| served > limit) {
            return Err(GatewayError::Unavailable("connection reset".to_string()));
        }
        Ok(state
            .share_pages
            .get(cursor)
            .cloned()
            .unwrap_or_else(|| SharePage {
                entries: Vec::new(),
                next: LAST_PAGE.to_string(),
            }))
    }

    async fn signed_download_url(&self, file: &FileNode) -> Result<String, GatewayError> {
        self.enter(Op::Sign).await?;
        let n = self.signed.fetch_add(1, Ordering::SeqCst);
        let expires = self.clock.unix_now() + MOCK_URL_LIFETIME;
        Ok(format!(
            "https://download.example.com/{}?t={expires}&n={n}",
            file.entry().content_hash
        ))
    }
}
