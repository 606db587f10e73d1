//! Shared fixtures for namespace integration tests.

#![allow(dead_code)]

use panshare_core::testing::{ManualClock, MockGateway, file_entry, folder_entry, share_record};
use panshare_core::{Namespace, NamespaceConfig, ShareScope};
use std::sync::Arc;
use std::time::Duration;

/// Wall-clock instant the fixtures start at.
pub const START: i64 = 1_700_000_000;

/// A namespace over a mock remote with a manual clock.
pub struct Fixture {
    pub gateway: Arc<MockGateway>,
    pub clock: Arc<ManualClock>,
    pub ns: Arc<Namespace>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::from_gateway(|clock| MockGateway::with_clock(clock))
    }

    /// Every remote call sleeps for `delay` before answering.
    pub fn slow(delay: Duration) -> Self {
        Self::from_gateway(|clock| MockGateway::with_clock(clock).with_delay(delay))
    }

    fn from_gateway(make: impl FnOnce(Arc<ManualClock>) -> MockGateway) -> Self {
        let clock = Arc::new(ManualClock::new(START));
        let gateway = Arc::new(make(clock.clone()));
        populate(&gateway);
        let ns = Namespace::with_clock(gateway.clone(), NamespaceConfig::default(), clock.clone())
            .into_shared();
        Self { gateway, clock, ns }
    }
}

/// The public share in the fixture.
pub fn public_share() -> ShareScope {
    ShareScope::new("abcd-wxyz", "")
}

/// The password-protected share in the fixture.
pub fn private_share() -> ShareScope {
    ShareScope::new("efgh-ijkl", "1234")
}

/// Drive:
///
/// ```text
/// /0/docs/a.txt        (H1, 10 bytes)
/// /0/docs/sub/b.txt    (H2, 20 bytes)
/// /0/docs/sub/deep/c.txt
/// /0/readme.md
/// /0/ab/c              (a folder named like a too-short share key)
/// ```
///
/// Shares: `abcd-wxyz` (public), `efgh-ijkl:1234`, plus one expired and one
/// disabled share that must never be listed.
fn populate(gateway: &MockGateway) {
    gateway.set_drive_dir(
        0,
        vec![
            folder_entry(1, 0, "docs"),
            file_entry(2, 0, "readme.md", "R1", 5),
            folder_entry(3, 0, "ab"),
        ],
    );
    gateway.set_drive_dir(
        1,
        vec![file_entry(10, 1, "a.txt", "H1", 10), folder_entry(11, 1, "sub")],
    );
    gateway.set_drive_dir(
        11,
        vec![file_entry(20, 11, "b.txt", "H2", 20), folder_entry(21, 11, "deep")],
    );
    gateway.set_drive_dir(21, vec![file_entry(30, 21, "c.txt", "H3", 30)]);
    gateway.set_drive_dir(3, vec![file_entry(40, 3, "c", "H4", 4)]);

    let public = public_share();
    gateway.set_share_dir(&public, 0, vec![folder_entry(100, 0, "pics")]);
    gateway.set_share_dir(&public, 100, vec![file_entry(101, 100, "cat.jpg", "C1", 99)]);

    let private = private_share();
    gateway.set_share_dir(&private, 0, vec![file_entry(200, 0, "secret.txt", "S1", 7)]);

    gateway.set_share_page(
        "0",
        vec![
            share_record("abcd-wxyz", "", 0, false),
            share_record("dead-beef", "", 0, true),
        ],
        "cursor-2",
    );
    gateway.set_share_page(
        "cursor-2",
        vec![
            share_record("efgh-ijkl", "1234", 0, false),
            share_record("mnop-qrst", "", 1, false),
        ],
        "-1",
    );
}
