//! Concurrency and signed URL lifetime tests.
//!
//! Focus areas:
//! - Concurrent first access to one folder enumerates it once
//! - All racers observe the same node instance
//! - Signed URLs are reused until their adjusted expiry, then re-signed once

mod common;

use common::{Fixture, START};
use futures::future::join_all;
use panshare_core::testing::{MOCK_URL_LIFETIME, Op};
use panshare_core::{GatewayError, Node};
use std::sync::Arc;
use std::time::Duration;

const RACERS: usize = 16;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_listing_enumerates_once() {
    let fx = Fixture::slow(Duration::from_millis(50));
    let drive = fx.ns.resolve("/0").await.expect("drive");
    let folder = Arc::clone(drive.as_folder().expect("folder"));

    let tasks = (0..RACERS).map(|_| {
        let ns = Arc::clone(&fx.ns);
        let folder = Arc::clone(&folder);
        tokio::spawn(async move { ns.list_children(&folder).await })
    });
    let results = join_all(tasks).await;

    let first = results[0].as_ref().expect("join").as_ref().expect("list");
    for result in &results {
        let children = result.as_ref().expect("join").as_ref().expect("list");
        assert!(Arc::ptr_eq(first, children));
    }
    assert_eq!(fx.gateway.calls(Op::ListDrive), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_resolution_shares_nodes() {
    let fx = Fixture::slow(Duration::from_millis(20));

    let tasks = (0..RACERS).map(|_| {
        let ns = Arc::clone(&fx.ns);
        tokio::spawn(async move { ns.resolve("/0/docs/sub/b.txt").await })
    });
    let nodes: Vec<Node> = join_all(tasks)
        .await
        .into_iter()
        .map(|r| r.expect("join").expect("resolve"))
        .collect();

    let Node::File(first) = &nodes[0] else {
        panic!("expected a file");
    };
    for node in &nodes {
        let Node::File(file) = node else {
            panic!("expected a file");
        };
        assert!(Arc::ptr_eq(first, file));
    }
    // /0, /0/docs and /0/docs/sub, each exactly once
    assert_eq!(fx.gateway.calls(Op::ListDrive), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_signing_is_coalesced() {
    let fx = Fixture::slow(Duration::from_millis(20));
    let node = fx.ns.resolve("/0/docs/a.txt").await.expect("resolve");
    let file = Arc::clone(node.as_file().expect("file"));

    let tasks = (0..RACERS).map(|_| {
        let ns = Arc::clone(&fx.ns);
        let file = Arc::clone(&file);
        tokio::spawn(async move { ns.content_url(&file).await })
    });
    let urls: Vec<String> = join_all(tasks)
        .await
        .into_iter()
        .map(|r| r.expect("join").expect("sign"))
        .collect();

    assert!(urls.iter().all(|u| u == &urls[0]));
    assert_eq!(fx.gateway.calls(Op::Sign), 1);
}

#[tokio::test]
async fn test_url_reused_until_margin_then_resigned() {
    let fx = Fixture::new();
    let node = fx.ns.resolve("/0/docs/a.txt").await.expect("resolve");
    let file = node.as_file().expect("file");

    let first = fx.ns.content_url(file).await.expect("sign");
    assert!(first.contains(&format!("t={}", START + MOCK_URL_LIFETIME)));

    // Still inside the window: expiry minus five minutes
    fx.clock.set(START + MOCK_URL_LIFETIME - 301);
    assert_eq!(fx.ns.content_url(file).await.expect("cached"), first);
    assert_eq!(fx.gateway.calls(Op::Sign), 1);

    fx.clock.set(START + MOCK_URL_LIFETIME - 300);
    let second = fx.ns.content_url(file).await.expect("resign");
    assert_ne!(second, first);
    assert_eq!(fx.gateway.calls(Op::Sign), 2);

    // The fresh URL is cached again
    assert_eq!(fx.ns.content_url(file).await.expect("cached"), second);
    assert_eq!(fx.gateway.calls(Op::Sign), 2);
}

#[tokio::test]
async fn test_url_shared_across_paths_and_scopes() {
    let fx = Fixture::new();
    // Same content hash and size reachable through the drive and a share
    fx.gateway.set_share_dir(
        &common::public_share(),
        0,
        vec![panshare_core::testing::file_entry(500, 0, "a-copy.txt", "H1", 10)],
    );

    let drive = fx.ns.resolve("/0/docs/a.txt").await.expect("drive");
    let shared = fx.ns.resolve("/abcd-wxyz/a-copy.txt").await.expect("share");

    let a = fx.ns.content_url(drive.as_file().expect("file")).await.expect("url");
    let b = fx.ns.content_url(shared.as_file().expect("file")).await.expect("url");
    assert_eq!(a, b);
    assert_eq!(fx.gateway.calls(Op::Sign), 1);
}

#[tokio::test]
async fn test_failed_sign_is_retried() {
    let fx = Fixture::new();
    let node = fx.ns.resolve("/0/readme.md").await.expect("resolve");
    let file = node.as_file().expect("file");

    fx.gateway
        .fail(Op::Sign, GatewayError::Unavailable("timeout".to_string()));
    let err = fx.ns.content_url(file).await.expect_err("sign fails");
    assert!(!err.is_not_found());

    fx.gateway.heal();
    fx.ns.content_url(file).await.expect("sign");
    assert_eq!(fx.gateway.calls(Op::Sign), 2);
}
