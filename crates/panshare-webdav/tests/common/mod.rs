//! Shared harness for WebDAV integration tests.

#![allow(dead_code)]

pub mod harness;

pub use harness::TestServer;
