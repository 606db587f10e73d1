//! Test server harness for WebDAV integration tests.
//!
//! Provides a `TestServer` that runs a WebDAV server over an in-memory
//! remote, along with HTTP convenience methods. The client never follows
//! redirects so tests can inspect the `Location` a `GET` produces.

use panshare_core::testing::{MockGateway, file_entry, folder_entry, share_record};
use panshare_core::{Namespace, NamespaceConfig, ShareScope};
use panshare_webdav::{ServerConfig, ShareDav, WebDavServer};
use reqwest::redirect::Policy;
use reqwest::{Client, Method, Response, StatusCode};
use std::sync::Arc;
use std::time::Duration;

/// Test server with HTTP client and automatic cleanup.
pub struct TestServer {
    /// The running WebDAV server.
    server: WebDavServer,
    /// HTTP client for making requests.
    client: Client,
    /// Base URL for the server.
    pub base_url: String,
    /// The in-memory remote behind the server.
    pub gateway: Arc<MockGateway>,
}

impl TestServer {
    /// Start a server over the standard fixture tree.
    ///
    /// ```text
    /// /0/docs/a.txt          (H1, 10 bytes)
    /// /0/文档/notes.txt       (N1, 3 bytes)
    /// /0/readme.md           (R1, 5 bytes)
    /// /abcd-wxyz/cat.jpg     (C1, 99 bytes)
    /// /efgh-ijkl:1234/secret.txt
    /// ```
    pub async fn start() -> Self {
        let gateway = Arc::new(MockGateway::new());
        populate(&gateway);

        let ns = Namespace::new(gateway.clone(), NamespaceConfig::default()).into_shared();
        let server = WebDavServer::start(ShareDav::new(ns), ServerConfig::default())
            .await
            .expect("Failed to start WebDAV server");

        let base_url = server.url();

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .redirect(Policy::none())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            server,
            client,
            base_url,
            gateway,
        }
    }

    /// Build a full URL from a path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ========== HTTP Convenience Methods ==========

    /// GET a path without following redirects.
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }

    /// HEAD a path.
    pub async fn head(&self, path: &str) -> Response {
        self.client
            .head(self.url(path))
            .send()
            .await
            .expect("HEAD request failed")
    }

    /// PUT file contents.
    pub async fn put(&self, path: &str, body: impl Into<reqwest::Body>) -> Response {
        self.client
            .put(self.url(path))
            .body(body)
            .send()
            .await
            .expect("PUT request failed")
    }

    /// DELETE a file or directory.
    pub async fn delete(&self, path: &str) -> Response {
        self.client
            .delete(self.url(path))
            .send()
            .await
            .expect("DELETE request failed")
    }

    /// MKCOL (create directory).
    pub async fn mkcol(&self, path: &str) -> Response {
        self.client
            .request(Method::from_bytes(b"MKCOL").unwrap(), self.url(path))
            .send()
            .await
            .expect("MKCOL request failed")
    }

    /// PROPFIND (list directory or get properties).
    pub async fn propfind(&self, path: &str, depth: &str) -> Response {
        self.client
            .request(Method::from_bytes(b"PROPFIND").unwrap(), self.url(path))
            .header("Depth", depth)
            .send()
            .await
            .expect("PROPFIND request failed")
    }

    /// PROPFIND and return body as string.
    pub async fn propfind_body(&self, path: &str, depth: &str) -> (StatusCode, String) {
        let resp = self.propfind(path, depth).await;
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        (status, body)
    }

    /// The `Location` header of a response, if any.
    pub fn location(resp: &Response) -> Option<String> {
        resp.headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    /// Stop the server explicitly (otherwise happens on drop).
    pub async fn stop(self) {
        self.server.stop().await;
    }
}

pub fn public_share() -> ShareScope {
    ShareScope::new("abcd-wxyz", "")
}

pub fn private_share() -> ShareScope {
    ShareScope::new("efgh-ijkl", "1234")
}

fn populate(gateway: &MockGateway) {
    gateway.set_drive_dir(
        0,
        vec![
            folder_entry(1, 0, "docs"),
            folder_entry(2, 0, "文档"),
            file_entry(3, 0, "readme.md", "R1", 5),
        ],
    );
    gateway.set_drive_dir(1, vec![file_entry(10, 1, "a.txt", "H1", 10)]);
    gateway.set_drive_dir(2, vec![file_entry(20, 2, "notes.txt", "N1", 3)]);

    gateway.set_share_dir(
        &public_share(),
        0,
        vec![file_entry(100, 0, "cat.jpg", "C1", 99)],
    );
    gateway.set_share_dir(
        &private_share(),
        0,
        vec![file_entry(200, 0, "secret.txt", "S1", 7)],
    );

    gateway.set_share_page(
        "0",
        vec![
            share_record("abcd-wxyz", "", 0, false),
            share_record("dead-beef", "", 0, true),
            share_record("efgh-ijkl", "1234", 0, false),
        ],
        "-1",
    );
}
