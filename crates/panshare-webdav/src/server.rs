//! HTTP server lifecycle management for WebDAV.
//!
//! `GET` on a file is answered here with `302 Found` pointing at a signed
//! download URL; everything else is handed to the DAV handler.

use crate::error::{WebDavError, WebDavResult};
use crate::filesystem::ShareDav;
use dav_server::body::Body;
use dav_server::davpath::DavPath;
use dav_server::{DavHandler, fakels::FakeLs};
use hyper::body::Incoming;
use hyper::header::{CONTENT_TYPE, LOCATION};
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use panshare_core::{Namespace, Node};
use std::convert::Infallible;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

/// Port the command-line server listens on by default.
pub const DEFAULT_PORT: u16 = 8123;

/// Configuration for the WebDAV server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind to (0 = auto-assign).
    pub port: u16,
    /// Bind address.
    pub bind_address: IpAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 0, // Auto-assign
            bind_address: IpAddr::V4(Ipv4Addr::LOCALHOST),
        }
    }
}

impl ServerConfig {
    /// Listen on every interface on [`DEFAULT_PORT`].
    pub fn public() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        }
    }
}

/// A running WebDAV server instance.
pub struct WebDavServer {
    /// The actual bound address.
    pub addr: SocketAddr,
    /// Shutdown signal sender.
    shutdown_tx: Option<oneshot::Sender<()>>,
    /// Server task handle.
    server_handle: Option<tokio::task::JoinHandle<()>>,
}

/// Shared per-connection state.
struct Service {
    dav: DavHandler,
    ns: Arc<Namespace>,
}

impl WebDavServer {
    /// Start a new WebDAV server.
    pub async fn start(fs: ShareDav, config: ServerConfig) -> Result<Self, std::io::Error> {
        let addr = SocketAddr::new(config.bind_address, config.port);
        let listener = TcpListener::bind(addr).await?;
        let actual_addr = listener.local_addr()?;

        info!(addr = %actual_addr, "Starting WebDAV server");

        let ns = Arc::clone(fs.namespace());
        // FakeLs: clients such as Finder and Explorer refuse to mount without LOCK
        let dav = DavHandler::builder()
            .filesystem(Box::new(fs))
            .locksystem(FakeLs::new())
            .build_handler();
        let service = Arc::new(Service { dav, ns });

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let server_handle = tokio::spawn(async move {
            tokio::select! {
                () = run_server(listener, service) => {
                    debug!("Server loop ended");
                }
                _ = shutdown_rx => {
                    info!("Received shutdown signal");
                }
            }
        });

        Ok(Self {
            addr: actual_addr,
            shutdown_tx: Some(shutdown_tx),
            server_handle: Some(server_handle),
        })
    }

    /// Get the URL for this server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the server.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.server_handle.take() {
            let _ = handle.await;
        }
        info!("WebDAV server stopped");
    }

    /// Wait until the server task ends.
    pub async fn wait(mut self) {
        if let Some(handle) = self.server_handle.take() {
            let _ = handle.await;
        }
    }

    /// Stop the server synchronously (for use in Drop).
    fn stop_sync(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.server_handle.take() {
            handle.abort();
        }
    }
}

impl Drop for WebDavServer {
    fn drop(&mut self) {
        self.stop_sync();
    }
}

/// Run the server accept loop.
async fn run_server(listener: TcpListener, service: Arc<Service>) {
    loop {
        match listener.accept().await {
            Ok((stream, peer_addr)) => {
                let service = Arc::clone(&service);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);
                    let svc = service_fn(move |req: Request<Incoming>| {
                        let service = Arc::clone(&service);
                        async move { Ok::<_, Infallible>(handle(&service, req).await) }
                    });

                    if let Err(e) = auto::Builder::new(TokioExecutor::new())
                        .serve_connection(io, svc)
                        .await
                    {
                        warn!(peer = %peer_addr, error = %e, "HTTP connection error");
                    }
                });
            }
            Err(e) => {
                error!(error = %e, "Failed to accept connection");
            }
        }
    }
}

async fn handle(service: &Service, req: Request<Incoming>) -> Response<Body> {
    if req.method() == Method::GET
        && let Ok(path) = DavPath::new(req.uri().path())
    {
        let path = ShareDav::parse_path(&path);
        match redirect_target(&service.ns, &path).await {
            Ok(Some(url)) => return redirect(&url),
            Ok(None) => {}
            Err(e) => {
                warn!(path = %path, error = %e, "signed URL unavailable");
                return bad_gateway(&e);
            }
        }
    }
    service.dav.handle(req).await
}

/// The signed URL a `GET` on `path` should be redirected to.
///
/// `None` leaves the request to the DAV handler: folders, and paths that do
/// not exist (which it answers with 404).
async fn redirect_target(ns: &Namespace, path: &str) -> WebDavResult<Option<String>> {
    match ns.resolve(path).await {
        Ok(Node::File(file)) => Ok(Some(ns.content_url(&file).await?)),
        Ok(Node::Folder(_)) => Ok(None),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn redirect(url: &str) -> Response<Body> {
    debug!(location = %url, "redirecting");
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::FOUND;
    match url.parse() {
        Ok(value) => {
            response.headers_mut().insert(LOCATION, value);
            response
        }
        Err(_) => {
            error!(location = %url, "signed URL is not a valid header value");
            status_response(StatusCode::BAD_GATEWAY, "invalid signed URL\n".to_string())
        }
    }
}

fn bad_gateway(e: &WebDavError) -> Response<Body> {
    status_response(StatusCode::BAD_GATEWAY, format!("{e}\n"))
}

fn status_response(status: StatusCode, message: String) -> Response<Body> {
    let mut response = Response::new(Body::from(message));
    *response.status_mut() = status;
    if let Ok(value) = "text/plain; charset=utf-8".parse() {
        response.headers_mut().insert(CONTENT_TYPE, value);
    }
    response
}
