//! Shared utilities for proxy integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;

use portgate::config::ProxyConfig;
use portgate::http::HttpServer;
use portgate::lifecycle::Shutdown;

/// Bind an ephemeral port for a target server whose routes need to know
/// their own address (passthrough mode registers literal prefixed paths).
#[allow(dead_code)]
pub async fn bind_target() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

/// Serve an axum router on an already-bound listener in the background.
#[allow(dead_code)]
pub fn serve_target(listener: TcpListener, app: Router) {
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
}

/// Bind and serve a target server, returning its address.
#[allow(dead_code)]
pub async fn spawn_target(app: Router) -> SocketAddr {
    let (listener, addr) = bind_target().await;
    serve_target(listener, app);
    addr
}

/// Start the proxy on an ephemeral port. The returned Shutdown handle stops
/// the server when triggered (or when dropped at the end of the test).
pub async fn spawn_proxy(config: ProxyConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    let server = HttpServer::new(config);

    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    // Give the server a moment to start accepting
    tokio::time::sleep(Duration::from_millis(50)).await;

    (addr, shutdown)
}

pub async fn spawn_default_proxy() -> (SocketAddr, Shutdown) {
    spawn_proxy(ProxyConfig::default()).await
}

/// Client that never follows redirects, so Location headers can be asserted.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}
