//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the proxy handler
//! - Wire up middleware (request ID, tracing, optional timeout)
//! - Bind the server to a listener and serve until shutdown
//! - Tie resolver → forwarder → translator per request
//!
//! # Design Decisions
//! - One shared hyper client; per-request state is only the resolved route
//! - A catch-all route feeds every path into the resolver; prefix misses
//!   become the 404 fallback of this host
//! - No request state outlives the request; handlers need no locking

use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::http::error::ProxyError;
use crate::http::{forward, response};
use crate::observability::metrics;
use crate::routing::{self, RouteError};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub client: Client<HttpConnector, Body>,
    pub target_host: String,
    pub upstream_timeout: Option<Duration>,
}

/// HTTP server hosting the proxy routes.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let state = AppState {
            client,
            target_host: config.target.host.clone(),
            upstream_timeout: config.timeouts.upstream_secs.map(Duration::from_secs),
        };

        let router = build_router(&config, state);
        Self { router, config }
    }

    /// Run the server, accepting connections until the shutdown signal.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Build the Axum router with all middleware layers.
///
/// Public so a host application can mount the proxy behind its own route
/// table, auth, and TLS.
pub fn build_router(config: &ProxyConfig, state: AppState) -> Router {
    let mut router = Router::new()
        .route("/", any(proxy_handler))
        .route("/{*path}", any(proxy_handler))
        .with_state(state)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

    if let Some(secs) = config.timeouts.request_secs {
        router = router.layer(TimeoutLayer::new(Duration::from_secs(secs)));
    }

    router
}

/// Main proxy handler: resolve the route, forward upstream, translate back.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    match handle(&state, request).await {
        Ok(response) => response,
        Err(error) => error.into_response(),
    }
}

async fn handle(state: &AppState, request: Request<Body>) -> Result<Response, ProxyError> {
    let start_time = Instant::now();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let route = match routing::resolve(&path, &state.target_host) {
        Ok(route) => route,
        Err(err) => {
            if err == RouteError::InvalidTarget {
                tracing::warn!(
                    request_id = %request_id,
                    path = %path,
                    "invalid target port in proxy path"
                );
            }
            let error = ProxyError::from(err);
            // No route resolved, so there is no mode to label with
            metrics::record_request(method.as_str(), error.status().as_u16(), "none", start_time);
            return Err(error);
        }
    };

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        port = route.target_port,
        mode = route.mode.as_str(),
        "proxying request"
    );

    let upstream = match forward::forward(&state.client, &route, request, state.upstream_timeout).await
    {
        Ok(upstream) => upstream,
        Err(error) => {
            metrics::record_request(
                method.as_str(),
                error.status().as_u16(),
                route.mode.as_str(),
                start_time,
            );
            return Err(error);
        }
    };

    let response = response::translate(&route, upstream);
    metrics::record_request(
        method.as_str(),
        response.status().as_u16(),
        route.mode.as_str(),
        start_time,
    );
    Ok(response)
}
