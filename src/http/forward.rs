//! Upstream request forwarding.
//!
//! # Responsibilities
//! - Build the upstream URI from the resolved route, preserving the query
//! - Copy client headers minus hop-by-hop headers
//! - Stream the request body through without buffering
//! - Convert transport failures into `ProxyError::UpstreamUnreachable`
//!
//! # Design Decisions
//! - Exactly one upstream attempt per inbound request; no retries, so the
//!   body never needs to be buffered for replay
//! - No content inspection: payload validity is the target's concern
//! - Timeout is opt-in per deployment; expiry counts as unreachable

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, HeaderMap, Request, Response, Uri};
use hyper::body::Incoming;
use hyper_util::client::legacy::{connect::HttpConnector, Client};

use crate::http::error::ProxyError;
use crate::routing::ProxyRoute;

/// Hop-by-hop headers per RFC 7230 section 6.1. Lowercase; HeaderMap keys
/// match case-insensitively.
const HOP_BY_HOP_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Issue the upstream request for a resolved route.
///
/// The inbound request's method, filtered headers, and body stream move into
/// the upstream request. The returned response still owns the upstream
/// connection; dropping it releases the connection.
pub async fn forward(
    client: &Client<HttpConnector, Body>,
    route: &ProxyRoute,
    request: Request<Body>,
    timeout: Option<Duration>,
) -> Result<Response<Incoming>, ProxyError> {
    let (mut parts, body) = request.into_parts();
    strip_hop_by_hop_headers(&mut parts.headers);

    let uri = upstream_uri(route, &parts.uri)?;

    let mut upstream_request = Request::new(body);
    *upstream_request.method_mut() = parts.method;
    *upstream_request.uri_mut() = uri;
    *upstream_request.headers_mut() = parts.headers;

    let pending = client.request(upstream_request);
    let result = match timeout {
        Some(limit) => match tokio::time::timeout(limit, pending).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!(
                    port = route.target_port,
                    timeout_secs = limit.as_secs(),
                    "upstream request timed out"
                );
                return Err(ProxyError::UpstreamUnreachable);
            }
        },
        None => pending.await,
    };

    result.map_err(|error| {
        tracing::error!(
            port = route.target_port,
            error = %error,
            "upstream request failed"
        );
        ProxyError::UpstreamUnreachable
    })
}

/// Compose `http://<host>:<port><upstream_path>[?query]`.
fn upstream_uri(route: &ProxyRoute, original: &Uri) -> Result<Uri, ProxyError> {
    let path_and_query = match original.query() {
        Some(query) => format!("{}?{}", route.upstream_path, query),
        None => route.upstream_path.clone(),
    };

    Uri::builder()
        .scheme("http")
        .authority(format!("{}:{}", route.target_host, route.target_port))
        .path_and_query(path_and_query)
        .build()
        .map_err(|_| ProxyError::InvalidTarget)
}

/// Remove hop-by-hop headers: the fixed denylist plus any header named in
/// the `Connection` header's token list.
fn strip_hop_by_hop_headers(headers: &mut HeaderMap) {
    if let Some(tokens) = headers
        .get(header::CONNECTION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
    {
        for token in tokens.split(',') {
            let name = token.trim().to_ascii_lowercase();
            if !name.is_empty() {
                headers.remove(&name);
            }
        }
    }

    for name in HOP_BY_HOP_HEADERS {
        headers.remove(*name);
    }
}
