//! Upstream response translation.
//!
//! # Responsibilities
//! - Copy upstream status and headers verbatim to the client response
//! - Rewrite `Location` on redirects in rewriting mode
//! - Hand the body stream through without buffering
//!
//! # Design Decisions
//! - The Location rewrite is the single permitted header mutation; any other
//!   change (Content-Length, internal hostnames) would be a defect
//! - Only path-absolute redirect targets (leading `/`, not `//`) are
//!   rewritten; absolute and protocol-relative URLs pass through unmodified
//! - Dropping the returned body (client disconnect) releases the upstream
//!   connection; no cleanup step is needed on cancellation

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderValue, Response};

use crate::routing::{ProxyMode, ProxyRoute};

/// Translate an upstream response into the client response.
pub fn translate<B>(route: &ProxyRoute, upstream: Response<B>) -> Response<Body>
where
    B: hyper::body::Body<Data = Bytes> + Send + 'static,
    B::Error: Into<axum::BoxError>,
{
    let (mut parts, body) = upstream.into_parts();

    if route.mode == ProxyMode::Rewriting && parts.status.is_redirection() {
        let rewritten = parts
            .headers
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|location| rewrite_location(&route.public_base_path, location));
        if let Some(location) = rewritten {
            if let Ok(value) = HeaderValue::from_str(&location) {
                parts.headers.insert(header::LOCATION, value);
            }
        }
    }

    Response::from_parts(parts, Body::new(body))
}

/// Re-enter the proxy route: `/finale` under `/proxy/3000` becomes
/// `/proxy/3000/finale`. Returns None when the value is not a rewrite
/// candidate.
fn rewrite_location(public_base_path: &str, location: &str) -> Option<String> {
    if location.starts_with('/') && !location.starts_with("//") {
        Some(format!("{public_base_path}{location}"))
    } else {
        None
    }
}
