//! Error mapping to HTTP responses.
//!
//! # Responsibilities
//! - Model the proxy failure taxonomy
//! - Map each failure to a complete HTTP response (status + body text)
//!
//! # Design Decisions
//! - Target-produced error statuses are never mapped here; they pass through
//!   the translator verbatim. Only failures of the proxy itself are mapped.
//! - Body text always matches the canonical reason phrase, so clients can
//!   assert on both the code and the phrase.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::routing::RouteError;

/// Failures the proxy can produce on its own behalf.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ProxyError {
    /// Neither proxy prefix matched. Rendered 404 by the standalone binary;
    /// a host embedding the handler can fall through to its own routes.
    #[error("no proxy route matched")]
    RouteNotFound,

    /// The port segment of the path is malformed or out of range.
    #[error("invalid proxy target")]
    InvalidTarget,

    /// The upstream connection failed (refused, reset, or timed out) before
    /// producing a response.
    #[error("upstream unreachable")]
    UpstreamUnreachable,
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::RouteNotFound => StatusCode::NOT_FOUND,
            ProxyError::InvalidTarget => StatusCode::BAD_REQUEST,
            ProxyError::UpstreamUnreachable => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RouteError> for ProxyError {
    fn from(err: RouteError) -> Self {
        match err {
            RouteError::NotFound => ProxyError::RouteNotFound,
            RouteError::InvalidTarget => ProxyError::InvalidTarget,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, status.canonical_reason().unwrap_or("")).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ProxyError::RouteNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ProxyError::InvalidTarget.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ProxyError::UpstreamUnreachable.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_response_carries_status() {
        let response = ProxyError::UpstreamUnreachable.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_route_error_conversion() {
        assert_eq!(ProxyError::from(RouteError::NotFound), ProxyError::RouteNotFound);
        assert_eq!(
            ProxyError::from(RouteError::InvalidTarget),
            ProxyError::InvalidTarget
        );
    }
}
