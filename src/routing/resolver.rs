//! Proxy route resolution.
//!
//! # Responsibilities
//! - Match the rewriting prefix (`/proxy/`) and passthrough prefix (`/absproxy/`)
//! - Extract the target port segment and the remaining path
//! - Validate the port (digits only, 1-65535)
//!
//! # Design Decisions
//! - Operates on the encoded path; the rest segment is forwarded as-is
//! - Rewriting mode strips the base path; passthrough keeps the full path
//! - Invalid port fails the route before any upstream call is made

use thiserror::Error;

/// Prefix for rewriting-mode routes.
pub const REWRITE_PREFIX: &str = "/proxy/";

/// Prefix for passthrough-mode routes.
pub const PASSTHROUGH_PREFIX: &str = "/absproxy/";

/// Proxy mode, decided once at resolution and carried through the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyMode {
    /// Base path stripped before forwarding; upstream-relative redirects
    /// rewritten back under the public base path.
    Rewriting,
    /// Full original path forwarded unmodified; redirects untouched.
    Passthrough,
}

impl ProxyMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProxyMode::Rewriting => "rewriting",
            ProxyMode::Passthrough => "passthrough",
        }
    }
}

/// Per-request route to an upstream target. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyRoute {
    pub mode: ProxyMode,
    pub target_host: String,
    pub target_port: u16,
    /// Path to request from the upstream (always starts with `/`).
    pub upstream_path: String,
    /// Public prefix (e.g. `/proxy/3000`) redirects are rewritten under.
    pub public_base_path: String,
}

/// Why a path did not resolve to a proxy route.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RouteError {
    /// Neither proxy prefix matched; the host should fall through to its
    /// other routes.
    #[error("no proxy prefix matched")]
    NotFound,

    /// The port segment is missing, non-numeric, or outside 1-65535.
    #[error("invalid target port in proxy path")]
    InvalidTarget,
}

/// Resolve a request path against both proxy route shapes.
pub fn resolve(path: &str, target_host: &str) -> Result<ProxyRoute, RouteError> {
    if let Some(after) = path.strip_prefix(REWRITE_PREFIX) {
        return parse(ProxyMode::Rewriting, REWRITE_PREFIX, after, path, target_host);
    }
    if let Some(after) = path.strip_prefix(PASSTHROUGH_PREFIX) {
        return parse(ProxyMode::Passthrough, PASSTHROUGH_PREFIX, after, path, target_host);
    }
    Err(RouteError::NotFound)
}

fn parse(
    mode: ProxyMode,
    prefix: &str,
    after_prefix: &str,
    full_path: &str,
    target_host: &str,
) -> Result<ProxyRoute, RouteError> {
    let (port_segment, rest) = match after_prefix.find('/') {
        Some(i) => (&after_prefix[..i], &after_prefix[i + 1..]),
        None => (after_prefix, ""),
    };

    let target_port = parse_port(port_segment)?;

    let upstream_path = match mode {
        ProxyMode::Rewriting => format!("/{rest}"),
        ProxyMode::Passthrough => full_path.to_string(),
    };

    Ok(ProxyRoute {
        mode,
        target_host: target_host.to_string(),
        target_port,
        upstream_path,
        public_base_path: format!("{prefix}{port_segment}"),
    })
}

fn parse_port(segment: &str) -> Result<u16, RouteError> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RouteError::InvalidTarget);
    }
    segment
        .parse::<u64>()
        .ok()
        .filter(|port| (1..=u64::from(u16::MAX)).contains(port))
        .map(|port| port as u16)
        .ok_or(RouteError::InvalidTarget)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewriting_route() {
        let route = resolve("/proxy/3000/wsup", "127.0.0.1").unwrap();
        assert_eq!(route.mode, ProxyMode::Rewriting);
        assert_eq!(route.target_port, 3000);
        assert_eq!(route.upstream_path, "/wsup");
        assert_eq!(route.public_base_path, "/proxy/3000");
        assert_eq!(route.target_host, "127.0.0.1");
    }

    #[test]
    fn test_rewriting_route_nested_path() {
        let route = resolve("/proxy/3000/a/b/c", "127.0.0.1").unwrap();
        assert_eq!(route.upstream_path, "/a/b/c");
    }

    #[test]
    fn test_rewriting_route_preserves_encoding() {
        let route = resolve("/proxy/3000/a%20b", "127.0.0.1").unwrap();
        assert_eq!(route.upstream_path, "/a%20b");
    }

    #[test]
    fn test_empty_rest_maps_to_root() {
        let route = resolve("/proxy/3000", "127.0.0.1").unwrap();
        assert_eq!(route.upstream_path, "/");

        let route = resolve("/proxy/3000/", "127.0.0.1").unwrap();
        assert_eq!(route.upstream_path, "/");
    }

    #[test]
    fn test_passthrough_keeps_full_path() {
        let route = resolve("/absproxy/3000/wsup", "127.0.0.1").unwrap();
        assert_eq!(route.mode, ProxyMode::Passthrough);
        assert_eq!(route.target_port, 3000);
        assert_eq!(route.upstream_path, "/absproxy/3000/wsup");
        assert_eq!(route.public_base_path, "/absproxy/3000");
    }

    #[test]
    fn test_unmatched_prefix_is_not_found() {
        assert_eq!(resolve("/", "127.0.0.1"), Err(RouteError::NotFound));
        assert_eq!(resolve("/healthz", "127.0.0.1"), Err(RouteError::NotFound));
        // Prefix match requires the trailing slash
        assert_eq!(resolve("/proxy", "127.0.0.1"), Err(RouteError::NotFound));
        assert_eq!(resolve("/proxying/3000", "127.0.0.1"), Err(RouteError::NotFound));
    }

    #[test]
    fn test_invalid_port_segment() {
        assert_eq!(resolve("/proxy/", "127.0.0.1"), Err(RouteError::InvalidTarget));
        assert_eq!(resolve("/proxy/abc/x", "127.0.0.1"), Err(RouteError::InvalidTarget));
        assert_eq!(resolve("/proxy/12x4/x", "127.0.0.1"), Err(RouteError::InvalidTarget));
        assert_eq!(resolve("/proxy/-1/x", "127.0.0.1"), Err(RouteError::InvalidTarget));
        assert_eq!(resolve("/absproxy/abc", "127.0.0.1"), Err(RouteError::InvalidTarget));
    }

    #[test]
    fn test_port_out_of_range() {
        assert_eq!(resolve("/proxy/0/x", "127.0.0.1"), Err(RouteError::InvalidTarget));
        assert_eq!(resolve("/proxy/65536/x", "127.0.0.1"), Err(RouteError::InvalidTarget));
        assert_eq!(
            resolve("/proxy/99999999999999999999/x", "127.0.0.1"),
            Err(RouteError::InvalidTarget)
        );
        assert_eq!(resolve("/proxy/65535/x", "127.0.0.1").unwrap().target_port, 65535);
    }
}
