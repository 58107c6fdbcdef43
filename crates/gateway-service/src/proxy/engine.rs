//! Forwarding engine.
//!
//! Relays one inbound request to a tier backend and the backend's response
//! back to the client. Three seams, each testable without a live network:
//!
//! - request rewrite: [`upstream_url`] and [`upstream_headers`]
//! - response pass-through: [`relay_response`]
//! - failure classification: every transport-level `reqwest` error becomes
//!   [`ForwardError::Upstream`]; the raw error text is logged at debug
//!   level and never reaches the client
//!
//! Bodies are streamed in both directions, so payloads are never buffered
//! in the gateway and dropping the handler future (client abort) cancels
//! the in-flight backend call. The engine never retries.

use axum::body::Body;
use axum::extract::Request;
use axum::http::header::{
    HeaderMap, HeaderName, CONNECTION, CONTENT_LENGTH, HOST, PROXY_AUTHENTICATE,
    PROXY_AUTHORIZATION, TE, TRAILER, TRANSFER_ENCODING, UPGRADE,
};
use axum::response::Response;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::config::ConfigError;

/// Connect timeout for the forwarding client.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Headers that describe the client-gateway connection rather than the
/// request, and must not be relayed in either direction.
const HOP_BY_HOP: [HeaderName; 8] = [
    CONNECTION,
    HeaderName::from_static("keep-alive"),
    PROXY_AUTHENTICATE,
    PROXY_AUTHORIZATION,
    TE,
    TRAILER,
    TRANSFER_ENCODING,
    UPGRADE,
];

/// Forwarding failures.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// Transport-level failure reaching the backend: connection refused,
    /// DNS failure, timeout, premature close. Mapped to 502.
    #[error("Failed to reach the tier backend")]
    Upstream(#[source] reqwest::Error),

    /// The composed upstream request was invalid. Mapped to 500.
    #[error("Invalid upstream request: {0}")]
    Internal(String),
}

/// Forwards requests to tier backends.
///
/// Holds one shared `reqwest::Client`; the client pools connections per
/// authority internally, so a single instance serves every target under
/// concurrent first-use without locking. Each `forward` call is stateless
/// beyond that client.
#[derive(Debug, Clone)]
pub struct ForwardingEngine {
    client: reqwest::Client,
}

impl ForwardingEngine {
    /// Build the engine with the configured per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns a fatal [`ConfigError`] if the HTTP client cannot be
    /// constructed.
    pub fn new(upstream_timeout: Duration) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(upstream_timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(ForwardingEngine { client })
    }

    /// Forward `req` to `target`, relaying the backend response verbatim.
    ///
    /// Method, path, query string, headers (minus `Host` and hop-by-hop)
    /// and the body stream are preserved; scheme and authority are
    /// rewritten to the target.
    ///
    /// # Errors
    ///
    /// [`ForwardError::Upstream`] for any transport-level failure;
    /// [`ForwardError::Internal`] if the outbound request cannot be built.
    pub async fn forward(&self, target: &Url, req: Request) -> Result<Response, ForwardError> {
        let (parts, body) = req.into_parts();

        let url = upstream_url(target, parts.uri.path(), parts.uri.query());
        let headers = upstream_headers(&parts.headers);

        tracing::debug!(
            target: "gateway.proxy",
            method = %parts.method,
            path = %parts.uri.path(),
            upstream = %url,
            "Forwarding request"
        );

        let outbound = self
            .client
            .request(parts.method, url)
            .headers(headers)
            .body(reqwest::Body::wrap_stream(body.into_data_stream()))
            .build()
            .map_err(|e| ForwardError::Internal(e.to_string()))?;

        let upstream = self.client.execute(outbound).await.map_err(classify)?;

        tracing::debug!(
            target: "gateway.proxy",
            status = %upstream.status(),
            "Relaying backend response"
        );

        Ok(relay_response(upstream))
    }
}

/// Rewrite the request URL onto the target base address.
///
/// The target's scheme and authority replace the inbound ones; a path on
/// the target base is kept as a prefix. The inbound query string is
/// carried over unchanged.
#[must_use]
pub fn upstream_url(target: &Url, path: &str, query: Option<&str>) -> Url {
    let mut url = target.clone();

    let base_path = target.path().trim_end_matches('/');
    if base_path.is_empty() {
        url.set_path(path);
    } else {
        url.set_path(&format!("{base_path}{path}"));
    }
    url.set_query(query);

    url
}

/// Build the outbound header set: everything except `Host` (the client
/// sets it to match the target authority), `Content-Length` (recomputed
/// for the streamed body) and hop-by-hop headers.
#[must_use]
pub fn upstream_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(inbound.len());

    for (name, value) in inbound {
        if name == HOST || name == CONTENT_LENGTH || HOP_BY_HOP.contains(name) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }

    headers
}

/// Relay status, headers and body stream of a backend response verbatim,
/// minus hop-by-hop headers.
#[must_use]
pub fn relay_response(upstream: reqwest::Response) -> Response {
    let status = upstream.status();

    let mut headers = HeaderMap::with_capacity(upstream.headers().len());
    for (name, value) in upstream.headers() {
        if HOP_BY_HOP.contains(name) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

/// Classify a transport-level failure.
///
/// All of connect refusal, DNS failure, timeout and premature close
/// collapse into one upstream failure class; the distinction is logged
/// but not exposed.
fn classify(error: reqwest::Error) -> ForwardError {
    let kind = if error.is_timeout() {
        "timeout"
    } else if error.is_connect() {
        "connect"
    } else if error.is_body() || error.is_decode() {
        "body"
    } else {
        "request"
    };

    tracing::debug!(
        target: "gateway.proxy",
        error = %error,
        kind = kind,
        "Upstream request failed"
    );

    ForwardError::Upstream(error)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use axum::http::header::{HeaderValue, AUTHORIZATION};

    // -------------------------------------------------------------------------
    // upstream_url Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_upstream_url_rewrites_authority() {
        let target = Url::parse("http://backend-a:9001").unwrap();
        let url = upstream_url(&target, "/orders", Some("x=1"));
        assert_eq!(url.as_str(), "http://backend-a:9001/orders?x=1");
    }

    #[test]
    fn test_upstream_url_without_query() {
        let target = Url::parse("http://backend-a").unwrap();
        let url = upstream_url(&target, "/orders", None);
        assert_eq!(url.as_str(), "http://backend-a/orders");
    }

    #[test]
    fn test_upstream_url_root_path() {
        let target = Url::parse("http://backend-a").unwrap();
        let url = upstream_url(&target, "/", None);
        assert_eq!(url.as_str(), "http://backend-a/");
    }

    #[test]
    fn test_upstream_url_keeps_target_base_path_as_prefix() {
        let target = Url::parse("http://backend-a/api/v2").unwrap();
        let url = upstream_url(&target, "/orders", Some("x=1"));
        assert_eq!(url.as_str(), "http://backend-a/api/v2/orders?x=1");
    }

    #[test]
    fn test_upstream_url_target_trailing_slash() {
        let target = Url::parse("http://backend-a/api/").unwrap();
        let url = upstream_url(&target, "/orders", None);
        assert_eq!(url.as_str(), "http://backend-a/api/orders");
    }

    #[test]
    fn test_upstream_url_preserves_https_scheme() {
        let target = Url::parse("https://backend-b.internal").unwrap();
        let url = upstream_url(&target, "/orders", None);
        assert_eq!(url.scheme(), "https");
    }

    // -------------------------------------------------------------------------
    // upstream_headers Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_upstream_headers_drop_host() {
        let mut inbound = HeaderMap::new();
        inbound.insert(HOST, HeaderValue::from_static("gateway.example"));
        inbound.insert("x-request-id", HeaderValue::from_static("abc-123"));

        let outbound = upstream_headers(&inbound);

        assert!(outbound.get(HOST).is_none());
        assert_eq!(
            outbound.get("x-request-id").map(HeaderValue::as_bytes),
            Some(&b"abc-123"[..])
        );
    }

    #[test]
    fn test_upstream_headers_drop_hop_by_hop() {
        let mut inbound = HeaderMap::new();
        inbound.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        inbound.insert(TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        inbound.insert("keep-alive", HeaderValue::from_static("timeout=5"));

        let outbound = upstream_headers(&inbound);
        assert!(outbound.is_empty());
    }

    #[test]
    fn test_upstream_headers_preserve_authorization() {
        // The token is relayed to the backend along with every other
        // end-to-end header.
        let mut inbound = HeaderMap::new();
        inbound.insert(AUTHORIZATION, HeaderValue::from_static("Bearer token"));

        let outbound = upstream_headers(&inbound);
        assert!(outbound.get(AUTHORIZATION).is_some());
    }

    #[test]
    fn test_upstream_headers_preserve_repeated_headers() {
        let mut inbound = HeaderMap::new();
        inbound.append("x-forwarded-for", HeaderValue::from_static("10.0.0.1"));
        inbound.append("x-forwarded-for", HeaderValue::from_static("10.0.0.2"));

        let outbound = upstream_headers(&inbound);
        assert_eq!(outbound.get_all("x-forwarded-for").iter().count(), 2);
    }
}
