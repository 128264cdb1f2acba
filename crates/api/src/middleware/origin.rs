//! Public origin of the current request.
//!
//! Upload URLs are built from the protocol and host the client used, so a
//! product created through `https://shop.example` stores
//! `https://shop.example/public/uploads/...`.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, Uri, header, request::Parts},
};

use crate::error::AppError;

const FORWARDED_PROTO_HEADER: &str = "x-forwarded-proto";

/// `scheme://host[:port]` as seen by the client.
///
/// The scheme comes from `X-Forwarded-Proto` when a proxy sets it to `http` or
/// `https`, and is `http` otherwise. The host comes from the `Host` header,
/// falling back to the request URI's authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOrigin(String);

impl RequestOrigin {
    /// The origin as a string, without a trailing slash.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn from_parts(headers: &HeaderMap, uri: &Uri) -> Option<Self> {
        let scheme = headers
            .get(FORWARDED_PROTO_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|proto| matches!(*proto, "http" | "https"))
            .unwrap_or("http");

        let host = headers
            .get(header::HOST)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
            .or_else(|| uri.authority().map(ToString::to_string))
            .filter(|host| is_valid_host(host))?;

        Some(Self(format!("{scheme}://{host}")))
    }
}

/// Reject empty hosts and anything that could smuggle a path into the URL.
fn is_valid_host(host: &str) -> bool {
    !host.is_empty()
        && !host
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '/' | '\\' | '?' | '#' | '@'))
}

impl<S> FromRequestParts<S> for RequestOrigin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_parts(&parts.headers, &parts.uri)
            .ok_or_else(|| AppError::BadRequest("missing or invalid Host header".to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn origin(headers: &[(&'static str, &'static str)], uri: &str) -> Option<String> {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            map.insert(*name, HeaderValue::from_static(value));
        }
        RequestOrigin::from_parts(&map, &uri.parse().unwrap()).map(|o| o.as_str().to_string())
    }

    #[test]
    fn test_host_header_defaults_to_http() {
        assert_eq!(
            origin(&[("host", "localhost:3000")], "/products"),
            Some("http://localhost:3000".to_string())
        );
    }

    #[test]
    fn test_forwarded_proto_is_honoured() {
        assert_eq!(
            origin(
                &[("host", "shop.example"), ("x-forwarded-proto", "https, http")],
                "/products"
            ),
            Some("https://shop.example".to_string())
        );
        assert_eq!(
            origin(
                &[("host", "shop.example"), ("x-forwarded-proto", "gopher")],
                "/products"
            ),
            Some("http://shop.example".to_string())
        );
    }

    #[test]
    fn test_falls_back_to_uri_authority() {
        assert_eq!(
            origin(&[], "http://api.internal:8080/products"),
            Some("http://api.internal:8080".to_string())
        );
    }

    #[test]
    fn test_missing_or_bad_host() {
        assert_eq!(origin(&[], "/products"), None);
        assert_eq!(origin(&[("host", "evil.example/path")], "/products"), None);
    }
}
