//! Absolute image URLs for API responses.
//!
//! Uploaded images are stored as relative paths (`/uploads/<file>`). Clients
//! always receive an absolute URL built from the scheme and host the request
//! arrived on, honoring reverse-proxy headers.

use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header, request::Parts};
use std::convert::Infallible;

use crate::models::Product;

const FORWARDED_PROTO: &str = "x-forwarded-proto";
const FORWARDED_HOST: &str = "x-forwarded-host";

/// Scheme and host the client used to reach the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOrigin {
    pub scheme: String,
    pub host: String,
}

impl RequestOrigin {
    pub fn new(scheme: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
        }
    }

    /// Scheme from `X-Forwarded-Proto`, else `http`.
    /// Host from `X-Forwarded-Host`, else `Host`, else `localhost`.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let scheme = first_value(headers, FORWARDED_PROTO).unwrap_or("http");
        let host = first_value(headers, FORWARDED_HOST)
            .or_else(|| first_value(headers, header::HOST.as_str()))
            .unwrap_or("localhost");

        Self::new(scheme.to_ascii_lowercase(), host)
    }
}

/// First comma-separated entry of a header, if non-empty.
fn first_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

impl<S> FromRequestParts<S> for RequestOrigin
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

pub fn is_absolute_url(reference: &str) -> bool {
    let lower = reference
        .get(..8)
        .unwrap_or(reference)
        .to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Absolute URL for a stored image reference.
///
/// Absolute references pass through untouched. Relative ones are joined to
/// the origin with exactly one `/`.
pub fn normalize_image_url(stored: Option<&str>, origin: &RequestOrigin) -> Option<String> {
    let reference = stored.filter(|s| !s.is_empty())?;

    if is_absolute_url(reference) {
        return Some(reference.to_string());
    }

    Some(format!(
        "{}://{}/{}",
        origin.scheme,
        origin.host.trim_end_matches('/'),
        reference.trim_start_matches('/')
    ))
}

impl Product {
    pub fn with_absolute_image_url(mut self, origin: &RequestOrigin) -> Self {
        self.image_url = normalize_image_url(self.image_url.as_deref(), origin);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_absolute_urls_unchanged_regardless_of_origin() {
        let origin = RequestOrigin::new("https", "shop.example.com");
        for url in [
            "http://cdn.example.com/a.png",
            "https://cdn.example.com/a.png",
            "HTTPS://CDN.example.com/a.png",
        ] {
            assert_eq!(normalize_image_url(Some(url), &origin).as_deref(), Some(url));
        }
    }

    #[test]
    fn test_relative_path_joined_with_single_slash() {
        let origin = RequestOrigin::new("http", "localhost:8080");
        assert_eq!(
            normalize_image_url(Some("/uploads/a.png"), &origin).as_deref(),
            Some("http://localhost:8080/uploads/a.png")
        );
        assert_eq!(
            normalize_image_url(Some("uploads/a.png"), &origin).as_deref(),
            Some("http://localhost:8080/uploads/a.png")
        );

        let trailing = RequestOrigin::new("http", "localhost:8080/");
        assert_eq!(
            normalize_image_url(Some("/uploads/a.png"), &trailing).as_deref(),
            Some("http://localhost:8080/uploads/a.png")
        );
    }

    #[test]
    fn test_missing_reference_stays_missing() {
        let origin = RequestOrigin::new("http", "localhost");
        assert_eq!(normalize_image_url(None, &origin), None);
        assert_eq!(normalize_image_url(Some(""), &origin), None);
    }

    #[test]
    fn test_origin_prefers_forwarded_headers() {
        let origin = RequestOrigin::from_headers(&headers(&[
            ("x-forwarded-proto", "HTTPS, http"),
            ("x-forwarded-host", "shop.example.com"),
            ("host", "10.0.0.5:8080"),
        ]));
        assert_eq!(origin, RequestOrigin::new("https", "shop.example.com"));
    }

    #[test]
    fn test_origin_falls_back_to_host_then_localhost() {
        let origin = RequestOrigin::from_headers(&headers(&[("host", "api.local:3000")]));
        assert_eq!(origin, RequestOrigin::new("http", "api.local:3000"));

        let origin = RequestOrigin::from_headers(&HeaderMap::new());
        assert_eq!(origin, RequestOrigin::new("http", "localhost"));
    }
}
