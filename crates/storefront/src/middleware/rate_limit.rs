//! Rate limiting for credential endpoints using governor and `tower_governor`.
//!
//! Only the login and signup form posts are limited. Page views are not.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

/// Client IP used as the rate-limit key.
///
/// Keys on the socket address. `X-Forwarded-For` and `X-Real-IP` are
/// consulted only when a trusted proxy sits in front of the server;
/// otherwise any client could pick its own bucket.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClientIpKeyExtractor {
    trust_proxy_headers: bool,
}

impl ClientIpKeyExtractor {
    /// Extractor that ignores proxy headers.
    #[must_use]
    pub const fn direct() -> Self {
        Self {
            trust_proxy_headers: false,
        }
    }

    /// Extractor that prefers proxy headers over the socket address.
    #[must_use]
    pub const fn behind_proxy() -> Self {
        Self {
            trust_proxy_headers: true,
        }
    }
}

fn header_ip<T>(req: &Request<T>, name: &str) -> Option<IpAddr> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
}

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let socket = || {
            req.extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip())
        };
        if !self.trust_proxy_headers {
            return socket().ok_or(GovernorError::UnableToExtractKey);
        }
        // X-Forwarded-For carries a chain; the first entry is the client.
        header_ip(req, "x-forwarded-for")
            .or_else(|| header_ip(req, "x-real-ip"))
            .or_else(socket)
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create rate limiter for login and signup: ~10 requests per minute per IP.
///
/// Configuration: 1 request every 6 seconds (replenish), burst of 5. Proxy
/// headers name the client only when `trust_proxy_headers` is set.
///
/// # Panics
///
/// This function will not panic. `per_second(6)` and `burst_size(5)` are
/// both non-zero, which is all `GovernorConfigBuilder` requires.
#[must_use]
pub fn auth_rate_limiter(trust_proxy_headers: bool) -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor { trust_proxy_headers })
        .per_second(6)
        .burst_size(5)
        .finish()
        .expect("rate limiter config with per_second(6) and burst_size(5) is valid");
    GovernorLayer::new(Arc::new(config))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use tower_governor::key_extractor::KeyExtractor;

    use super::*;

    fn from_socket(forwarded_for: Option<&str>) -> Request<()> {
        let mut builder = Request::builder();
        if let Some(value) = forwarded_for {
            builder = builder.header("x-forwarded-for", value);
        }
        let mut req = builder.body(()).unwrap();
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 0, 2, 1], 4000))));
        req
    }

    #[test]
    fn test_direct_ignores_forwarded_headers() {
        let keys: HashSet<IpAddr> = (1..=6)
            .map(|n| {
                let req = from_socket(Some(&format!("203.0.113.{n}")));
                ClientIpKeyExtractor::direct().extract(&req).unwrap()
            })
            .collect();
        assert_eq!(keys.len(), 1, "one socket must share one bucket");
        assert!(keys.contains(&IpAddr::from([192, 0, 2, 1])));
    }

    #[test]
    fn test_direct_ignores_real_ip_header() {
        let mut req = from_socket(None);
        req.headers_mut()
            .insert("x-real-ip", "198.51.100.7".parse().unwrap());
        let ip = ClientIpKeyExtractor::direct().extract(&req).unwrap();
        assert_eq!(ip.to_string(), "192.0.2.1");
    }

    #[test]
    fn test_behind_proxy_uses_first_hop() {
        let req = from_socket(Some("203.0.113.9, 10.0.0.1"));
        let ip = ClientIpKeyExtractor::behind_proxy().extract(&req).unwrap();
        assert_eq!(ip.to_string(), "203.0.113.9");
    }

    #[test]
    fn test_behind_proxy_falls_back_to_socket_address() {
        let req = from_socket(None);
        let ip = ClientIpKeyExtractor::behind_proxy().extract(&req).unwrap();
        assert_eq!(ip.to_string(), "192.0.2.1");
    }

    #[test]
    fn test_no_source_is_an_error() {
        let req = Request::builder()
            .header("x-forwarded-for", "203.0.113.9")
            .body(())
            .unwrap();
        assert!(ClientIpKeyExtractor::direct().extract(&req).is_err());
        let req = Request::builder().body(()).unwrap();
        assert!(ClientIpKeyExtractor::behind_proxy().extract(&req).is_err());
    }
}
