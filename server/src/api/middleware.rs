//! HTTP middleware (CORS, 404 handler)

use axum::extract::Request;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::IntoResponse;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Allowed origins configuration
///
/// The dashboard dev server runs on `port + 1`, so both ports are allowed
/// for every base host.
#[derive(Debug, Clone)]
pub struct AllowedOrigins {
    origins: Vec<String>,
}

impl AllowedOrigins {
    /// Create allowed origins from host and port configuration
    pub fn new(host: &str, port: u16) -> Self {
        let mut origins = Vec::new();
        // No dev origin when the configured port is already the last one.
        let dev_port = port.checked_add(1);
        let is_all = matches!(host, "0.0.0.0" | "::" | "[::]");

        // When binding to all interfaces or localhost, allow both localhost
        // and 127.0.0.1; otherwise use the configured host directly.
        let base_hosts: Vec<&str> = if is_all || host == "127.0.0.1" || host == "localhost" {
            vec!["localhost", "127.0.0.1"]
        } else {
            vec![host]
        };

        for h in &base_hosts {
            origins.push(format!("http://{}:{}", h, port));
            if let Some(dev_port) = dev_port {
                origins.push(format!("http://{}:{}", h, dev_port));
            }
            origins.push(format!("http://{}", h));
        }

        Self { origins }
    }

    /// Get origins as HeaderValues for CORS
    fn as_header_values(&self) -> Vec<HeaderValue> {
        self.origins.iter().filter_map(|o| o.parse().ok()).collect()
    }
}

/// Create CORS layer
pub fn cors(allowed: &AllowedOrigins) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed.as_header_values()))
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::ORIGIN])
}

/// Handle 404 Not Found with logging
pub async fn handle_404(req: Request) -> impl IntoResponse {
    tracing::debug!("[404] {} {}", req.method(), req.uri());
    StatusCode::NOT_FOUND
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_localhost_covers_both_loopback_names() {
        let allowed = AllowedOrigins::new("127.0.0.1", 5380);
        assert!(allowed.origins.contains(&"http://localhost:5380".into()));
        assert!(allowed.origins.contains(&"http://127.0.0.1:5381".into()));
    }

    #[test]
    fn test_explicit_host_kept_as_is() {
        let allowed = AllowedOrigins::new("compteurs.example.org", 80);
        assert!(
            allowed
                .origins
                .contains(&"http://compteurs.example.org:80".into())
        );
        assert!(!allowed.origins.iter().any(|o| o.contains("localhost")));
    }

    #[test]
    fn test_max_port_skips_dev_origin() {
        let allowed = AllowedOrigins::new("127.0.0.1", u16::MAX);
        assert!(allowed.origins.contains(&"http://localhost:65535".into()));
        assert!(!allowed.origins.iter().any(|o| o.ends_with(":0")));
        assert!(!allowed.origins.iter().any(|o| o.ends_with(":65536")));
    }
}
