//! HTTP middleware for request ids, logging and CORS

use crate::config::CorsConfig;
use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Method, Request},
    middleware::Next,
    response::Response,
};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer, ExposeHeaders};

/// Header carrying the per-request id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request ID extension
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// Request ID middleware - adds x-request-id header
pub async fn request_id_middleware(mut request: Request<Body>, next: Next) -> Response {
    let request_id = uuid::Uuid::new_v4().to_string();
    request.extensions_mut().insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Logging middleware
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();
    let start = std::time::Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        method = %method,
        uri = %uri,
        request_id = %request_id,
        status = %response.status().as_u16(),
        duration_ms = %start.elapsed().as_millis(),
        "Request completed"
    );

    response
}

/// Build the CORS layer.
///
/// A `*` origin or header list is mirrored from the request, which stays
/// valid when credentials are allowed.
pub fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    let origins = if is_wildcard(&cors.allowed_origins) {
        AllowOrigin::mirror_request()
    } else {
        AllowOrigin::list(parse_all::<HeaderValue>("origin", &cors.allowed_origins))
    };

    let methods: Vec<Method> = cors
        .allowed_methods
        .iter()
        .filter_map(|m| match Method::from_bytes(m.as_bytes()) {
            Ok(method) => Some(method),
            Err(_) => {
                tracing::warn!(method = %m, "Ignoring invalid CORS method");
                None
            }
        })
        .collect();

    let headers = if is_wildcard(&cors.allowed_headers) {
        AllowHeaders::mirror_request()
    } else {
        AllowHeaders::list(parse_all::<HeaderName>("header", &cors.allowed_headers))
    };

    let exposed = if is_wildcard(&cors.exposed_headers) && !cors.allow_credentials {
        ExposeHeaders::any()
    } else {
        let named: Vec<String> = cors
            .exposed_headers
            .iter()
            .filter(|h| h.as_str() != "*")
            .cloned()
            .collect();
        ExposeHeaders::list(parse_all::<HeaderName>("exposed header", &named))
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(headers)
        .expose_headers(exposed)
        .allow_credentials(cors.allow_credentials)
        .max_age(cors.max_age)
}

fn is_wildcard(values: &[String]) -> bool {
    values.iter().any(|v| v == "*")
}

fn parse_all<T: std::str::FromStr>(label: &str, values: &[String]) -> Vec<T> {
    values
        .iter()
        .filter_map(|v| match v.parse::<T>() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                tracing::warn!(value = %v, "Ignoring invalid CORS {}", label);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_layer_accepts_defaults() {
        // Wildcards with credentials must not panic when the layer is built
        let _layer = cors_layer(&CorsConfig::default());
    }

    #[test]
    fn test_cors_layer_explicit_lists() {
        let config = CorsConfig {
            allowed_origins: vec!["https://app.example.com".to_string()],
            allowed_headers: vec!["content-type".to_string(), "bad header".to_string()],
            exposed_headers: vec!["*".to_string()],
            allow_credentials: false,
            ..Default::default()
        };
        let _layer = cors_layer(&config);
    }

    #[test]
    fn test_parse_all_skips_invalid() {
        let parsed = parse_all::<HeaderName>(
            "header",
            &["content-type".to_string(), "not valid".to_string()],
        );
        assert_eq!(parsed.len(), 1);
    }
}
