//! Gateway configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;
use urticaria_storage::StorageConfig;

/// Gateway server configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Object storage settings
    pub storage: StorageConfig,
    /// Use in-memory storage (for testing/development)
    pub use_memory_store: bool,
    /// Maximum request body size (bytes)
    pub max_body_size: usize,
    /// CORS settings
    pub cors: CorsConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            storage: StorageConfig::default(),
            use_memory_store: false,
            max_body_size: 100 * 1024 * 1024, // 100 MB
            cors: CorsConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Get the bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Cross-origin settings applied to every route
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins, `*` mirrors the request origin
    pub allowed_origins: Vec<String>,
    /// Allowed methods
    pub allowed_methods: Vec<String>,
    /// Allowed request headers, `*` mirrors the requested headers
    pub allowed_headers: Vec<String>,
    /// Response headers visible to scripts
    pub exposed_headers: Vec<String>,
    /// Allow cookies / authorization headers
    pub allow_credentials: bool,
    /// Preflight cache lifetime
    pub max_age: Duration,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            allowed_methods: split_list("GET,POST,PUT,DELETE,OPTIONS"),
            allowed_headers: vec!["*".to_string()],
            exposed_headers: split_list(
                "Access-Control-Allow-Origin,Access-Control-Allow-Methods,Access-Control-Allow-Headers",
            ),
            allow_credentials: true,
            max_age: Duration::from_secs(3600),
        }
    }
}

/// Split a comma separated setting, dropping blanks
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("GET, POST,,PUT "), vec!["GET", "POST", "PUT"]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.storage.record_bucket, "medical-record");
        assert_eq!(config.cors.max_age, Duration::from_secs(3600));
        assert!(config.cors.allow_credentials);
        assert_eq!(config.cors.allowed_methods.len(), 5);
    }
}
