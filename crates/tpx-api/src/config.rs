//! Record service configuration.

use serde::Deserialize;

/// Top-level API server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Listen address (e.g., "0.0.0.0").
    #[serde(default = "default_host")]
    pub host: String,
    /// Listen port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// PostgreSQL connection URL. None selects the in-memory store.
    pub database_url: Option<String>,
    /// Allowed CORS origins. Empty or containing "*" allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Request body limit, which bounds file uploads.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8001
}

fn default_max_upload_bytes() -> usize {
    32 * 1024 * 1024
}

impl ApiConfig {
    /// Load config from environment variables (HOST, PORT, DATABASE_URL,
    /// CORS_ORIGINS, MAX_UPLOAD_BYTES).
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load config through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or("PORT", lookup("PORT"), defaults.port),
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            cors_origins: lookup("CORS_ORIGINS")
                .map(|v| split_origins(&v))
                .unwrap_or(defaults.cors_origins),
            max_upload_bytes: parse_or(
                "MAX_UPLOAD_BYTES",
                lookup("MAX_UPLOAD_BYTES"),
                defaults.max_upload_bytes,
            ),
        }
    }

    /// Whether any origin may call the API.
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.is_empty() || self.cors_origins.iter().any(|o| o == "*")
    }
}

fn parse_or<T: std::str::FromStr + Copy + std::fmt::Display>(
    key: &str,
    raw: Option<String>,
    default: T,
) -> T {
    match raw {
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %value, default = %default, "invalid value, using default");
            default
        }),
        None => default,
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database_url: None,
            cors_origins: vec![],
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8001);
        assert!(config.database_url.is_none());
        assert!(config.allows_any_origin());
        assert_eq!(config.max_upload_bytes, 32 * 1024 * 1024);
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = ApiConfig::from_lookup(lookup(&[]));
        assert_eq!(config.port, 8001);
        assert!(config.database_url.is_none());
    }

    #[test]
    fn reads_all_variables() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "9000"),
            ("DATABASE_URL", "postgres://tpx@localhost/tpx"),
            ("CORS_ORIGINS", "http://localhost:3000, https://dash.example.com"),
            ("MAX_UPLOAD_BYTES", "1048576"),
        ]));
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9000);
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://tpx@localhost/tpx")
        );
        assert_eq!(
            config.cors_origins,
            vec!["http://localhost:3000", "https://dash.example.com"]
        );
        assert!(!config.allows_any_origin());
        assert_eq!(config.max_upload_bytes, 1_048_576);
    }

    #[test]
    fn wildcard_origin_allows_any() {
        let config = ApiConfig::from_lookup(lookup(&[("CORS_ORIGINS", "*")]));
        assert!(config.allows_any_origin());
    }

    #[test]
    fn invalid_numbers_fall_back() {
        let config = ApiConfig::from_lookup(lookup(&[("PORT", "eighty"), ("DATABASE_URL", " ")]));
        assert_eq!(config.port, 8001);
        assert!(config.database_url.is_none());
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: ApiConfig =
            serde_json::from_str(r#"{"cors_origins":["http://localhost:3000"]}"#).unwrap();
        assert_eq!(config.port, 8001);
        assert_eq!(config.cors_origins.len(), 1);
    }
}
