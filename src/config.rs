//! Configuration loaded from the environment (spec.md §6.2). Missing token or
//! public URL base is a request-time [`ConfigError`], not a startup panic — the
//! original service ran as a serverless worker where config can be legitimately
//! absent on some request paths.

use crate::types::ConfigError;

const API_TOKEN: &str = "ZLS_RELEASES_API_TOKEN";
const PUBLIC_URL_BASE: &str = "ZLS_RELEASES_PUBLIC_URL_BASE";
const FORCE_MINISIGN: &str = "ZLS_RELEASES_FORCE_MINISIGN";
const DATABASE_URL: &str = "ZLS_RELEASES_DATABASE_URL";
const BLOB_ROOT: &str = "ZLS_RELEASES_BLOB_ROOT";
const LISTEN_ADDR: &str = "ZLS_RELEASES_LISTEN_ADDR";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_token: Option<String>,
    pub public_url_base: Option<String>,
    pub force_minisign: bool,
    pub database_url: String,
    pub blob_root: String,
    pub listen_addr: String,
}

impl Config {
    /// Reads every variable up front. `api_token`/`public_url_base` are allowed
    /// to be absent here; callers surface [`ConfigError::Missing`] lazily, at
    /// the request paths that actually need them (spec.md §6.2).
    pub fn from_env() -> Self {
        Self {
            api_token: non_empty(std::env::var(API_TOKEN).ok()),
            public_url_base: non_empty(std::env::var(PUBLIC_URL_BASE).ok()).map(|s| s.trim_end_matches('/').to_string()),
            force_minisign: std::env::var(FORCE_MINISIGN).map(|v| v == "1" || v.eq_ignore_ascii_case("true")).unwrap_or(false),
            database_url: std::env::var(DATABASE_URL).unwrap_or_else(|_| "sqlite://zls-releases.db".to_string()),
            blob_root: std::env::var(BLOB_ROOT).unwrap_or_else(|_| "./blobs".to_string()),
            listen_addr: std::env::var(LISTEN_ADDR).unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
        }
    }

    pub fn require_api_token(&self) -> Result<&str, ConfigError> {
        self.api_token.as_deref().ok_or(ConfigError::Missing("apiToken"))
    }

    pub fn require_public_url_base(&self) -> Result<&str, ConfigError> {
        self.public_url_base.as_deref().ok_or(ConfigError::Missing("publicUrlBase"))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_api_token_errors_when_unset() {
        let config = Config {
            api_token: None,
            public_url_base: Some("https://example.test".to_string()),
            force_minisign: false,
            database_url: String::new(),
            blob_root: String::new(),
            listen_addr: String::new(),
        };
        assert!(matches!(config.require_api_token(), Err(ConfigError::Missing("apiToken"))));
    }

    #[test]
    fn public_url_base_trims_trailing_slash() {
        std::env::set_var(PUBLIC_URL_BASE, "https://example.test/");
        let config = Config::from_env();
        assert_eq!(config.public_url_base.as_deref(), Some("https://example.test"));
        std::env::remove_var(PUBLIC_URL_BASE);
    }
}
