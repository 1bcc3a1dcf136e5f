use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Credentials and steps used to establish an authenticated session before
/// the worker pool starts. All secret fields are expected to arrive
/// already base64-encrypted (see `aq-crypto`) and are decrypted once, just
/// before use.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuthConfig {
    /// Fill and submit a login form, then confirm success via a URL prefix
    /// or a selector that must appear.
    CredentialForm {
        login_url: String,
        username_selector: String,
        password_selector: String,
        submit_selector: String,
        encrypted_username: String,
        encrypted_password: String,
        success_url_prefix: Option<String>,
        success_selector: Option<String>,
    },
    /// Inject a pre-obtained cookie directly.
    Cookie { name: String, encrypted_value: String, domain: String },
    /// Inject a static header (e.g. a bearer token) on every request.
    Header { name: String, encrypted_value: String },
    /// HTTP Basic auth, encoded into an `Authorization` header.
    Basic { encrypted_username: String, encrypted_password: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    pub start_url: String,
    pub max_depth: u32,
    pub max_pages: usize,
    pub max_duration: Duration,
    pub worker_count: usize,
    pub page_load_timeout: Duration,
    pub spa_dwell: Duration,
    pub headless: bool,
    pub capture_screenshots: bool,
    pub same_origin_only: bool,
    pub auth: Option<AuthConfig>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            start_url: String::new(),
            max_depth: 3,
            max_pages: 100,
            max_duration: Duration::from_secs(600),
            worker_count: 4,
            page_load_timeout: Duration::from_secs(30),
            spa_dwell: Duration::from_millis(1500),
            headless: true,
            capture_screenshots: true,
            same_origin_only: true,
            auth: None,
        }
    }
}

impl CrawlConfig {
    pub fn new(start_url: impl Into<String>) -> Self {
        Self { start_url: start_url.into(), ..Default::default() }
    }

    pub fn from_env(start_url: impl Into<String>) -> Self {
        let mut config = Self::new(start_url);
        if let Ok(v) = std::env::var("AQ_CRAWL_MAX_DEPTH") {
            if let Ok(n) = v.parse() {
                config.max_depth = n;
            }
        }
        if let Ok(v) = std::env::var("AQ_CRAWL_MAX_PAGES") {
            if let Ok(n) = v.parse() {
                config.max_pages = n;
            }
        }
        if let Ok(v) = std::env::var("AQ_CRAWL_WORKER_COUNT") {
            if let Ok(n) = v.parse() {
                config.worker_count = n;
            }
        }
        if let Ok(v) = std::env::var("AQ_CRAWL_HEADLESS") {
            config.headless = v != "false" && v != "0";
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = CrawlConfig::new("https://example.com");
        assert_eq!(config.max_depth, 3);
        assert!(config.same_origin_only);
        assert!(config.auth.is_none());
    }

    #[test]
    fn from_env_overlays_max_pages() {
        std::env::set_var("AQ_CRAWL_MAX_PAGES", "7");
        let config = CrawlConfig::from_env("https://example.com");
        assert_eq!(config.max_pages, 7);
        std::env::remove_var("AQ_CRAWL_MAX_PAGES");
    }
}
