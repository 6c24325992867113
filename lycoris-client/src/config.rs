//! Client configuration
//!
//! # 环境变量
//!
//! | 环境变量 | 默认值 | 说明 |
//! |----------|--------|------|
//! | BACKEND_URI | (unset) | 后端地址，未设置或 `none` 时无后端运行 |
//! | REQUEST_TIMEOUT_SECS | 30 | 请求超时(秒) |
//! | API_TOKEN | (unset) | Bearer token |
//! | CACHE_DIR | ./work_dir/cache | 分类缓存持久化目录 |
//! | CATALOG_TTL_SECS | 86400 | 分类缓存有效期 |
//! | CATALOG_PAGE_SIZE | 100 | 分页大小 |
//! | CATALOG_MAX_PAGES | 50 | 分页上限 |
//! | DISPLAY_LOCALE | en | 显示语言 |
//! | DEFAULT_ROUTE_DECISION | allow | 无规则路由的默认决定 (allow/deny) |

use std::path::PathBuf;
use std::time::Duration;

use crate::access::RouteDecision;
use crate::error::{ClientError, ClientResult};

/// Catalog cache tuning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSettings {
    /// Freshness window of a complete snapshot
    pub ttl: Duration,
    /// Entries requested per page; a shorter page ends the listing
    pub page_size: u32,
    /// Hard ceiling on pages fetched by one reload
    pub max_pages: u32,
    /// Preferred locale for display names
    pub locale: String,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(24 * 60 * 60),
            page_size: 100,
            max_pages: 50,
            locale: shared::models::FALLBACK_LOCALE.to_string(),
        }
    }
}

/// Console client configuration
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Backend base URL, always ending with `/`. `None` runs without a backend.
    pub backend_uri: Option<String>,

    /// Bearer token for authentication
    pub token: Option<String>,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Directory for persisted catalog snapshots
    pub cache_dir: PathBuf,

    /// Catalog cache tuning
    pub catalog: CatalogSettings,

    /// Decision for routes without a rule
    pub default_route_decision: RouteDecision,
}

impl ConsoleConfig {
    /// Create a configuration pointing at `backend_uri`
    pub fn new(backend_uri: impl Into<String>) -> Self {
        Self {
            backend_uri: Some(normalize_base(backend_uri.into())),
            ..Self::without_backend()
        }
    }

    /// Configuration for running with no backend at all
    pub fn without_backend() -> Self {
        Self {
            backend_uri: None,
            token: None,
            timeout: 30,
            cache_dir: PathBuf::from("./work_dir/cache"),
            catalog: CatalogSettings::default(),
            default_route_decision: RouteDecision::Allow,
        }
    }

    /// Load configuration from environment variables
    ///
    /// Unset variables fall back to defaults; malformed ones are errors.
    pub fn from_env() -> ClientResult<Self> {
        let mut config = Self::without_backend();

        config.backend_uri = parse_backend_uri(std::env::var("BACKEND_URI").ok().as_deref())?;
        config.token = std::env::var("API_TOKEN").ok().filter(|t| !t.is_empty());

        if let Some(timeout) = env_parse::<u64>("REQUEST_TIMEOUT_SECS")? {
            config.timeout = timeout;
        }
        if let Ok(dir) = std::env::var("CACHE_DIR") {
            config.cache_dir = PathBuf::from(dir);
        }
        if let Some(ttl) = env_parse::<u64>("CATALOG_TTL_SECS")? {
            config.catalog.ttl = Duration::from_secs(ttl);
        }
        if let Some(page_size) = env_parse::<u32>("CATALOG_PAGE_SIZE")? {
            config.catalog.page_size = page_size;
        }
        if let Some(max_pages) = env_parse::<u32>("CATALOG_MAX_PAGES")? {
            config.catalog.max_pages = max_pages;
        }
        if let Ok(locale) = std::env::var("DISPLAY_LOCALE") {
            config.catalog.locale = locale;
        }
        if let Ok(decision) = std::env::var("DEFAULT_ROUTE_DECISION") {
            config.default_route_decision = decision.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Whether a backend is configured
    pub fn has_backend(&self) -> bool {
        self.backend_uri.is_some()
    }

    /// Set the bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Set the snapshot directory
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    /// Set the catalog cache tuning
    pub fn with_catalog(mut self, catalog: CatalogSettings) -> Self {
        self.catalog = catalog;
        self
    }

    /// Set the decision for routes without a rule
    pub fn with_default_route_decision(mut self, decision: RouteDecision) -> Self {
        self.default_route_decision = decision;
        self
    }

    /// Reject settings the cache cannot work with
    pub fn validate(&self) -> ClientResult<()> {
        if self.catalog.page_size == 0 {
            return Err(ClientError::Config("catalog page size must be positive".into()));
        }
        if self.catalog.max_pages == 0 {
            return Err(ClientError::Config("catalog page ceiling must be positive".into()));
        }
        if self.timeout == 0 {
            return Err(ClientError::Config("request timeout must be positive".into()));
        }
        Ok(())
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self::without_backend()
    }
}

fn normalize_base(mut uri: String) -> String {
    if !uri.ends_with('/') {
        uri.push('/');
    }
    uri
}

/// Unset, empty or `none` means no backend
fn parse_backend_uri(raw: Option<&str>) -> ClientResult<Option<String>> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    if raw.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    let url = reqwest::Url::parse(raw)
        .map_err(|e| ClientError::Config(format!("invalid BACKEND_URI '{}': {}", raw, e)))?;
    Ok(Some(normalize_base(url.to_string())))
}

fn env_parse<T: std::str::FromStr>(key: &str) -> ClientResult<Option<T>> {
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ClientError::Config(format!("invalid {}: '{}'", key, value))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_uri_none_disables_backend() {
        assert_eq!(parse_backend_uri(None).unwrap(), None);
        assert_eq!(parse_backend_uri(Some("")).unwrap(), None);
        assert_eq!(parse_backend_uri(Some("none")).unwrap(), None);
    }

    #[test]
    fn test_backend_uri_gets_trailing_slash() {
        assert_eq!(
            parse_backend_uri(Some("https://api.example.com/v1")).unwrap(),
            Some("https://api.example.com/v1/".to_string())
        );
        assert_eq!(
            ConsoleConfig::new("http://localhost:9999").backend_uri.as_deref(),
            Some("http://localhost:9999/")
        );
    }

    #[test]
    fn test_backend_uri_rejects_garbage() {
        assert!(matches!(
            parse_backend_uri(Some("not a url")),
            Err(ClientError::Config(_))
        ));
    }

    #[test]
    fn test_defaults() {
        let config = ConsoleConfig::default();
        assert!(!config.has_backend());
        assert_eq!(config.timeout, 30);
        assert_eq!(config.catalog.ttl, Duration::from_secs(86_400));
        assert_eq!(config.catalog.page_size, 100);
        assert_eq!(config.catalog.max_pages, 50);
        assert_eq!(config.default_route_decision, RouteDecision::Allow);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_page_size_is_invalid() {
        let config = ConsoleConfig::default().with_catalog(CatalogSettings {
            page_size: 0,
            ..CatalogSettings::default()
        });
        assert!(config.validate().is_err());
    }
}
