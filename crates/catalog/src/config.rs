use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::CatalogError;

/// Default control-plane endpoint.
pub const DEFAULT_API_URL: &str = "https://api.pinecone.io";
/// API version header value sent with every request.
pub const DEFAULT_API_VERSION: &str = "2025-04";

/// Environment variable overriding [`CatalogConfig::api_url`].
pub const ENV_API_URL: &str = "INDEXCFG_API_URL";
/// Environment variable supplying [`CatalogConfig::api_key`].
pub const ENV_API_KEY: &str = "INDEXCFG_API_KEY";
/// Environment variable overriding [`CatalogConfig::cache_dir`].
pub const ENV_CACHE_DIR: &str = "INDEXCFG_CACHE_DIR";

/// Runtime configuration for listing embedding models.
///
/// # Example
/// ```no_run
/// use catalog::{CatalogConfig, HttpModelCatalog};
///
/// let cfg = CatalogConfig {
///     api_key: Some("pcsk_xxx".into()),
///     timeout_secs: 10,
///     ..Default::default()
/// };
/// cfg.validate().unwrap();
///
/// let _catalog = HttpModelCatalog::new(&cfg).unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CatalogConfig {
    /// Base URL of the control plane; `/models` is appended.
    pub api_url: String,
    /// Value of the `Api-Key` header. Requests go out unauthenticated when absent.
    pub api_key: Option<String>,
    /// Value of the `X-Pinecone-API-Version` header.
    pub api_version: String,
    /// Overall request timeout in seconds.
    pub timeout_secs: u64,
    /// Directory holding the model-list cache file.
    pub cache_dir: PathBuf,
    /// Lifetime of a cached model list in seconds.
    pub cache_ttl_secs: u64,
    /// Serve the model list from cache when a fresh entry exists.
    pub use_cache: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            api_key: None,
            api_version: DEFAULT_API_VERSION.into(),
            timeout_secs: 30,
            cache_dir: default_cache_dir(),
            cache_ttl_secs: 24 * 60 * 60,
            use_cache: true,
        }
    }
}

impl CatalogConfig {
    /// Defaults overlaid with `INDEXCFG_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Applies `INDEXCFG_API_URL`, `INDEXCFG_API_KEY` and `INDEXCFG_CACHE_DIR`
    /// when they are set and non-empty.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(url) = non_empty_env(ENV_API_URL) {
            self.api_url = url;
        }
        if let Some(key) = non_empty_env(ENV_API_KEY) {
            self.api_key = Some(key);
        }
        if let Some(dir) = non_empty_env(ENV_CACHE_DIR) {
            self.cache_dir = PathBuf::from(dir);
        }
        self
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.api_url.trim().is_empty() {
            return Err(CatalogError::InvalidConfig("api_url is empty".into()));
        }
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(CatalogError::InvalidConfig(format!(
                "api_url must be http(s): {}",
                self.api_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(CatalogError::InvalidConfig(
                "timeout_secs must be >= 1".into(),
            ));
        }
        if self.cache_ttl_secs == 0 {
            return Err(CatalogError::InvalidConfig(
                "cache_ttl_secs must be >= 1".into(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// `{api_url}/models`, tolerating a trailing slash on the base URL.
    pub fn models_url(&self) -> String {
        format!("{}/models", self.api_url.trim_end_matches('/'))
    }
}

fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("indexcfg")
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let cfg = CatalogConfig::default();
        assert_eq!(cfg.api_url, DEFAULT_API_URL);
        assert!(cfg.api_key.is_none());
        assert_eq!(cfg.timeout_secs, 30);
        assert_eq!(cfg.cache_ttl(), Duration::from_secs(86_400));
        assert!(cfg.use_cache);
        assert!(cfg.cache_dir.ends_with("indexcfg"));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn config_validate_rejects_bad_values() {
        let empty_url = CatalogConfig {
            api_url: "  ".into(),
            ..Default::default()
        };
        assert!(matches!(
            empty_url.validate(),
            Err(CatalogError::InvalidConfig(_))
        ));

        let ftp = CatalogConfig {
            api_url: "ftp://example.com".into(),
            ..Default::default()
        };
        assert!(ftp.validate().is_err());

        let zero_timeout = CatalogConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(zero_timeout.validate().is_err());

        let zero_ttl = CatalogConfig {
            cache_ttl_secs: 0,
            ..Default::default()
        };
        assert!(zero_ttl.validate().is_err());
    }

    #[test]
    fn models_url_trims_trailing_slash() {
        let cfg = CatalogConfig {
            api_url: "http://localhost:5080/".into(),
            ..Default::default()
        };
        assert_eq!(cfg.models_url(), "http://localhost:5080/models");
    }

    #[test]
    fn config_partial_deserialize_uses_defaults() {
        let cfg: CatalogConfig =
            serde_json::from_str(r#"{"timeout_secs": 5, "use_cache": false}"#).unwrap();
        assert_eq!(cfg.timeout_secs, 5);
        assert!(!cfg.use_cache);
        assert_eq!(cfg.api_url, DEFAULT_API_URL);
    }
}
