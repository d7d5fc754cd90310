//! YAML configuration file support for indexcfg.
//!
//! One file describes where the model catalog lives and the (partial) index
//! request to resolve. Every key under `index` is optional; whatever is
//! present is treated as user-supplied and survives resolution unchanged.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//!
//! catalog:
//!   api_url: "https://api.pinecone.io"
//!   timeout_secs: 10
//!   cache_ttl_secs: 86400
//!   use_cache: true
//!
//! index:
//!   name: "docs"
//!   model: "default"
//!   cloud: "gcp"
//!   deletion_protection: "enabled"
//!   tags:
//!     team: "search"
//! ```
//!
//! `INDEXCFG_API_URL`, `INDEXCFG_API_KEY` and `INDEXCFG_CACHE_DIR` override the
//! `catalog` section; API keys are best kept out of the file entirely.

use std::fs;
use std::path::Path;

use catalog::CatalogConfig;
use resolve::PartialConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level YAML configuration file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct IndexcfgConfig {
    /// Configuration format version
    pub version: String,

    /// Model catalog endpoint and cache settings
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// The index request to resolve
    #[serde(default)]
    pub index: PartialConfig,
}

impl IndexcfgConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: IndexcfgConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// The `catalog` section with `INDEXCFG_*` environment overrides applied.
    pub fn catalog_config(&self) -> CatalogConfig {
        self.catalog.clone().with_env_overrides()
    }

    fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.catalog
            .validate()
            .map_err(|err| ConfigLoadError::Validation(err.to_string()))?;

        if let Some(name) = self.index.name.value() {
            if name.trim().is_empty() {
                return Err(ConfigLoadError::Validation(
                    "index.name must not be empty".to_string(),
                ));
            }
        }
        if let Some(model) = self.index.model.value() {
            if model.trim().is_empty() {
                return Err(ConfigLoadError::Validation(
                    "index.model must not be empty".to_string(),
                ));
            }
        }

        Ok(())
    }
}

impl Default for IndexcfgConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            catalog: CatalogConfig::default(),
            index: PartialConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resolve::{DeletionProtection, Metric, VectorKind};
    use std::io::Write;

    #[test]
    fn test_load_minimal_yaml() {
        let cfg = IndexcfgConfig::from_yaml(r#"version: "1.0""#).unwrap();
        assert_eq!(cfg.version, "1.0");
        assert_eq!(cfg.index, PartialConfig::default());
        assert_eq!(cfg.catalog, CatalogConfig::default());
    }

    #[test]
    fn test_index_values_are_explicit() {
        let yaml = r#"
version: "1"
index:
  name: docs
  vector_type: sparse
  metric: dotproduct
  deletion_protection: enabled
  shards: 0
  tags:
    team: search
"#;
        let cfg = IndexcfgConfig::from_yaml(yaml).unwrap();
        let index = &cfg.index;
        assert!(index.name.is_explicit());
        assert_eq!(index.vector_type.value(), Some(&VectorKind::Sparse));
        assert_eq!(index.metric.value(), Some(&Metric::Dotproduct));
        assert_eq!(
            index.deletion_protection.value(),
            Some(&DeletionProtection::Enabled)
        );
        // Zero is a value, not "unset".
        assert_eq!(index.shards.value(), Some(&0));
        assert!(index.shards.is_explicit());
        assert!(index.region.is_absent());
        assert_eq!(
            index.tags.value().and_then(|t| t.get("team")).map(String::as_str),
            Some("search")
        );
    }

    #[test]
    fn test_catalog_section_overlays_defaults() {
        let yaml = r#"
version: "1.0"
catalog:
  api_url: "http://localhost:5080"
  use_cache: false
"#;
        let cfg = IndexcfgConfig::from_yaml(yaml).unwrap();
        assert_eq!(cfg.catalog.api_url, "http://localhost:5080");
        assert!(!cfg.catalog.use_cache);
        assert_eq!(cfg.catalog.timeout_secs, CatalogConfig::default().timeout_secs);
    }

    #[test]
    fn test_unsupported_version() {
        let err = IndexcfgConfig::from_yaml(r#"version: "2.0""#).unwrap_err();
        assert!(matches!(err, ConfigLoadError::UnsupportedVersion(v) if v == "2.0"));
    }

    #[test]
    fn test_invalid_enum_value_is_a_parse_error() {
        let yaml = r#"
version: "1.0"
index:
  metric: manhattan
"#;
        assert!(matches!(
            IndexcfgConfig::from_yaml(yaml),
            Err(ConfigLoadError::YamlParse(_))
        ));
    }

    #[test]
    fn test_validation_errors() {
        let bad_catalog = r#"
version: "1.0"
catalog:
  timeout_secs: 0
"#;
        assert!(matches!(
            IndexcfgConfig::from_yaml(bad_catalog),
            Err(ConfigLoadError::Validation(_))
        ));

        let blank_name = r#"
version: "1.0"
index:
  name: "  "
"#;
        assert!(matches!(
            IndexcfgConfig::from_yaml(blank_name),
            Err(ConfigLoadError::Validation(msg)) if msg.contains("index.name")
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "version: \"1.0\"\nindex:\n  cloud: gcp").unwrap();

        let cfg = IndexcfgConfig::from_file(file.path()).unwrap();
        assert_eq!(cfg.index.cloud.value().map(String::as_str), Some("gcp"));
    }

    #[test]
    fn test_missing_file() {
        let err = IndexcfgConfig::from_file("/nonexistent/indexcfg.yaml").unwrap_err();
        assert!(matches!(err, ConfigLoadError::FileRead(_)));
    }
}
