//! Catalog configuration.
//!
//! Defines the YAML-serializable configuration that controls which schemas a
//! catalog exposes and whether compiled documents are memoized.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! allowlist:
//!   - order
//!   - customer
//! exclude:
//!   - legacy-order
//! cache:
//!   enabled: true
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};

/// Configuration format version written by [`CatalogConfig::default`].
pub const CONFIG_VERSION: &str = "1.0";

/// Settings for the compiled-document cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Memoize compiled documents by descriptor fingerprint.
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Top-level catalog configuration.
///
/// Loaded from a YAML file (typically `jsonshape.yml`) and handed to
/// [`CatalogBuilder::with_config`](crate::CatalogBuilder::with_config).
///
/// # Examples
///
/// ```no_run
/// use jsonshape_catalog::CatalogConfig;
///
/// let config = CatalogConfig::load("jsonshape.yml").unwrap();
/// if config.is_allowed("order") {
///     println!("order schema is exposed");
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Configuration format version; only major version `1` is understood.
    pub version: String,
    /// Schemas to expose (empty = every loaded schema).
    #[serde(default)]
    pub allowlist: Vec<String>,
    /// Schemas to hide.
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Compiled-document cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            allowlist: Vec::new(),
            exclude: Vec::new(),
            cache: CacheConfig::default(),
        }
    }
}

impl CatalogConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::CatalogError::IoError) if the file cannot
    /// be read, [`YamlError`](crate::CatalogError::YamlError) if parsing
    /// fails, or [`UnsupportedConfigVersion`](crate::CatalogError::UnsupportedConfigVersion)
    /// for a format version other than `1.x`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config: Self = serde_yaml::from_reader(reader)?;
        config.check_version()?;
        Ok(config)
    }

    /// Checks that [`version`](Self::version) has major version `1`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnsupportedConfigVersion`] otherwise.
    pub fn check_version(&self) -> Result<()> {
        let major = self.version.split('.').next().unwrap_or_default();
        if major == "1" {
            Ok(())
        } else {
            Err(CatalogError::UnsupportedConfigVersion(self.version.clone()))
        }
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::CatalogError::IoError) if the file cannot
    /// be written, or [`YamlError`](crate::CatalogError::YamlError) if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Returns `true` if `name` is in the exclusion list.
    pub fn is_excluded(&self, name: &str) -> bool {
        self.exclude.iter().any(|n| n == name)
    }

    /// Returns `true` if `name` is exposed.
    ///
    /// When the allowlist is empty, all non-excluded schemas are implicitly
    /// allowed. Exclusions are always honored.
    ///
    /// # Examples
    ///
    /// ```
    /// # let yaml = r#"
    /// # version: "1.0"
    /// # allowlist: [order, customer]
    /// # exclude: [customer]
    /// # "#;
    /// # let config: jsonshape_catalog::CatalogConfig = serde_yaml::from_str(yaml).unwrap();
    /// assert!(config.is_allowed("order"));
    /// assert!(!config.is_allowed("invoice"));
    /// assert!(!config.is_allowed("customer"));
    /// ```
    pub fn is_allowed(&self, name: &str) -> bool {
        if self.is_excluded(name) {
            return false;
        }
        if self.allowlist.is_empty() {
            return true;
        }
        self.allowlist.iter().any(|n| n == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
version: "1.0"
allowlist:
  - order
  - customer
  - invoice
exclude:
  - legacy-order
cache:
  enabled: false
"#
    }

    #[test]
    fn test_deserialize_complete() {
        let config: CatalogConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.allowlist, vec!["order", "customer", "invoice"]);
        assert_eq!(config.exclude, vec!["legacy-order"]);
        assert!(!config.cache.enabled);
    }

    #[test]
    fn test_deserialize_minimal_uses_defaults() {
        let config: CatalogConfig = serde_yaml::from_str("version: \"1.0\"\n").unwrap();
        assert!(config.allowlist.is_empty());
        assert!(config.exclude.is_empty());
        assert!(config.cache.enabled);
        assert_eq!(config, CatalogConfig::default());
    }

    #[test]
    fn test_is_allowed() {
        let config: CatalogConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        assert!(config.is_allowed("order"));
        assert!(!config.is_allowed("unknown"));
        assert!(!config.is_allowed("legacy-order"));
    }

    #[test]
    fn test_empty_allowlist_still_honors_exclusions() {
        let yaml = r#"
version: "1.0"
exclude:
  - legacy-order
"#;
        let config: CatalogConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.is_allowed("order"));
        assert!(config.is_allowed("anything"));
        assert!(!config.is_allowed("legacy-order"));
    }

    #[test]
    fn test_load_rejects_unknown_major_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jsonshape.yml");
        std::fs::write(&path, "version: \"2.0\"\n").unwrap();

        let err = CatalogConfig::load(&path).unwrap_err();
        assert!(matches!(err, CatalogError::UnsupportedConfigVersion(v) if v == "2.0"));

        std::fs::write(&path, "version: \"1.3\"\n").unwrap();
        assert_eq!(CatalogConfig::load(&path).unwrap().version, "1.3");
    }

    #[test]
    fn test_load_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jsonshape.yml");

        let original: CatalogConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        original.save(&path).unwrap();

        let loaded = CatalogConfig::load(&path).unwrap();
        assert_eq!(loaded, original);
    }
}
