//! Resolver configuration, persisted as TOML.
//!
//! Every field has a serde default, so an empty file (or no file at all)
//! yields a working configuration.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gene::Organism;
use crate::paths::GenePaths;
use crate::registry::DictionaryRegistry;
use crate::resolver::{DisambiguationPolicy, Resolver, DEFAULT_CACHE_CAPACITY};
use crate::source::VarTableDir;

/// Errors from config operations.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(genes::config::read),
        help("Ensure the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {path}: {message}")]
    #[diagnostic(
        code(genes::config::parse),
        help("Check the TOML syntax in the config file.")
    )]
    Parse { path: String, message: String },

    #[error("failed to write config: {path}")]
    #[diagnostic(
        code(genes::config::write),
        help("Ensure you have write permissions to the config directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Census release the snapshots belong to.
    #[serde(default = "default_census_version")]
    pub census_version: String,
    #[serde(default = "default_organism")]
    pub default_organism: Organism,
    /// Feature type preferred when a symbol is ambiguous. Empty disables
    /// automatic disambiguation.
    #[serde(default = "default_preferred_feature_type")]
    pub preferred_feature_type: String,
    /// Bound on cached batch results; 0 disables the cache.
    #[serde(default = "default_result_cache_capacity")]
    pub result_cache_capacity: usize,
    /// Snapshot directory. Defaults to the XDG cache dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
    /// Directory of `{organism}.tsv` var tables used to rebuild snapshots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub var_table_dir: Option<PathBuf>,
}

fn default_census_version() -> String {
    "latest".into()
}
fn default_organism() -> Organism {
    Organism::HomoSapiens
}
fn default_preferred_feature_type() -> String {
    crate::gene::FeatureType::PROTEIN_CODING.into()
}
fn default_result_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            census_version: default_census_version(),
            default_organism: default_organism(),
            preferred_feature_type: default_preferred_feature_type(),
            result_cache_capacity: default_result_cache_capacity(),
            cache_dir: None,
            var_table_dir: None,
        }
    }
}

impl ResolverConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Load from a TOML file, or defaults if it does not exist.
    pub fn load_or_default(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Save to a TOML file.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }

    pub fn policy(&self) -> DisambiguationPolicy {
        match self.preferred_feature_type.trim() {
            "" => DisambiguationPolicy::disabled(),
            ft => DisambiguationPolicy::prefer(ft),
        }
    }

    /// Snapshot directory: the configured one, else the XDG cache dir.
    pub fn cache_dir_or(&self, paths: &GenePaths) -> PathBuf {
        self.cache_dir
            .clone()
            .unwrap_or_else(|| paths.cache_dir.clone())
    }

    /// Build a registry over `cache_dir`, with a var-table source if configured.
    pub fn registry(&self, cache_dir: PathBuf) -> DictionaryRegistry {
        let registry = DictionaryRegistry::new(cache_dir, self.census_version.clone());
        match &self.var_table_dir {
            Some(dir) => registry.with_source(Arc::new(VarTableDir::new(dir))),
            None => registry,
        }
    }

    /// Build a resolver with this config's policy and cache bound.
    pub fn resolver(&self, registry: Arc<DictionaryRegistry>) -> Resolver {
        Resolver::new(registry)
            .with_policy(self.policy())
            .with_cache_capacity(self.result_cache_capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let cfg: ResolverConfig = toml::from_str("").unwrap();
        assert_eq!(cfg, ResolverConfig::default());
        assert_eq!(cfg.policy(), DisambiguationPolicy::default());
    }

    #[test]
    fn config_roundtrip_toml() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");

        let cfg = ResolverConfig {
            census_version: "2025-01-30".into(),
            default_organism: Organism::MusMusculus,
            result_cache_capacity: 16,
            var_table_dir: Some(tmp.path().join("tables")),
            ..Default::default()
        };
        cfg.save(&path).unwrap();

        let loaded = ResolverConfig::load(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn blank_preference_disables_policy() {
        let cfg: ResolverConfig = toml::from_str("preferred_feature_type = \"\"").unwrap();
        assert_eq!(cfg.policy(), DisambiguationPolicy::disabled());
    }

    #[test]
    fn parse_error_names_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "result_cache_capacity = \"many\"").unwrap();
        let err = ResolverConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let cfg = ResolverConfig::load_or_default(&tmp.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.census_version, "latest");
    }
}
