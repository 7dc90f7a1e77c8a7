//! XDG-compliant path resolution.
//!
//! Snapshots are cache data (rebuildable from the upstream table), so they
//! live under `$XDG_CACHE_HOME`; the config file lives under
//! `$XDG_CONFIG_HOME`.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Errors from path resolution.
#[derive(Debug, Error, Diagnostic)]
pub enum PathError {
    #[error("cannot determine home directory")]
    #[diagnostic(
        code(genes::paths::no_home),
        help("Set the HOME environment variable or pass --cache-dir explicitly.")
    )]
    NoHome,

    #[error("failed to create directory: {path}")]
    #[diagnostic(
        code(genes::paths::create_dir),
        help("Check that the parent directory exists and you have write permissions.")
    )]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type PathResult<T> = std::result::Result<T, PathError>;

const APP_DIR: &str = "gene-resolver";

/// Global directories for the resolver.
#[derive(Debug, Clone)]
pub struct GenePaths {
    /// `$XDG_CONFIG_HOME/gene-resolver/`
    pub config_dir: PathBuf,
    /// `$XDG_CACHE_HOME/gene-resolver/`
    pub cache_dir: PathBuf,
}

impl GenePaths {
    /// Resolve XDG directories from environment variables with standard fallbacks.
    pub fn resolve() -> PathResult<Self> {
        let home = std::env::var("HOME")
            .map(PathBuf::from)
            .map_err(|_| PathError::NoHome)?;

        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".config"))
            .join(APP_DIR);

        let cache_dir = std::env::var("XDG_CACHE_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".cache"))
            .join(APP_DIR);

        Ok(Self {
            config_dir,
            cache_dir,
        })
    }

    /// Create both directories. Idempotent.
    pub fn ensure_dirs(&self) -> PathResult<()> {
        for dir in [&self.config_dir, &self.cache_dir] {
            std::fs::create_dir_all(dir).map_err(|e| PathError::CreateDir {
                path: dir.display().to_string(),
                source: e,
            })?;
        }
        Ok(())
    }

    /// Path to the config file.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolved_paths_use_app_dir() {
        // Env vars are not mutated here (unsafe in edition 2024).
        let paths = GenePaths::resolve().unwrap();
        assert!(paths.cache_dir.ends_with(APP_DIR));
        assert!(paths.config_dir.ends_with(APP_DIR));
        assert!(paths.config_file().starts_with(&paths.config_dir));
    }

    #[test]
    fn ensure_dirs_creates_both() {
        let tmp = tempfile::TempDir::new().unwrap();
        let paths = GenePaths {
            config_dir: tmp.path().join("config"),
            cache_dir: tmp.path().join("cache").join("nested"),
        };
        paths.ensure_dirs().unwrap();
        assert!(paths.config_dir.is_dir());
        assert!(paths.cache_dir.is_dir());
        paths.ensure_dirs().unwrap();
    }
}
