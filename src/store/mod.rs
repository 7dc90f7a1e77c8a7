//! On-disk storage for gene dictionaries.
//!
//! - [`snapshot`]: versioned bincode snapshot, one file per organism and
//!   census version, written atomically.
//! - [`var_table`]: tab-separated upstream var table (`feature_id`,
//!   `feature_name`, `feature_type`), the input a refresh is built from.

pub mod snapshot;
pub mod var_table;

use std::path::{Path, PathBuf};

use crate::error::SnapshotError;
use crate::gene::Organism;

/// Result type for store operations.
pub type SnapshotResult<T> = std::result::Result<T, SnapshotError>;

/// File name of the snapshot for an organism at a census version, e.g.
/// `latest_homosapiens_gene_dict.bin`.
pub fn snapshot_file_name(census_version: &str, organism: Organism) -> String {
    let version: String = census_version
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
        .collect();
    format!("{version}_{}_gene_dict.bin", organism.slug())
}

/// Full snapshot path inside a cache directory.
pub fn snapshot_path(cache_dir: &Path, census_version: &str, organism: Organism) -> PathBuf {
    cache_dir.join(snapshot_file_name(census_version, organism))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_follows_version_and_slug() {
        assert_eq!(
            snapshot_file_name("latest", Organism::HomoSapiens),
            "latest_homosapiens_gene_dict.bin"
        );
        assert_eq!(
            snapshot_file_name("2025-01-30", Organism::MusMusculus),
            "2025-01-30_musmusculus_gene_dict.bin"
        );
    }

    #[test]
    fn version_cannot_escape_cache_dir() {
        let name = snapshot_file_name("../etc/passwd", Organism::HomoSapiens);
        assert!(!name.contains('/'));
        let path = snapshot_path(Path::new("/cache"), "../x", Organism::HomoSapiens);
        assert_eq!(path.parent(), Some(Path::new("/cache")));
    }
}
