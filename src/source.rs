//! Refresh sources: where fresh gene tables come from.
//!
//! The registry only needs rows; how they are fetched (census download,
//! local export, fixture) is behind [`DictionarySource`].

use std::path::{Path, PathBuf};

use crate::error::DictionaryError;
use crate::gene::{GeneRecord, Organism};
use crate::store::var_table;

/// Supplier of upstream gene rows for an organism.
pub trait DictionarySource: Send + Sync {
    fn fetch(
        &self,
        organism: Organism,
        census_version: &str,
    ) -> Result<Vec<GeneRecord>, DictionaryError>;
}

/// Reads `{dir}/{organism}.tsv` var tables exported from the census.
#[derive(Debug, Clone)]
pub struct VarTableDir {
    dir: PathBuf,
}

impl VarTableDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn table_path(&self, organism: Organism) -> PathBuf {
        self.dir.join(format!("{}.tsv", organism.key()))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DictionarySource for VarTableDir {
    fn fetch(
        &self,
        organism: Organism,
        census_version: &str,
    ) -> Result<Vec<GeneRecord>, DictionaryError> {
        let path = self.table_path(organism);
        tracing::info!(
            path = %path.display(),
            %organism,
            census_version,
            "fetching gene var table"
        );
        var_table::read_path(&path).map_err(|e| DictionaryError::Source {
            organism: organism.to_string(),
            message: e.to_string(),
        })
    }
}
