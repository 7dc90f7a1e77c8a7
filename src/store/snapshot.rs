//! Versioned binary snapshot of a [`GeneDictionary`].
//!
//! Layout: a fixed bincode header (`magic`, `schema_version`) followed by a
//! bincode body carrying provenance and the source rows. The index is rebuilt
//! from the rows on load, so a reloaded snapshot has exactly the same
//! symbol → identifier and identifier → feature type mappings.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dictionary::GeneDictionary;
use crate::error::SnapshotError;
use crate::gene::{GeneRecord, Organism};
use crate::store::SnapshotResult;

const MAGIC: [u8; 8] = *b"GENEDICT";

/// Bumped whenever the body layout changes.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    magic: [u8; 8],
    schema_version: u32,
}

#[derive(Serialize)]
struct BodyRef<'a> {
    organism: Organism,
    census_version: &'a str,
    built_at: u64,
    records: &'a [GeneRecord],
}

#[derive(Deserialize)]
struct Body {
    organism: Organism,
    census_version: String,
    built_at: u64,
    records: Vec<GeneRecord>,
}

/// Write a snapshot atomically: encode into a sibling temp file, then rename.
pub fn save(path: &Path, dict: &GeneDictionary) -> SnapshotResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }

    let tmp = path.with_extension("bin.tmp");
    {
        let file = File::create(&tmp).map_err(|e| io_err(&tmp, e))?;
        let mut writer = BufWriter::new(file);
        let header = Header {
            magic: MAGIC,
            schema_version: SCHEMA_VERSION,
        };
        let body = BodyRef {
            organism: dict.organism(),
            census_version: dict.census_version(),
            built_at: dict.built_at(),
            records: dict.records(),
        };
        bincode::serialize_into(&mut writer, &header).map_err(serde_err)?;
        bincode::serialize_into(&mut writer, &body).map_err(serde_err)?;
        writer.flush().map_err(|e| io_err(&tmp, e))?;
    }
    std::fs::rename(&tmp, path).map_err(|e| io_err(path, e))?;

    tracing::info!(
        path = %path.display(),
        organism = %dict.organism(),
        ids = dict.len(),
        "saved gene dictionary snapshot"
    );
    Ok(())
}

/// Load a snapshot and rebuild its index.
///
/// `expected` guards against a file that was copied or renamed across
/// organisms.
pub fn load(path: &Path, expected: Organism) -> SnapshotResult<GeneDictionary> {
    let shown = path.display().to_string();
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(SnapshotError::Missing { path: shown });
        }
        Err(e) => return Err(io_err(path, e)),
    };
    let mut reader = BufReader::new(file);

    let header: Header = bincode::deserialize_from(&mut reader).map_err(|e| corrupt(path, e))?;
    if header.magic != MAGIC {
        return Err(SnapshotError::Corrupt {
            path: shown,
            message: "not a gene dictionary snapshot".into(),
        });
    }
    if header.schema_version != SCHEMA_VERSION {
        return Err(SnapshotError::SchemaMismatch {
            path: shown,
            found: header.schema_version,
            expected: SCHEMA_VERSION,
        });
    }

    let body: Body = bincode::deserialize_from(&mut reader).map_err(|e| corrupt(path, e))?;
    if body.organism != expected {
        return Err(SnapshotError::OrganismMismatch {
            path: shown,
            found: body.organism.to_string(),
            expected: expected.to_string(),
        });
    }

    let mut builder =
        GeneDictionary::builder(body.organism, body.census_version).built_at(body.built_at);
    for record in body.records {
        builder.insert(record).map_err(|e| SnapshotError::Corrupt {
            path: shown.clone(),
            message: e.to_string(),
        })?;
    }
    let dict = builder.build();

    tracing::info!(
        path = %shown,
        organism = %dict.organism(),
        census_version = dict.census_version(),
        ids = dict.len(),
        symbols = dict.symbol_count(),
        "loaded gene dictionary snapshot"
    );
    Ok(dict)
}

fn io_err(path: &Path, source: std::io::Error) -> SnapshotError {
    SnapshotError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn serde_err(e: bincode::Error) -> SnapshotError {
    SnapshotError::Serialization {
        message: format!("failed to encode snapshot: {e}"),
    }
}

fn corrupt(path: &Path, e: bincode::Error) -> SnapshotError {
    SnapshotError::Corrupt {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}
