//! Reader for the upstream gene var table.
//!
//! The table is tab-separated with a header row. Only the `feature_id`,
//! `feature_name` and `feature_type` columns are used; they may appear in
//! any order alongside other columns.

use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;

use crate::error::SnapshotError;
use crate::gene::GeneRecord;
use crate::store::SnapshotResult;

const ID_COLUMN: &str = "feature_id";
const NAME_COLUMN: &str = "feature_name";
const TYPE_COLUMN: &str = "feature_type";

/// Read all rows of a var table file.
pub fn read_path(path: &Path) -> SnapshotResult<Vec<GeneRecord>> {
    let file = std::fs::File::open(path).map_err(|e| SnapshotError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    read(file, &path.display().to_string())
}

/// Read all rows from any reader; `origin` names the input in errors.
pub fn read<R: Read>(input: R, origin: &str) -> SnapshotResult<Vec<GeneRecord>> {
    let table_err = |message: String| SnapshotError::VarTable {
        path: origin.to_string(),
        message,
    };

    let mut rdr = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_reader(input);

    let headers = rdr
        .headers()
        .map_err(|e| table_err(format!("cannot read header: {e}")))?
        .clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| table_err(format!("missing column `{name}`")))
    };
    let id_col = column(ID_COLUMN)?;
    let name_col = column(NAME_COLUMN)?;
    let type_col = column(TYPE_COLUMN)?;

    let mut records = Vec::new();
    for (i, row) in rdr.records().enumerate() {
        // +2: one for the header, one for 1-based line numbers.
        let line = i + 2;
        let row = row.map_err(|e| table_err(format!("line {line}: {e}")))?;
        let field = |col: usize, name: &str| {
            row.get(col)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| table_err(format!("line {line}: empty `{name}`")))
        };
        records.push(GeneRecord::new(
            field(id_col, ID_COLUMN)?,
            field(name_col, NAME_COLUMN)?,
            field(type_col, TYPE_COLUMN)?,
        ));
    }

    tracing::debug!(origin, rows = records.len(), "read var table");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_columns_in_any_order() {
        let tsv = "soma_joinid\tfeature_type\tfeature_id\tfeature_name\n\
                   0\tprotein_coding\tENSG00000141510\tTP53\n\
                   1\tlncRNA\tENSG00000285053\tTBCE\n";
        let rows = read(tsv.as_bytes(), "inline").unwrap();
        assert_eq!(
            rows,
            vec![
                GeneRecord::new("ENSG00000141510", "TP53", "protein_coding"),
                GeneRecord::new("ENSG00000285053", "TBCE", "lncRNA"),
            ]
        );
    }

    #[test]
    fn missing_column_is_reported() {
        let tsv = "feature_id\tfeature_name\nENSG00000141510\tTP53\n";
        let err = read(tsv.as_bytes(), "inline").unwrap_err();
        assert!(format!("{err}").contains("feature_type"));
    }

    #[test]
    fn empty_field_names_line() {
        let tsv = "feature_id\tfeature_name\tfeature_type\n\
                   ENSG00000141510\tTP53\tprotein_coding\n\
                   ENSG00000012048\t\tprotein_coding\n";
        let err = read(tsv.as_bytes(), "inline").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("line 3"), "{msg}");
        assert!(msg.contains("feature_name"), "{msg}");
    }

    #[test]
    fn header_only_table_is_empty() {
        let tsv = "feature_id\tfeature_name\tfeature_type\n";
        assert!(read(tsv.as_bytes(), "inline").unwrap().is_empty());
    }
}
