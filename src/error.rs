//! Rich diagnostic error types for gene resolution.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text. Per-token outcomes (not found, ambiguous)
//! are never errors: they live in [`crate::resolver::ResolutionResult`].

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the resolver.
#[derive(Debug, Error, Diagnostic)]
pub enum GeneError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Dictionary(#[from] DictionaryError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Render(#[from] RenderError),
}

// ---------------------------------------------------------------------------
// Dictionary errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum DictionaryError {
    #[error("gene dictionary unavailable for {organism}: no usable snapshot at {path} ({reason})")]
    #[diagnostic(
        code(genes::dictionary::unavailable),
        help(
            "No usable snapshot exists for this organism and it could not be rebuilt. \
             Import a var table with `gene-resolver import --organism {organism} \
             --var-table <file.tsv>`, or point `var_table_dir` in the config at a \
             directory holding `{organism}.tsv`."
        )
    )]
    Unavailable {
        organism: String,
        path: String,
        /// Why no rebuild was possible.
        reason: String,
    },

    #[error("identifier {id} listed with feature type {existing} and {conflicting}")]
    #[diagnostic(
        code(genes::dictionary::conflicting_feature_type),
        help(
            "Every stable identifier must carry exactly one feature type per snapshot. \
             The upstream var table is inconsistent; refresh it."
        )
    )]
    ConflictingFeatureType {
        id: String,
        existing: String,
        conflicting: String,
    },

    #[error("unknown organism: {name}")]
    #[diagnostic(
        code(genes::dictionary::unknown_organism),
        help("Supported organisms are: homo_sapiens, mus_musculus.")
    )]
    UnknownOrganism { name: String },

    #[error("no refresh source configured for {organism}")]
    #[diagnostic(
        code(genes::dictionary::no_source),
        help("Set `var_table_dir` in the config to a directory holding `{organism}.tsv`.")
    )]
    NoSource { organism: String },

    #[error("refresh source failed for {organism}: {message}")]
    #[diagnostic(
        code(genes::dictionary::source),
        help("The upstream gene table could not be fetched. Check the source location.")
    )]
    Source { organism: String, message: String },
}

// ---------------------------------------------------------------------------
// Snapshot errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum SnapshotError {
    #[error("I/O error on {path}: {source}")]
    #[diagnostic(
        code(genes::snapshot::io),
        help(
            "A filesystem operation failed. Check that the cache directory exists, \
             has correct permissions, and that the disk is not full."
        )
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot not found: {path}")]
    #[diagnostic(code(genes::snapshot::missing))]
    Missing { path: String },

    #[error("snapshot {path} is corrupt: {message}")]
    #[diagnostic(
        code(genes::snapshot::corrupt),
        help("Delete the file and import or refresh the dictionary again.")
    )]
    Corrupt { path: String, message: String },

    #[error("snapshot {path} has schema version {found}, expected {expected}")]
    #[diagnostic(
        code(genes::snapshot::schema),
        help(
            "The snapshot was written by an incompatible version. \
             Re-import the var table to rebuild it."
        )
    )]
    SchemaMismatch {
        path: String,
        found: u32,
        expected: u32,
    },

    #[error("snapshot {path} holds {found}, expected {expected}")]
    #[diagnostic(code(genes::snapshot::organism_mismatch))]
    OrganismMismatch {
        path: String,
        found: String,
        expected: String,
    },

    #[error("serialization error: {message}")]
    #[diagnostic(code(genes::snapshot::serde))]
    Serialization { message: String },

    #[error("var table {path}: {message}")]
    #[diagnostic(
        code(genes::snapshot::var_table),
        help(
            "The var table must be tab-separated with a header naming the \
             feature_id, feature_name and feature_type columns."
        )
    )]
    VarTable { path: String, message: String },
}

// ---------------------------------------------------------------------------
// Resolution errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ResolveError {
    #[error("no gene tokens given")]
    #[diagnostic(
        code(genes::resolve::empty_query),
        help("Pass at least one gene symbol or stable identifier.")
    )]
    EmptyQuery,
}

// ---------------------------------------------------------------------------
// Render errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum RenderError {
    #[error("cannot render a filter from an empty identifier set")]
    #[diagnostic(
        code(genes::render::empty),
        help(
            "An empty membership test would match nothing. Check the resolution \
             results for not-found or ambiguous genes before building a filter."
        )
    )]
    EmptyIdentifierSet,
}

/// Convenience alias for functions returning resolver results.
pub type GeneResult<T> = std::result::Result<T, GeneError>;
