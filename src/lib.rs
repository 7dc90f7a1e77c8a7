// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # gene-resolver
//!
//! Resolves free-text gene symbols to stable (Ensembl-style) identifiers,
//! flags symbols that are ambiguous across feature types, and renders the
//! accepted identifiers as a `feature_id in [...]` filter fragment.
//!
//! ## Architecture
//!
//! - **Dictionary** (`dictionary`): immutable per-organism symbol ↔ identifier index
//! - **Snapshots** (`store`): versioned on-disk snapshots and var-table import
//! - **Registry** (`registry`): lazy, load-once-per-organism snapshot cache
//! - **Resolver** (`resolver`): classification, disambiguation policy, LRU result cache
//! - **Filters** (`filter`): deterministic filter-fragment rendering
//!
//! ## Library usage
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use gene_resolver::filter::render_filter;
//! use gene_resolver::gene::Organism;
//! use gene_resolver::registry::DictionaryRegistry;
//! use gene_resolver::resolver::{accepted_ids, Resolver};
//!
//! let registry = Arc::new(DictionaryRegistry::new("/var/cache/genes", "latest"));
//! let resolver = Resolver::new(registry);
//! let results = resolver.resolve(&["TP53", "BRCA1"], Organism::HomoSapiens).unwrap();
//! let filter = render_filter(&accepted_ids(&results)).unwrap();
//! assert!(filter.starts_with("feature_id in ["));
//! ```

pub mod config;
pub mod dictionary;
pub mod error;
pub mod filter;
pub mod gene;
pub mod paths;
pub mod registry;
pub mod resolver;
pub mod source;
pub mod store;
