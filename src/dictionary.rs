//! Gene dictionary: bidirectional symbol ↔ stable identifier index.
//!
//! A [`GeneDictionary`] is one immutable snapshot of an organism's gene
//! table. Symbol keys are normalized (trimmed, uppercased) once at build
//! time and queries are normalized the same way, so lookups are
//! case-insensitive and O(1).

use std::collections::HashMap;

use crate::error::DictionaryError;
use crate::gene::{normalize_symbol, FeatureType, GeneRecord, Organism, StableId};

/// Immutable per-organism gene index.
pub struct GeneDictionary {
    organism: Organism,
    census_version: String,
    /// Seconds since UNIX epoch at which the rows were fetched.
    built_at: u64,
    /// Source rows in insertion order, de-duplicated on (id, symbol).
    records: Vec<GeneRecord>,
    /// Normalized symbol → identifiers, ordered by first appearance.
    symbol_to_ids: HashMap<String, Vec<StableId>>,
    id_to_feature_type: HashMap<StableId, FeatureType>,
    /// First published symbol for each identifier.
    id_to_name: HashMap<StableId, String>,
}

impl GeneDictionary {
    pub fn builder(organism: Organism, census_version: impl Into<String>) -> DictionaryBuilder {
        DictionaryBuilder::new(organism, census_version)
    }

    /// Build a dictionary from a batch of rows.
    pub fn from_records(
        organism: Organism,
        census_version: impl Into<String>,
        records: impl IntoIterator<Item = GeneRecord>,
    ) -> Result<Self, DictionaryError> {
        let mut builder = Self::builder(organism, census_version);
        for record in records {
            builder.insert(record)?;
        }
        Ok(builder.build())
    }

    /// Candidate identifiers for a symbol (case-insensitive). Empty if unknown.
    pub fn lookup(&self, symbol: &str) -> &[StableId] {
        self.symbol_to_ids
            .get(&normalize_symbol(symbol))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn feature_type(&self, id: &StableId) -> Option<&FeatureType> {
        self.id_to_feature_type.get(id)
    }

    /// Published symbol for an identifier, in its original casing.
    pub fn canonical_name(&self, id: &StableId) -> Option<&str> {
        self.id_to_name.get(id).map(String::as_str)
    }

    pub fn contains_id(&self, id: &StableId) -> bool {
        self.id_to_feature_type.contains_key(id)
    }

    /// Normalized symbols that map to two or more identifiers, sorted.
    pub fn ambiguous_symbols(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self
            .symbol_to_ids
            .iter()
            .filter(|(_, ids)| ids.len() > 1)
            .map(|(sym, _)| sym.as_str())
            .collect();
        out.sort_unstable();
        out
    }

    /// The rows this snapshot was built from, in insertion order.
    pub fn records(&self) -> &[GeneRecord] {
        &self.records
    }

    pub fn symbol_index(&self) -> &HashMap<String, Vec<StableId>> {
        &self.symbol_to_ids
    }

    pub fn feature_types(&self) -> &HashMap<StableId, FeatureType> {
        &self.id_to_feature_type
    }

    pub fn organism(&self) -> Organism {
        self.organism
    }

    pub fn census_version(&self) -> &str {
        &self.census_version
    }

    pub fn built_at(&self) -> u64 {
        self.built_at
    }

    /// Number of distinct stable identifiers.
    pub fn len(&self) -> usize {
        self.id_to_feature_type.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_feature_type.is_empty()
    }

    /// Number of distinct normalized symbols.
    pub fn symbol_count(&self) -> usize {
        self.symbol_to_ids.len()
    }
}

impl std::fmt::Debug for GeneDictionary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneDictionary")
            .field("organism", &self.organism)
            .field("census_version", &self.census_version)
            .field("ids", &self.len())
            .field("symbols", &self.symbol_count())
            .finish()
    }
}

/// Incremental builder for a [`GeneDictionary`].
pub struct DictionaryBuilder {
    dict: GeneDictionary,
}

impl DictionaryBuilder {
    pub fn new(organism: Organism, census_version: impl Into<String>) -> Self {
        Self {
            dict: GeneDictionary {
                organism,
                census_version: census_version.into(),
                built_at: std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_secs(),
                records: Vec::new(),
                symbol_to_ids: HashMap::new(),
                id_to_feature_type: HashMap::new(),
                id_to_name: HashMap::new(),
            },
        }
    }

    /// Override the build timestamp (used when restoring a snapshot).
    pub fn built_at(mut self, secs: u64) -> Self {
        self.dict.built_at = secs;
        self
    }

    /// Add one row. Errors if the identifier was already seen with a
    /// different feature type; exact duplicates are ignored.
    pub fn insert(&mut self, record: GeneRecord) -> Result<(), DictionaryError> {
        let d = &mut self.dict;

        if let Some(existing) = d.id_to_feature_type.get(&record.id) {
            if *existing != record.feature_type {
                return Err(DictionaryError::ConflictingFeatureType {
                    id: record.id.to_string(),
                    existing: existing.to_string(),
                    conflicting: record.feature_type.to_string(),
                });
            }
        }

        let ids = d
            .symbol_to_ids
            .entry(normalize_symbol(&record.symbol))
            .or_default();
        if ids.contains(&record.id) {
            return Ok(());
        }
        ids.push(record.id.clone());

        d.id_to_feature_type
            .entry(record.id.clone())
            .or_insert_with(|| record.feature_type.clone());
        d.id_to_name
            .entry(record.id.clone())
            .or_insert_with(|| record.symbol.clone());
        d.records.push(record);
        Ok(())
    }

    pub fn build(self) -> GeneDictionary {
        self.dict
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GeneDictionary {
        GeneDictionary::from_records(
            Organism::HomoSapiens,
            "latest",
            [
                GeneRecord::new("ENSG00000141510", "TP53", "protein_coding"),
                GeneRecord::new("ENSG00000284770", "TBCE", "protein_coding"),
                GeneRecord::new("ENSG00000285053", "TBCE", "lncRNA"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let dict = sample();
        assert_eq!(dict.lookup("TP53"), dict.lookup("tp53"));
        assert_eq!(dict.lookup("Tp53"), &[StableId::new("ENSG00000141510")]);
        assert_eq!(dict.lookup(" tp53 "), dict.lookup("TP53"));
    }

    #[test]
    fn unknown_symbol_yields_empty_slice() {
        assert!(sample().lookup("NOSUCHGENE").is_empty());
    }

    #[test]
    fn candidates_keep_insertion_order() {
        let dict = sample();
        assert_eq!(
            dict.lookup("TBCE"),
            &[
                StableId::new("ENSG00000284770"),
                StableId::new("ENSG00000285053")
            ]
        );
        assert_eq!(dict.ambiguous_symbols(), vec!["TBCE"]);
    }

    #[test]
    fn feature_type_and_canonical_name() {
        let dict = sample();
        let id = StableId::new("ENSG00000285053");
        assert_eq!(dict.feature_type(&id).unwrap().as_str(), "lncRNA");
        assert_eq!(dict.canonical_name(&id), Some("TBCE"));
        assert!(dict.contains_id(&id));
        assert!(!dict.contains_id(&StableId::new("ENSG99999999999")));
    }

    #[test]
    fn duplicate_rows_are_collapsed() {
        let dict = GeneDictionary::from_records(
            Organism::HomoSapiens,
            "latest",
            [
                GeneRecord::new("ENSG00000141510", "TP53", "protein_coding"),
                GeneRecord::new("ENSG00000141510", "tp53", "protein_coding"),
            ],
        )
        .unwrap();
        assert_eq!(dict.lookup("TP53").len(), 1);
        assert_eq!(dict.records().len(), 1);
        assert_eq!(dict.len(), 1);
        assert_eq!(dict.symbol_count(), 1);
    }

    #[test]
    fn conflicting_feature_type_rejected() {
        let result = GeneDictionary::from_records(
            Organism::HomoSapiens,
            "latest",
            [
                GeneRecord::new("ENSG00000141510", "TP53", "protein_coding"),
                GeneRecord::new("ENSG00000141510", "TP53-ALT", "lncRNA"),
            ],
        );
        assert!(matches!(
            result,
            Err(DictionaryError::ConflictingFeatureType { .. })
        ));
    }

    #[test]
    fn one_id_may_carry_several_symbols() {
        let dict = GeneDictionary::from_records(
            Organism::HomoSapiens,
            "latest",
            [
                GeneRecord::new("ENSG00000141510", "TP53", "protein_coding"),
                GeneRecord::new("ENSG00000141510", "P53", "protein_coding"),
            ],
        )
        .unwrap();
        assert_eq!(dict.lookup("p53"), dict.lookup("tp53"));
        assert_eq!(
            dict.canonical_name(&StableId::new("ENSG00000141510")),
            Some("TP53")
        );
    }
}
