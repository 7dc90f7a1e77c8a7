//! Core gene types.
//!
//! A gene is known to callers by a human-readable symbol (`TP53`) and to the
//! downstream dataset by a [`StableId`] (`ENSG00000141510`). Each stable
//! identifier carries exactly one [`FeatureType`] within a snapshot; that
//! biotype is the only signal used for disambiguation.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::DictionaryError;

/// Canonical, organism-scoped accession string (Ensembl-style gene ID).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StableId(String);

impl StableId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StableId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for StableId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// Categorical biotype of a stable identifier.
///
/// The vocabulary is open (whatever the upstream table carries), so this is a
/// string newtype rather than an enum.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureType(String);

impl FeatureType {
    pub const PROTEIN_CODING: &'static str = "protein_coding";

    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn protein_coding() -> Self {
        Self::new(Self::PROTEIN_CODING)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FeatureType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FeatureType {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for FeatureType {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// One row of the upstream gene table: the unit of persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneRecord {
    pub id: StableId,
    /// Symbol as published upstream (original casing).
    pub symbol: String,
    pub feature_type: FeatureType,
}

impl GeneRecord {
    pub fn new(
        id: impl Into<StableId>,
        symbol: impl Into<String>,
        feature_type: impl Into<FeatureType>,
    ) -> Self {
        Self {
            id: id.into(),
            symbol: symbol.into(),
            feature_type: feature_type.into(),
        }
    }
}

/// Organisms with a gene dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Organism {
    HomoSapiens,
    MusMusculus,
}

impl Organism {
    pub const ALL: [Organism; 2] = [Organism::HomoSapiens, Organism::MusMusculus];

    /// Census key, e.g. `homo_sapiens`.
    pub fn key(self) -> &'static str {
        match self {
            Organism::HomoSapiens => "homo_sapiens",
            Organism::MusMusculus => "mus_musculus",
        }
    }

    /// Key with every non-alphanumeric character removed, for file names.
    pub fn slug(self) -> &'static str {
        match self {
            Organism::HomoSapiens => "homosapiens",
            Organism::MusMusculus => "musmusculus",
        }
    }

    /// Binomial name, e.g. `Homo sapiens`.
    pub fn scientific_name(self) -> &'static str {
        match self {
            Organism::HomoSapiens => "Homo sapiens",
            Organism::MusMusculus => "Mus musculus",
        }
    }
}

impl std::fmt::Display for Organism {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Organism {
    type Err = DictionaryError;

    /// Accepts `homo_sapiens`, `Homo sapiens`, `HOMO-SAPIENS` and friends.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                c => c.to_ascii_lowercase(),
            })
            .collect();
        Organism::ALL
            .into_iter()
            .find(|o| o.key() == folded)
            .ok_or_else(|| DictionaryError::UnknownOrganism {
                name: s.to_string(),
            })
    }
}

/// Normalize a symbol for index keys and queries: trimmed, uppercased.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

static RE_STABLE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^ENS[A-Z]*G\d+$").unwrap());

/// Whether a token is lexically an Ensembl gene identifier (`ENSG…`,
/// `ENSMUSG…`), case-insensitive. Callers that accept a match as an
/// identifier should uppercase it.
pub fn is_stable_id(token: &str) -> bool {
    RE_STABLE_ID.is_match(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn organism_parses_lenient_spellings() {
        assert_eq!("homo_sapiens".parse::<Organism>().unwrap(), Organism::HomoSapiens);
        assert_eq!("Homo sapiens".parse::<Organism>().unwrap(), Organism::HomoSapiens);
        assert_eq!(" MUS-MUSCULUS ".parse::<Organism>().unwrap(), Organism::MusMusculus);
        assert!("danio_rerio".parse::<Organism>().is_err());
    }

    #[test]
    fn organism_slug_is_alphanumeric() {
        for o in Organism::ALL {
            assert!(o.slug().chars().all(|c| c.is_ascii_alphanumeric()));
        }
        assert_eq!(Organism::HomoSapiens.to_string(), "homo_sapiens");
    }

    #[test]
    fn stable_id_pattern() {
        assert!(is_stable_id("ENSG00000141510"));
        assert!(is_stable_id("ensg00000141510"));
        assert!(is_stable_id("ENSMUSG00000059552"));
        assert!(!is_stable_id("TP53"));
        assert!(!is_stable_id("ENSG"));
        assert!(!is_stable_id("ENSG0000014151X"));
        assert!(!is_stable_id(" ENSG00000141510"));
    }

    #[test]
    fn normalize_trims_and_uppercases() {
        assert_eq!(normalize_symbol("  tp53 "), "TP53");
        assert_eq!(normalize_symbol("Tbce"), "TBCE");
    }

    #[test]
    fn ids_order_lexicographically() {
        let a = StableId::new("ENSG00000012048");
        let b = StableId::new("ENSG00000141510");
        assert!(a < b);
        assert_eq!(a.to_string(), "ENSG00000012048");
    }
}
