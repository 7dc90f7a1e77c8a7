//! Persistence and reload tests.
//!
//! These verify that a dictionary survives a process restart (save + fresh
//! registry) with identical mappings, and that var-table refreshes produce
//! usable snapshots.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use gene_resolver::config::ResolverConfig;
use gene_resolver::dictionary::GeneDictionary;
use gene_resolver::gene::{GeneRecord, Organism};
use gene_resolver::registry::DictionaryRegistry;
use gene_resolver::resolver::ResolutionStatus;
use gene_resolver::store::{snapshot, var_table};

const VAR_TABLE: &str = "soma_joinid\tfeature_id\tfeature_name\tfeature_type\tfeature_length\n\
0\tENSG00000141510\tTP53\tprotein_coding\t2579\n\
1\tENSG00000012048\tBRCA1\tprotein_coding\t7088\n\
2\tENSG00000284770\tTBCE\tprotein_coding\t1234\n\
3\tENSG00000285053\tTBCE\tlncRNA\t812\n\
4\tENSG00000230417\tLINC00856\tlncRNA\t1720\n";

/// Order-independent view of a dictionary's mappings.
fn mappings(dict: &GeneDictionary) -> (HashMap<String, HashSet<String>>, HashMap<String, String>) {
    let symbols = dict
        .symbol_index()
        .iter()
        .map(|(sym, ids)| (sym.clone(), ids.iter().map(|i| i.to_string()).collect()))
        .collect();
    let types = dict
        .feature_types()
        .iter()
        .map(|(id, ft)| (id.to_string(), ft.to_string()))
        .collect();
    (symbols, types)
}

#[test]
fn snapshot_survives_restart() {
    let dir = tempfile::TempDir::new().unwrap();
    let records = var_table::read(VAR_TABLE.as_bytes(), "inline").unwrap();
    let original = GeneDictionary::from_records(Organism::HomoSapiens, "latest", records).unwrap();

    // First session: import and persist.
    {
        let registry = DictionaryRegistry::new(dir.path(), "latest");
        registry
            .import(Organism::HomoSapiens, original.records().to_vec())
            .unwrap();
    }

    // Second session: a fresh registry reads the file back.
    {
        let registry = DictionaryRegistry::new(dir.path(), "latest");
        assert!(!registry.is_loaded(Organism::HomoSapiens));
        let snap = registry.load(Organism::HomoSapiens).unwrap();
        assert!(registry.is_loaded(Organism::HomoSapiens));
        assert_eq!(mappings(&snap), mappings(&original));
        assert_eq!(snap.ambiguous_symbols(), vec!["TBCE"]);
        assert_eq!(snap.lookup("linc00856").len(), 1);
    }
}

#[test]
fn round_trip_is_order_independent() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("snap.bin");

    let rows = vec![
        GeneRecord::new("ENSG00000000003", "FOO", "protein_coding"),
        GeneRecord::new("ENSG00000141510", "TP53", "protein_coding"),
        GeneRecord::new("ENSG00000000004", "FOO", "protein_coding"),
    ];
    let mut reversed = rows.clone();
    reversed.reverse();

    let a = GeneDictionary::from_records(Organism::HomoSapiens, "latest", rows).unwrap();
    let b = GeneDictionary::from_records(Organism::HomoSapiens, "latest", reversed).unwrap();

    snapshot::save(&path, &a).unwrap();
    let reloaded = snapshot::load(&path, Organism::HomoSapiens).unwrap();
    assert_eq!(mappings(&reloaded), mappings(&a));
    assert_eq!(mappings(&reloaded), mappings(&b));
    // Candidate order itself is preserved exactly.
    assert_eq!(reloaded.lookup("FOO"), a.lookup("FOO"));
}

#[test]
fn census_versions_get_separate_snapshots() {
    let dir = tempfile::TempDir::new().unwrap();
    let old = DictionaryRegistry::new(dir.path(), "2024-07-01");
    let new = DictionaryRegistry::new(dir.path(), "2025-01-30");
    assert_ne!(
        old.snapshot_path(Organism::HomoSapiens),
        new.snapshot_path(Organism::HomoSapiens)
    );

    old.import(
        Organism::HomoSapiens,
        [GeneRecord::new("ENSG00000141510", "TP53", "protein_coding")],
    )
    .unwrap();
    assert!(new.load(Organism::HomoSapiens).is_err());
}

#[test]
fn config_driven_refresh_from_var_table_dir() {
    let dir = tempfile::TempDir::new().unwrap();
    let tables = dir.path().join("tables");
    std::fs::create_dir_all(&tables).unwrap();
    std::fs::write(tables.join("homo_sapiens.tsv"), VAR_TABLE).unwrap();

    let config = ResolverConfig {
        var_table_dir: Some(tables),
        ..Default::default()
    };
    let cache_dir = dir.path().join("cache");
    let registry = Arc::new(config.registry(cache_dir.clone()));
    let resolver = config.resolver(Arc::clone(&registry));

    // No snapshot yet: the first resolution fetches from the table and persists.
    let results = resolver.resolve(&["tbce"], Organism::HomoSapiens).unwrap();
    assert_eq!(results[0].status, ResolutionStatus::AutoResolved);
    assert!(registry.snapshot_path(Organism::HomoSapiens).exists());

    // A registry without any source can now serve from the snapshot alone.
    let offline = DictionaryRegistry::new(cache_dir, "latest");
    assert_eq!(offline.load(Organism::HomoSapiens).unwrap().len(), 5);
}
