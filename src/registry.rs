//! Dictionary registry: per-organism snapshot cache with lazy loading.
//!
//! The [`DictionaryRegistry`] owns every loaded [`GeneDictionary`] for the
//! process lifetime. Each organism has its own slot behind a mutex, so the
//! first concurrent callers for an organism wait on one load instead of each
//! reading the snapshot file; other organisms are unaffected.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, TryLockError};

use dashmap::DashMap;

use crate::dictionary::GeneDictionary;
use crate::error::{DictionaryError, GeneError, GeneResult, SnapshotError};
use crate::gene::{GeneRecord, Organism};
use crate::source::DictionarySource;
use crate::store::{self, snapshot};

/// Shared handle to a loaded dictionary.
///
/// The generation changes every time a snapshot is installed for an
/// organism, so anything derived from an older snapshot can be told apart.
#[derive(Debug, Clone)]
pub struct Snapshot {
    generation: u64,
    dict: Arc<GeneDictionary>,
}

impl Snapshot {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn dictionary(&self) -> &GeneDictionary {
        &self.dict
    }
}

impl std::ops::Deref for Snapshot {
    type Target = GeneDictionary;

    fn deref(&self) -> &GeneDictionary {
        &self.dict
    }
}

type Slot = Arc<Mutex<Option<Snapshot>>>;

/// Per-organism snapshot cache backed by snapshot files in `cache_dir`.
pub struct DictionaryRegistry {
    cache_dir: PathBuf,
    census_version: String,
    source: Option<Arc<dyn DictionarySource>>,
    slots: DashMap<Organism, Slot>,
    next_generation: AtomicU64,
}

impl DictionaryRegistry {
    /// Registry that only reads persisted snapshots.
    pub fn new(cache_dir: impl Into<PathBuf>, census_version: impl Into<String>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            census_version: census_version.into(),
            source: None,
            slots: DashMap::new(),
            next_generation: AtomicU64::new(1),
        }
    }

    /// Attach a refresh source used when no usable snapshot exists.
    pub fn with_source(mut self, source: Arc<dyn DictionarySource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Return the cached snapshot, loading (or fetching) it on first use.
    pub fn load(&self, organism: Organism) -> GeneResult<Snapshot> {
        let slot = self.slot(organism);
        let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(snap) = guard.as_ref() {
            return Ok(snap.clone());
        }

        let dict = self.load_or_fetch(organism)?;
        let snap = self.next_snapshot(dict);
        *guard = Some(snap.clone());
        Ok(snap)
    }

    /// Refetch from the source, persist, and replace the cached snapshot.
    pub fn refresh(&self, organism: Organism) -> GeneResult<Snapshot> {
        let slot = self.slot(organism);
        let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        let dict = self.fetch_and_persist(organism)?;
        let snap = self.next_snapshot(dict);
        *guard = Some(snap.clone());
        Ok(snap)
    }

    /// Build a dictionary from rows, persist it, and make it current.
    pub fn import(
        &self,
        organism: Organism,
        records: impl IntoIterator<Item = GeneRecord>,
    ) -> GeneResult<Snapshot> {
        let dict = GeneDictionary::from_records(organism, self.census_version.clone(), records)?;
        snapshot::save(&self.snapshot_path(organism), &dict)?;
        Ok(self.insert(dict))
    }

    /// Install an in-memory dictionary without touching disk.
    pub fn insert(&self, dict: GeneDictionary) -> Snapshot {
        let slot = self.slot(dict.organism());
        let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        let snap = self.next_snapshot(dict);
        *guard = Some(snap.clone());
        snap
    }

    /// Whether a snapshot is installed. Never waits: an organism whose first
    /// load is still running reports `false`.
    pub fn is_loaded(&self, organism: Organism) -> bool {
        let Some(slot) = self.slots.get(&organism).map(|s| Arc::clone(s.value())) else {
            return false;
        };
        match slot.try_lock() {
            Ok(guard) => guard.is_some(),
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner().is_some(),
            Err(TryLockError::WouldBlock) => false,
        }
    }

    pub fn snapshot_path(&self, organism: Organism) -> PathBuf {
        store::snapshot_path(&self.cache_dir, &self.census_version, organism)
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn census_version(&self) -> &str {
        &self.census_version
    }

    fn slot(&self, organism: Organism) -> Slot {
        Arc::clone(&self.slots.entry(organism).or_default())
    }

    fn next_snapshot(&self, dict: GeneDictionary) -> Snapshot {
        Snapshot {
            generation: self.next_generation.fetch_add(1, Ordering::Relaxed),
            dict: Arc::new(dict),
        }
    }

    /// Snapshot from disk, else a rebuild from the source.
    ///
    /// When there is no usable snapshot and no rebuild is possible (no
    /// source, or the source fails) the organism is `Unavailable`. A bad
    /// snapshot with no source to replace it keeps its own error.
    fn load_or_fetch(&self, organism: Organism) -> GeneResult<GeneDictionary> {
        let path = self.snapshot_path(organism);
        let unavailable = |reason: String| DictionaryError::Unavailable {
            organism: organism.to_string(),
            path: path.display().to_string(),
            reason,
        };

        match snapshot::load(&path, organism) {
            Ok(dict) => return Ok(dict),
            Err(SnapshotError::Missing { .. }) if self.source.is_none() => {
                return Err(unavailable("no refresh source configured".into()).into());
            }
            Err(SnapshotError::Missing { .. }) => {}
            Err(
                e @ (SnapshotError::Corrupt { .. }
                | SnapshotError::SchemaMismatch { .. }
                | SnapshotError::OrganismMismatch { .. }),
            ) => {
                if self.source.is_none() {
                    return Err(e.into());
                }
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "unusable gene dictionary snapshot, refetching"
                );
            }
            Err(e) => return Err(e.into()),
        }

        match self.fetch_and_persist(organism) {
            Err(GeneError::Dictionary(e)) => {
                tracing::warn!(%organism, error = %e, "gene dictionary rebuild failed");
                Err(unavailable(e.to_string()).into())
            }
            other => other,
        }
    }

    fn fetch_and_persist(&self, organism: Organism) -> GeneResult<GeneDictionary> {
        let source = self.source.as_ref().ok_or_else(|| DictionaryError::NoSource {
            organism: organism.to_string(),
        })?;

        let records = source.fetch(organism, &self.census_version)?;
        if records.is_empty() {
            return Err(DictionaryError::Source {
                organism: organism.to_string(),
                message: "source returned no genes".into(),
            }
            .into());
        }

        let dict = GeneDictionary::from_records(organism, self.census_version.clone(), records)?;
        snapshot::save(&self.snapshot_path(organism), &dict)?;
        Ok(dict)
    }
}

impl std::fmt::Debug for DictionaryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DictionaryRegistry")
            .field("cache_dir", &self.cache_dir)
            .field("census_version", &self.census_version)
            .field("has_source", &self.source.is_some())
            .field("organisms", &self.slots.len())
            .finish()
    }
}
