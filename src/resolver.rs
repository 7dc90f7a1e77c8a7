//! Gene token resolution and feature-type disambiguation.
//!
//! [`resolve_tokens`] is the pure core: given a loaded dictionary it
//! classifies each token as one of the [`ResolutionStatus`] outcomes.
//! [`Resolver`] wraps it with snapshot loading from a
//! [`DictionaryRegistry`] and a bounded LRU cache of whole-batch results.

use std::collections::BTreeSet;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};

use lru::LruCache;
use serde::{Deserialize, Serialize};

use crate::dictionary::GeneDictionary;
use crate::error::{GeneResult, ResolveError};
use crate::gene::{is_stable_id, FeatureType, Organism, StableId};
use crate::registry::DictionaryRegistry;

/// Default number of cached batch results.
pub const DEFAULT_CACHE_CAPACITY: usize = 128;

/// Rule for choosing one identifier when a symbol has several.
///
/// With a preferred feature type, a symbol whose candidates contain exactly
/// one identifier of that type resolves to it. Anything else stays ambiguous.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisambiguationPolicy {
    preferred: Option<FeatureType>,
}

impl DisambiguationPolicy {
    pub fn prefer(feature_type: impl Into<FeatureType>) -> Self {
        Self {
            preferred: Some(feature_type.into()),
        }
    }

    /// Never auto-resolve; every multi-candidate symbol is ambiguous.
    pub fn disabled() -> Self {
        Self { preferred: None }
    }

    pub fn preferred(&self) -> Option<&FeatureType> {
        self.preferred.as_ref()
    }
}

impl Default for DisambiguationPolicy {
    fn default() -> Self {
        Self::prefer(FeatureType::protein_coding())
    }
}

/// Outcome class of a single token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStatus {
    /// Token was already a stable identifier; no lookup was done.
    Passthrough,
    /// Symbol maps to exactly one identifier.
    Unambiguous,
    /// Several identifiers; the policy picked the single preferred one.
    AutoResolved,
    /// Several identifiers and no unique preferred one. Needs a human.
    Ambiguous,
    /// Symbol is not in the dictionary.
    NotFound,
}

impl std::fmt::Display for ResolutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ResolutionStatus::Passthrough => "passthrough",
            ResolutionStatus::Unambiguous => "unambiguous",
            ResolutionStatus::AutoResolved => "auto-resolved",
            ResolutionStatus::Ambiguous => "ambiguous",
            ResolutionStatus::NotFound => "not found",
        };
        f.write_str(s)
    }
}

/// One identifier a symbol could refer to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: StableId,
    pub feature_type: FeatureType,
}

/// Resolution of one input token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionResult {
    /// The token as given, trimmed.
    pub query: String,
    pub status: ResolutionStatus,
    /// Every identifier the symbol maps to, in dictionary order.
    pub candidates: Vec<Candidate>,
    /// Identifiers selected for this token. For ambiguous tokens this is the
    /// full candidate list; use [`accepted_ids`] to skip them.
    pub accepted: Vec<StableId>,
    /// Published symbol of the (first) accepted identifier.
    pub canonical_name: Option<String>,
}

impl ResolutionResult {
    /// A token that already is a stable identifier. The accepted ID is
    /// uppercased: the pattern matches case-insensitively but `feature_id`
    /// values are compared exactly downstream.
    fn passthrough(query: String) -> Self {
        Self {
            accepted: vec![StableId::new(query.to_uppercase())],
            query,
            status: ResolutionStatus::Passthrough,
            candidates: Vec::new(),
            canonical_name: None,
        }
    }

    pub fn is_ambiguous(&self) -> bool {
        self.status == ResolutionStatus::Ambiguous
    }

    pub fn is_not_found(&self) -> bool {
        self.status == ResolutionStatus::NotFound
    }

    /// Distinct feature types among the candidates, in candidate order.
    pub fn competing_feature_types(&self) -> Vec<&FeatureType> {
        let mut seen = Vec::new();
        for c in &self.candidates {
            if !seen.contains(&&c.feature_type) {
                seen.push(&c.feature_type);
            }
        }
        seen
    }

    /// Candidates that were not accepted (what auto-resolution skipped).
    pub fn skipped(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates
            .iter()
            .filter(|c| !self.accepted.contains(&c.id))
    }
}

/// Resolve tokens against a dictionary. Order of results matches `tokens`.
pub fn resolve_tokens<S: AsRef<str>>(
    dict: &GeneDictionary,
    tokens: &[S],
    policy: &DisambiguationPolicy,
) -> Vec<ResolutionResult> {
    tokens
        .iter()
        .map(|t| resolve_token(dict, t.as_ref(), policy))
        .collect()
}

fn resolve_token(
    dict: &GeneDictionary,
    token: &str,
    policy: &DisambiguationPolicy,
) -> ResolutionResult {
    let query = token.trim().to_string();
    if is_stable_id(&query) {
        return ResolutionResult::passthrough(query);
    }

    let candidates: Vec<Candidate> = dict
        .lookup(&query)
        .iter()
        .filter_map(|id| {
            dict.feature_type(id).map(|ft| Candidate {
                id: id.clone(),
                feature_type: ft.clone(),
            })
        })
        .collect();

    let (status, accepted) = match candidates.as_slice() {
        [] => (ResolutionStatus::NotFound, Vec::new()),
        [only] => (ResolutionStatus::Unambiguous, vec![only.id.clone()]),
        many => {
            let preferred: Vec<&Candidate> = match policy.preferred() {
                Some(ft) => many.iter().filter(|c| &c.feature_type == ft).collect(),
                None => Vec::new(),
            };
            match preferred.as_slice() {
                [pick] => (ResolutionStatus::AutoResolved, vec![pick.id.clone()]),
                _ => (
                    ResolutionStatus::Ambiguous,
                    many.iter().map(|c| c.id.clone()).collect(),
                ),
            }
        }
    };

    let canonical_name = accepted
        .first()
        .and_then(|id| dict.canonical_name(id))
        .map(str::to_string);

    ResolutionResult {
        query,
        status,
        candidates,
        accepted,
        canonical_name,
    }
}

/// Accepted identifiers of every non-ambiguous result, sorted and
/// de-duplicated. Ambiguous tokens contribute nothing until the caller
/// picks an identifier for them.
pub fn accepted_ids(results: &[ResolutionResult]) -> Vec<StableId> {
    results
        .iter()
        .filter(|r| !r.is_ambiguous())
        .flat_map(|r| r.accepted.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Per-status tally of a batch, for reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionSummary {
    pub passthrough: usize,
    pub unambiguous: usize,
    pub auto_resolved: usize,
    pub ambiguous: Vec<String>,
    pub not_found: Vec<String>,
}

impl ResolutionSummary {
    pub fn from_results(results: &[ResolutionResult]) -> Self {
        let mut summary = Self::default();
        for r in results {
            match r.status {
                ResolutionStatus::Passthrough => summary.passthrough += 1,
                ResolutionStatus::Unambiguous => summary.unambiguous += 1,
                ResolutionStatus::AutoResolved => summary.auto_resolved += 1,
                ResolutionStatus::Ambiguous => summary.ambiguous.push(r.query.clone()),
                ResolutionStatus::NotFound => summary.not_found.push(r.query.clone()),
            }
        }
        summary
    }

    /// Whether every token resolved without needing a decision.
    pub fn is_clean(&self) -> bool {
        self.ambiguous.is_empty() && self.not_found.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    organism: Organism,
    generation: u64,
    policy: DisambiguationPolicy,
    queries: Vec<String>,
}

/// Resolves gene tokens against registry-managed snapshots.
pub struct Resolver {
    registry: Arc<DictionaryRegistry>,
    policy: DisambiguationPolicy,
    /// `None` when caching is disabled (capacity 0).
    cache: Option<Mutex<LruCache<CacheKey, Vec<ResolutionResult>>>>,
}

impl Resolver {
    pub fn new(registry: Arc<DictionaryRegistry>) -> Self {
        Self {
            registry,
            policy: DisambiguationPolicy::default(),
            cache: NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).map(|n| Mutex::new(LruCache::new(n))),
        }
    }

    pub fn with_policy(mut self, policy: DisambiguationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Bound the result cache; 0 disables it.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache = NonZeroUsize::new(capacity).map(|n| Mutex::new(LruCache::new(n)));
        self
    }

    /// Resolve with the configured policy.
    pub fn resolve<S: AsRef<str>>(
        &self,
        tokens: &[S],
        organism: Organism,
    ) -> GeneResult<Vec<ResolutionResult>> {
        self.resolve_with_policy(tokens, organism, &self.policy)
    }

    /// Resolve with an explicit policy for this call.
    ///
    /// Fails only if `tokens` is empty or the organism's dictionary cannot be
    /// loaded; unknown and ambiguous symbols are reported in the results.
    pub fn resolve_with_policy<S: AsRef<str>>(
        &self,
        tokens: &[S],
        organism: Organism,
        policy: &DisambiguationPolicy,
    ) -> GeneResult<Vec<ResolutionResult>> {
        if tokens.is_empty() {
            return Err(ResolveError::EmptyQuery.into());
        }

        let queries: Vec<String> = tokens.iter().map(|t| t.as_ref().trim().to_string()).collect();
        if queries.iter().all(|q| is_stable_id(q)) {
            return Ok(queries.into_iter().map(ResolutionResult::passthrough).collect());
        }

        let snap = self.registry.load(organism)?;
        let key = CacheKey {
            organism,
            generation: snap.generation(),
            policy: policy.clone(),
            queries,
        };

        if let Some(cache) = &self.cache {
            let mut cache = cache.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(hit) = cache.get(&key) {
                tracing::debug!(%organism, tokens = key.queries.len(), "resolution cache hit");
                return Ok(hit.clone());
            }
        }

        let results = resolve_tokens(&snap, &key.queries, policy);
        for r in results.iter().filter(|r| r.is_ambiguous()) {
            tracing::warn!(
                query = %r.query,
                candidates = r.candidates.len(),
                "ambiguous gene symbol"
            );
        }

        if let Some(cache) = &self.cache {
            cache
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .put(key, results.clone());
        }
        Ok(results)
    }

    pub fn policy(&self) -> &DisambiguationPolicy {
        &self.policy
    }

    pub fn registry(&self) -> &DictionaryRegistry {
        &self.registry
    }

    /// Number of cached batch results.
    pub fn cached_batches(&self) -> usize {
        self.cache.as_ref().map_or(0, |c| {
            c.lock().unwrap_or_else(PoisonError::into_inner).len()
        })
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("registry", &self.registry)
            .field("policy", &self.policy)
            .field("cached_batches", &self.cached_batches())
            .finish()
    }
}
