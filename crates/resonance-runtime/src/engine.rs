//! ArtEngine: the unsupervised learner.
//!
//! Wraps one [`ResonanceSearch`] and one [`CategoryStore`]. Each `learn`
//! call snapshots the store, searches without holding a lock, and commits
//! against the generation it searched. A commit that loses a race is
//! discarded and the input is searched again from a fresh snapshot.
//!
//! # Example
//!
//! ```rust
//! use resonance_runtime::prelude::*;
//! use resonance_geometry::fuzzy;
//! use resonance_core::prelude::*;
//!
//! let config = EngineConfig::default().with_vigilance(0.7);
//! let engine = ArtEngine::new(fuzzy(), &config, 4).unwrap();
//!
//! let a = engine.learn(&Pattern::new(vec![1.0, 0.0, 0.0, 1.0]).unwrap()).unwrap();
//! let b = engine.learn(&Pattern::new(vec![0.0, 1.0, 1.0, 0.0]).unwrap()).unwrap();
//! assert_ne!(a.category, b.category);
//! ```

use crate::config::{EngineConfig, EngineParams};
use crate::metrics::{EngineMetrics, EngineStats};
use crate::search::{CancelToken, Proposal, ResonanceSearch, SearchState};
use crate::store::{CategoryStore, CommitOutcome, Committed};
use resonance_core::error::{ResonanceError, Result};
use resonance_core::pattern::Pattern;
use resonance_core::strategy::{Geometry, SimilarityStrategy, UpdateStrategy};
use resonance_core::types::{Category, CategoryIndex, CategoryRecord, Vigilance};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Result of presenting one input to [`ArtEngine::learn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnOutcome {
    pub category: CategoryIndex,
    /// An existing category passed vigilance and absorbed the input.
    pub resonated: bool,
    /// Samples held by `category` after this commit.
    pub sample_count: u64,
    /// The store was full and the input went to its best match unvetted.
    pub degraded: bool,
    /// Candidates reset during the search that committed.
    pub resets: usize,
    /// Logical sequence number of this commit.
    pub sequence: u64,
}

impl LearnOutcome {
    /// Whether this input founded a new category.
    pub fn created(&self) -> bool {
        !self.resonated && !self.degraded
    }
}

/// Read-only answer from [`ArtEngine::predict`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub category: CategoryIndex,
    pub activation: f64,
    pub matching: f64,
    /// False when no category passed vigilance and this is only the top-ranked one.
    pub passes_vigilance: bool,
}

/// An adaptive resonance engine over one geometry.
pub struct ArtEngine<S: SimilarityStrategy, U> {
    search: ResonanceSearch<S, U>,
    store: CategoryStore<S::Weight>,
    dimension: usize,
    metrics: EngineMetrics,
}

impl<S, U> ArtEngine<S, U>
where
    S: SimilarityStrategy,
    U: UpdateStrategy<Weight = S::Weight>,
{
    /// Build an engine accepting patterns of exactly `dimension` components.
    pub fn new(geometry: Geometry<S, U>, config: &EngineConfig, dimension: usize) -> Result<Self> {
        let params = config.validate()?;
        if dimension == 0 {
            return Err(ResonanceError::invalid_config(
                "dimension",
                dimension,
                "must be at least 1",
            ));
        }
        debug!(
            "Engine created: geometry={} dimension={} vigilance={} max_categories={}",
            geometry.similarity.name(),
            dimension,
            params.vigilance.value(),
            params.max_categories
        );
        Ok(Self {
            search: ResonanceSearch::new(geometry, params),
            store: CategoryStore::new(params.max_categories),
            dimension,
            metrics: EngineMetrics::new(),
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn params(&self) -> &EngineParams {
        self.search.params()
    }

    pub fn vigilance(&self) -> Vigilance {
        self.params().vigilance
    }

    pub fn search(&self) -> &ResonanceSearch<S, U> {
        &self.search
    }

    pub fn store(&self) -> &CategoryStore<S::Weight> {
        &self.store
    }

    pub(crate) fn metrics(&self) -> &EngineMetrics {
        &self.metrics
    }

    /// Build a pattern from raw values under this engine's non-finite policy
    /// and check its dimension.
    pub fn pattern(&self, values: Vec<f64>) -> Result<Pattern> {
        let pattern = Pattern::with_policy(values, self.params().non_finite)?;
        self.check_dimension(&pattern)?;
        Ok(pattern)
    }

    pub fn check_dimension(&self, pattern: &Pattern) -> Result<()> {
        if pattern.dimension() != self.dimension {
            return Err(ResonanceError::dimension_mismatch(
                self.dimension,
                pattern.dimension(),
            ));
        }
        Ok(())
    }

    /// Present one input: resonate with an existing category or found a new one.
    pub fn learn(&self, pattern: &Pattern) -> Result<LearnOutcome> {
        self.learn_inner(pattern, None)
    }

    /// Like [`learn`](Self::learn), but gives up with `Cancelled` if `cancel`
    /// fires before the commit starts.
    pub fn learn_cancellable(&self, pattern: &Pattern, cancel: &CancelToken) -> Result<LearnOutcome> {
        self.learn_inner(pattern, Some(cancel))
    }

    fn learn_inner(&self, pattern: &Pattern, cancel: Option<&CancelToken>) -> Result<LearnOutcome> {
        self.check_dimension(pattern)?;

        loop {
            let snapshot = self.store.snapshot()?;
            let mut state = SearchState::new(self.vigilance());
            let proposal = self
                .search
                .propose(&snapshot, pattern, &mut state, cancel)
                .and_then(|p| CancelToken::check(cancel).map(|_| p))
                .map_err(|e| self.note_cancel(e))?;

            // Past this point the commit runs to completion.
            match self.search.commit(&self.store, snapshot.generation(), pattern, &proposal)? {
                CommitOutcome::Committed(committed) => {
                    return Ok(self.record(&proposal, committed, state.resets()));
                }
                CommitOutcome::Stale => {
                    self.metrics.record_retry();
                    debug!("Commit lost race at generation {}, searching again", snapshot.generation());
                }
            }
        }
    }

    fn note_cancel(&self, err: ResonanceError) -> ResonanceError {
        if err == ResonanceError::Cancelled {
            self.metrics.record_cancelled();
        }
        err
    }

    /// Turn a successful commit into an outcome, updating counters and logs.
    pub(crate) fn record(&self, proposal: &Proposal, committed: Committed, resets: usize) -> LearnOutcome {
        let (resonated, degraded) = match proposal {
            Proposal::Resonance(_) => {
                self.metrics.record_resonance(resets);
                (true, false)
            }
            Proposal::NewCategory => {
                self.metrics.record_created(resets);
                debug!("New category {} at sequence {}", committed.index, committed.sequence);
                (false, false)
            }
            Proposal::Degraded(candidate) => {
                self.metrics.record_degraded(resets);
                warn!(
                    "Category ceiling {} reached: routed input to {} (match {:.4} below vigilance)",
                    self.params().max_categories,
                    candidate.index,
                    candidate.scores.matching.0
                );
                (false, true)
            }
        };
        LearnOutcome {
            category: committed.index,
            resonated,
            sample_count: committed.sample_count,
            degraded,
            resets,
            sequence: committed.sequence,
        }
    }

    /// Best category for `pattern` without learning anything.
    ///
    /// Returns the first ranked category that passes vigilance, otherwise the
    /// top-ranked one flagged `passes_vigilance: false`. `None` on an empty store.
    pub fn predict(&self, pattern: &Pattern) -> Result<Option<Prediction>> {
        self.check_dimension(pattern)?;
        let snapshot = self.store.snapshot()?;
        let ranked = self
            .search
            .rank(&snapshot, pattern, &SearchState::new(self.vigilance()));
        let vigilance = self.vigilance().value();

        let chosen = ranked
            .iter()
            .find(|c| c.scores.matching.passes(vigilance))
            .map(|c| (c, true))
            .or_else(|| ranked.first().map(|c| (c, false)));

        Ok(chosen.map(|(c, passes)| Prediction {
            category: c.index,
            activation: c.scores.activation.0,
            matching: c.scores.matching.0,
            passes_vigilance: passes,
        }))
    }

    /// Current state of one category.
    pub fn category(&self, index: CategoryIndex) -> Result<Category<S::Weight>> {
        self.store
            .snapshot()?
            .get(index)
            .cloned()
            .ok_or(ResonanceError::UnknownCategory(index))
    }

    pub fn len(&self) -> Result<usize> {
        self.store.len()
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Ordered category rows for an external persistence layer.
    pub fn export_categories(&self) -> Result<Vec<CategoryRecord<S::Weight>>> {
        self.store.export()
    }

    /// Restore rows produced by [`export_categories`](Self::export_categories).
    ///
    /// Every weight must have been built for this engine's dimension; a
    /// mismatch rejects the whole batch before the store is touched.
    pub fn import_categories(&self, records: Vec<CategoryRecord<S::Weight>>) -> Result<usize> {
        let update = &self.search.geometry().update;
        for record in &records {
            match update.weight_dimension(&record.weight) {
                Some(actual) if actual != self.dimension => {
                    return Err(ResonanceError::invalid_import(format!(
                        "category {} has weight dimension {}, expected {}",
                        record.index, actual, self.dimension
                    )));
                }
                _ => {}
            }
        }
        let imported = self.store.import(records)?;
        info!("Imported {} categories ({} total)", imported, self.store.len()?);
        Ok(imported)
    }

    pub fn stats(&self) -> Result<EngineStats> {
        Ok(self.metrics.snapshot(self.store.len()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resonance_core::pattern::NonFinitePolicy;
    use resonance_geometry::fuzzy;

    fn coded(x: &[f64]) -> Pattern {
        let mut v = x.to_vec();
        v.extend(x.iter().map(|a| 1.0 - a));
        Pattern::new(v).unwrap()
    }

    fn engine(vigilance: f64) -> ArtEngine<resonance_geometry::FuzzySimilarity, resonance_geometry::FuzzyUpdate> {
        ArtEngine::new(fuzzy(), &EngineConfig::default().with_vigilance(vigilance), 4).unwrap()
    }

    #[test]
    fn rejects_wrong_dimension_before_touching_store() {
        let e = engine(0.7);
        let err = e.learn(&Pattern::new(vec![0.5, 0.5]).unwrap()).unwrap_err();
        assert_eq!(err, ResonanceError::dimension_mismatch(4, 2));
        assert!(e.is_empty().unwrap());
    }

    #[test]
    fn invalid_config_fails_at_construction() {
        let bad = EngineConfig::default().with_vigilance(1.5);
        assert!(matches!(
            ArtEngine::new(fuzzy(), &bad, 4),
            Err(ResonanceError::InvalidConfiguration { .. })
        ));
        assert!(ArtEngine::new(fuzzy(), &EngineConfig::default(), 0).is_err());
    }

    #[test]
    fn first_input_creates_category_zero() {
        let e = engine(0.7);
        let out = e.learn(&coded(&[0.3, 0.6])).unwrap();
        assert_eq!(out.category, CategoryIndex(0));
        assert!(out.created());
        assert_eq!(out.sample_count, 1);
    }

    #[test]
    fn repeated_input_resonates() {
        let e = engine(0.7);
        e.learn(&coded(&[0.3, 0.6])).unwrap();
        let out = e.learn(&coded(&[0.3, 0.6])).unwrap();
        assert!(out.resonated);
        assert_eq!(out.sample_count, 2);
        assert_eq!(e.len().unwrap(), 1);
    }

    #[test]
    fn predict_never_mutates() {
        let e = engine(0.7);
        assert_eq!(e.predict(&coded(&[0.1, 0.1])).unwrap(), None);
        e.learn(&coded(&[0.1, 0.1])).unwrap();
        let before = e.export_categories().unwrap();
        let prediction = e.predict(&coded(&[0.9, 0.9])).unwrap().unwrap();
        assert_eq!(prediction.category, CategoryIndex(0));
        assert!(!prediction.passes_vigilance);
        assert_eq!(e.export_categories().unwrap(), before);
        assert_eq!(e.stats().unwrap().inputs, 1);
    }

    #[test]
    fn cancelled_learn_commits_nothing() {
        let e = engine(0.7);
        let token = CancelToken::new();
        token.cancel();
        assert_eq!(
            e.learn_cancellable(&coded(&[0.2, 0.2]), &token),
            Err(ResonanceError::Cancelled)
        );
        assert!(e.is_empty().unwrap());
        assert_eq!(e.stats().unwrap().cancelled, 1);
    }

    #[test]
    fn pattern_helper_applies_policy() {
        let config = EngineConfig::default().with_non_finite(NonFinitePolicy::Substitute(0.0));
        let e = ArtEngine::new(fuzzy(), &config, 2).unwrap();
        let p = e.pattern(vec![f64::NAN, 1.0]).unwrap();
        assert_eq!(p.values(), &[0.0, 1.0]);
        assert!(e.pattern(vec![1.0]).is_err());

        let strict = ArtEngine::new(fuzzy(), &EngineConfig::default(), 2).unwrap();
        assert!(matches!(
            strict.pattern(vec![f64::INFINITY, 1.0]),
            Err(ResonanceError::InvalidInput { position: 0, .. })
        ));
    }

    #[test]
    fn unknown_category_lookup_fails() {
        let e = engine(0.7);
        assert_eq!(
            e.category(CategoryIndex(3)).unwrap_err(),
            ResonanceError::UnknownCategory(CategoryIndex(3))
        );
    }
}
