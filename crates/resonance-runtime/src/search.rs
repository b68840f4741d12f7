//! Resonance search: one input's RANKING → TESTING → {ACCEPTED, EXHAUSTED} cycle.
//!
//! # How It Works
//!
//! 1. **Ranking**: score every category not yet rejected for this input and
//!    sort by activation (descending), breaking ties by smaller index.
//!    Scoring is pure, so it may fan out across the rayon pool.
//! 2. **Testing**: walk the ranking. The first candidate whose match score
//!    meets the effective vigilance resonates. Every candidate that fails is
//!    *reset* into the rejected set.
//! 3. **Exhausted**: nothing resonated. Below the category ceiling the
//!    input founds a new category; at the ceiling it is routed to the
//!    best-matching category and flagged as degraded.
//!
//! Searching never writes. It yields a [`Proposal`] that the caller commits
//! against the exact snapshot it was computed from.

use crate::config::EngineParams;
use crate::store::{CategoryStore, CommitOutcome, StoreSnapshot};
use rayon::prelude::*;
use resonance_core::error::{ResonanceError, Result};
use resonance_core::pattern::Pattern;
use resonance_core::strategy::{Geometry, SimilarityStrategy, UpdateStrategy};
use resonance_core::types::{rank_order, Category, CategoryIndex, Scores, Vigilance};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::trace;

/// Shared flag for abandoning a search before it commits.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub(crate) fn check(token: Option<&CancelToken>) -> Result<()> {
        match token {
            Some(t) if t.is_cancelled() => Err(ResonanceError::Cancelled),
            _ => Ok(()),
        }
    }
}

/// Where a search currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SearchPhase {
    Ranking,
    Testing,
    Accepted,
    Exhausted,
}

/// A scored category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Candidate {
    pub index: CategoryIndex,
    pub scores: Scores,
}

/// Transient per-input record.
#[derive(Debug, Clone)]
pub struct SearchState {
    vigilance: f64,
    rejected: BTreeSet<CategoryIndex>,
    resets: usize,
    phase: SearchPhase,
}

impl SearchState {
    pub fn new(vigilance: Vigilance) -> Self {
        Self {
            vigilance: vigilance.value(),
            rejected: BTreeSet::new(),
            resets: 0,
            phase: SearchPhase::Ranking,
        }
    }

    /// Vigilance in force for this input. May exceed 1.0 under match tracking.
    pub fn effective_vigilance(&self) -> f64 {
        self.vigilance
    }

    /// Raise the effective vigilance. Never lowers it.
    pub fn raise_vigilance(&mut self, to: f64) {
        if to > self.vigilance {
            self.vigilance = to;
        }
    }

    /// Reset a candidate. Returns false if it was already rejected.
    pub fn reject(&mut self, index: CategoryIndex) -> bool {
        let inserted = self.rejected.insert(index);
        if inserted {
            self.resets += 1;
        }
        inserted
    }

    pub fn is_rejected(&self, index: CategoryIndex) -> bool {
        self.rejected.contains(&index)
    }

    pub fn rejected(&self) -> impl Iterator<Item = &CategoryIndex> {
        self.rejected.iter()
    }

    pub fn resets(&self) -> usize {
        self.resets
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }
}

/// What a search wants committed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Proposal {
    /// An existing category passed vigilance.
    Resonance(Candidate),
    /// Nothing passed and there is room for a new category.
    NewCategory,
    /// Nothing passed and the store is full: best match, vigilance not applied.
    Degraded(Candidate),
}

/// The search-and-commit core shared by every geometry.
pub struct ResonanceSearch<S, U> {
    geometry: Geometry<S, U>,
    params: EngineParams,
}

impl<S, U> ResonanceSearch<S, U>
where
    S: SimilarityStrategy,
    U: UpdateStrategy<Weight = S::Weight>,
{
    pub fn new(geometry: Geometry<S, U>, params: EngineParams) -> Self {
        Self { geometry, params }
    }

    pub fn geometry(&self) -> &Geometry<S, U> {
        &self.geometry
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    fn score(&self, pattern: &Pattern, category: &Category<S::Weight>) -> Candidate {
        Candidate {
            index: category.index,
            scores: self
                .geometry
                .similarity
                .score(pattern, &category.weight, self.params.choice),
        }
    }

    /// RANKING: score and order every category not in `state`'s rejected set.
    pub fn rank(
        &self,
        snapshot: &StoreSnapshot<S::Weight>,
        pattern: &Pattern,
        state: &SearchState,
    ) -> Vec<Candidate> {
        let categories = snapshot.categories();
        let mut ranked: Vec<Candidate> = if self.params.parallelism.is_parallel_for(categories.len()) {
            categories
                .par_iter()
                .filter(|c| !state.is_rejected(c.index))
                .map(|c| self.score(pattern, c))
                .collect()
        } else {
            categories
                .iter()
                .filter(|c| !state.is_rejected(c.index))
                .map(|c| self.score(pattern, c))
                .collect()
        };
        ranked.sort_by(|a, b| {
            rank_order(
                (a.scores.activation, a.index),
                (b.scores.activation, b.index),
            )
        });
        ranked
    }

    /// The highest match score among categories `allowed` admits.
    ///
    /// Ties go to the smaller index.
    pub fn best_match<F>(
        &self,
        snapshot: &StoreSnapshot<S::Weight>,
        pattern: &Pattern,
        allowed: F,
    ) -> Option<Candidate>
    where
        F: Fn(CategoryIndex) -> bool,
    {
        snapshot
            .categories()
            .iter()
            .filter(|c| allowed(c.index))
            .map(|c| self.score(pattern, c))
            .fold(None, |best: Option<Candidate>, c| match best {
                Some(b) if b.scores.matching.0 >= c.scores.matching.0 => Some(b),
                _ => Some(c),
            })
    }

    /// Run RANKING and TESTING against `snapshot` without writing anything.
    pub fn propose(
        &self,
        snapshot: &StoreSnapshot<S::Weight>,
        pattern: &Pattern,
        state: &mut SearchState,
        cancel: Option<&CancelToken>,
    ) -> Result<Proposal> {
        state.phase = SearchPhase::Ranking;
        let ranked = self.rank(snapshot, pattern, state);
        CancelToken::check(cancel)?;

        state.phase = SearchPhase::Testing;
        for candidate in ranked {
            if candidate.scores.matching.passes(state.vigilance) {
                state.phase = SearchPhase::Accepted;
                return Ok(Proposal::Resonance(candidate));
            }
            state.reject(candidate.index);
            trace!(
                "Reset {}: match {:.4} < vigilance {:.4}",
                candidate.index,
                candidate.scores.matching.0,
                state.vigilance
            );
            CancelToken::check(cancel)?;
        }

        state.phase = SearchPhase::Exhausted;
        if snapshot.len() < self.params.max_categories {
            return Ok(Proposal::NewCategory);
        }
        self.best_match(snapshot, pattern, |_| true)
            .map(Proposal::Degraded)
            .ok_or(ResonanceError::CapacityExceeded {
                limit: self.params.max_categories,
            })
    }

    /// Commit a proposal computed from the snapshot at `generation`.
    ///
    /// Accepted and degraded proposals update with the configured learning
    /// rate; new categories always use fast learning.
    pub fn commit(
        &self,
        store: &CategoryStore<S::Weight>,
        generation: u64,
        pattern: &Pattern,
        proposal: &Proposal,
    ) -> Result<CommitOutcome> {
        match proposal {
            Proposal::Resonance(candidate) | Proposal::Degraded(candidate) => {
                let rate = self.params.learning_rate;
                store.commit_update(generation, candidate.index, |w| {
                    self.geometry.update.update(w, pattern, rate)
                })
            }
            Proposal::NewCategory => {
                store.commit_create(generation, self.geometry.update.commit_new(pattern))
            }
        }
    }
}
