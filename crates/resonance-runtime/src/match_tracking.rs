//! Match tracking: supervised conflict resolution over two engines.
//!
//! The controller owns an input-side engine ("A"), a label-side engine ("B")
//! and a write-once map from A categories to B categories. When A proposes a
//! category already bound to a different label, the association is left
//! alone: vigilance for this input is raised just past that category's match
//! score, the category is reset, and A searches again. Every retry rejects at
//! least one more category, so the loop ends in a clean resonance or a new
//! category within `categories + 1` iterations.

use crate::config::SupervisedConfig;
use crate::engine::{ArtEngine, LearnOutcome};
use crate::metrics::EngineStats;
use crate::search::{Proposal, SearchState};
use crate::store::{CommitOutcome, StoreSnapshot};
use resonance_core::error::{ResonanceError, Result};
use resonance_core::pattern::Pattern;
use resonance_core::strategy::{Geometry, SimilarityStrategy, UpdateStrategy};
use resonance_core::types::CategoryIndex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::{debug, trace, warn};

/// One A → B binding, as exported for persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationRecord {
    pub category: CategoryIndex,
    pub label: CategoryIndex,
}

/// Write-once map from input categories to label categories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssociationMap {
    entries: BTreeMap<CategoryIndex, CategoryIndex>,
}

impl AssociationMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, category: CategoryIndex) -> Option<CategoryIndex> {
        self.entries.get(&category).copied()
    }

    /// Bind `category` to `label`. Rebinding to the same label is a no-op;
    /// rebinding to a different one is an `AssociationConflict`.
    pub fn insert_once(&mut self, category: CategoryIndex, label: CategoryIndex) -> Result<()> {
        match self.entries.get(&category) {
            Some(&existing) if existing != label => Err(ResonanceError::AssociationConflict {
                category,
                existing,
                attempted: label,
            }),
            Some(_) => Ok(()),
            None => {
                self.entries.insert(category, label);
                Ok(())
            }
        }
    }

    /// Whether `category` may carry `label` without a rewrite.
    pub fn admits(&self, category: CategoryIndex, label: CategoryIndex) -> bool {
        self.get(category).map_or(true, |existing| existing == label)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn records(&self) -> Vec<AssociationRecord> {
        self.entries
            .iter()
            .map(|(&category, &label)| AssociationRecord { category, label })
            .collect()
    }
}

/// Result of one supervised presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupervisedOutcome {
    /// The A category that absorbed the input; `None` when a full store had
    /// no category able to carry the label.
    pub category: Option<CategoryIndex>,
    /// The B category for the label; `None` when the label side was left
    /// untouched.
    pub label: Option<CategoryIndex>,
    /// Conflicting candidates skipped by raising vigilance.
    pub conflicts_resolved: usize,
    /// Either side was full and routed its input to an unvetted best match.
    pub degraded: bool,
    /// B was full and the label went to the best-matching existing label,
    /// so `label` may stand for a different class.
    pub label_degraded: bool,
    /// An existing A category passed vigilance.
    pub resonated: bool,
}

impl SupervisedOutcome {
    /// Whether the A side was written.
    pub fn committed(&self) -> bool {
        self.category.is_some()
    }
}

/// Read-only supervised answer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelPrediction {
    pub category: CategoryIndex,
    /// Label category bound to `category`, if any.
    pub label: Option<CategoryIndex>,
    pub activation: f64,
    pub matching: f64,
    pub passes_vigilance: bool,
}

/// An input-side proposal and the snapshot it was computed against.
/// `proposal` is `None` when a full store has no category able to carry the label.
struct InputPlan<W> {
    snapshot: StoreSnapshot<W>,
    proposal: Option<Proposal>,
    resets: usize,
    conflicts: usize,
}

/// Counters for both sides plus the association map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupervisedStats {
    pub input: EngineStats,
    pub label: EngineStats,
    pub associations: usize,
    pub conflicts_resolved: u64,
    /// Degraded presentations that found no label-compatible category.
    pub uncommitted: u64,
}

/// Drives an input engine and a label engine under match tracking.
pub struct MatchTrackingController<SA, UA, SB, UB>
where
    SA: SimilarityStrategy,
    SB: SimilarityStrategy,
{
    input: ArtEngine<SA, UA>,
    label: ArtEngine<SB, UB>,
    associations: Mutex<AssociationMap>,
    epsilon: f64,
    conflicts: AtomicU64,
    uncommitted: AtomicU64,
}

impl<SA, UA, SB, UB> MatchTrackingController<SA, UA, SB, UB>
where
    SA: SimilarityStrategy,
    UA: UpdateStrategy<Weight = SA::Weight>,
    SB: SimilarityStrategy,
    UB: UpdateStrategy<Weight = SB::Weight>,
{
    pub fn new(
        input_geometry: Geometry<SA, UA>,
        label_geometry: Geometry<SB, UB>,
        config: &SupervisedConfig,
        input_dimension: usize,
        label_dimension: usize,
    ) -> Result<Self> {
        let epsilon = config.effective_epsilon()?;
        Ok(Self {
            input: ArtEngine::new(input_geometry, &config.input, input_dimension)?,
            label: ArtEngine::new(label_geometry, &config.label, label_dimension)?,
            associations: Mutex::new(AssociationMap::new()),
            epsilon,
            conflicts: AtomicU64::new(0),
            uncommitted: AtomicU64::new(0),
        })
    }

    /// The input-side engine.
    pub fn input(&self) -> &ArtEngine<SA, UA> {
        &self.input
    }

    /// The label-side engine.
    pub fn label(&self) -> &ArtEngine<SB, UB> {
        &self.label
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Learn `input` under `label`.
    ///
    /// Both sides are planned against snapshots before anything is written.
    /// The label commits first, then the input. If the input side cannot be
    /// placed or match tracking fails, neither store is touched. Calls are
    /// serialized by the controller.
    pub fn learn_supervised(&self, input: &Pattern, label: &Pattern) -> Result<SupervisedOutcome> {
        self.input.check_dimension(input)?;
        self.label.check_dimension(label)?;

        let mut associations = self.associations.lock().map_err(ResonanceError::poisoned)?;

        loop {
            let label_snapshot = self.label.store().snapshot()?;
            let mut label_state = SearchState::new(self.label.vigilance());
            let label_proposal = self
                .label
                .search()
                .propose(&label_snapshot, label, &mut label_state, None)?;
            let planned = match label_proposal {
                Proposal::Resonance(c) | Proposal::Degraded(c) => Some(c.index),
                Proposal::NewCategory => None,
            };

            let plan = self.plan_input(input, planned, &associations)?;
            if plan.proposal.is_none() {
                return Ok(self.uncommitted(None, plan.conflicts));
            }

            let committed = match self.label.search().commit(
                self.label.store(),
                label_snapshot.generation(),
                label,
                &label_proposal,
            )? {
                CommitOutcome::Committed(committed) => committed,
                CommitOutcome::Stale => {
                    self.label.metrics().record_retry();
                    debug!("Label commit lost race, planning again");
                    continue;
                }
            };
            let label_outcome = self.label.record(&label_proposal, committed, label_state.resets());
            return self.commit_input(input, label_outcome, plan, &mut associations);
        }
    }

    /// Commit a planned input-side proposal and bind it to `label_outcome`'s
    /// category. A stale commit is planned again with the label now fixed.
    fn commit_input(
        &self,
        input: &Pattern,
        label_outcome: LearnOutcome,
        mut plan: InputPlan<SA::Weight>,
        associations: &mut AssociationMap,
    ) -> Result<SupervisedOutcome> {
        let b = label_outcome.category;
        loop {
            let proposal = match plan.proposal {
                Some(proposal) => proposal,
                None => return Ok(self.uncommitted(Some(b), plan.conflicts)),
            };
            match self.input.search().commit(
                self.input.store(),
                plan.snapshot.generation(),
                input,
                &proposal,
            )? {
                CommitOutcome::Committed(committed) => {
                    let outcome = self.input.record(&proposal, committed, plan.resets);
                    associations.insert_once(outcome.category, b)?;
                    self.conflicts.fetch_add(plan.conflicts as u64, Ordering::Relaxed);
                    if label_outcome.degraded {
                        warn!("Label ceiling reached: {} bound to unvetted label {}", outcome.category, b);
                    }
                    return Ok(SupervisedOutcome {
                        category: Some(outcome.category),
                        label: Some(b),
                        conflicts_resolved: plan.conflicts,
                        degraded: outcome.degraded || label_outcome.degraded,
                        label_degraded: label_outcome.degraded,
                        resonated: outcome.resonated,
                    });
                }
                CommitOutcome::Stale => {
                    self.input.metrics().record_retry();
                    debug!("Supervised commit lost race, searching again");
                    plan = self.plan_input(input, Some(b), associations)?;
                }
            }
        }
    }

    fn uncommitted(&self, label: Option<CategoryIndex>, conflicts: usize) -> SupervisedOutcome {
        warn!("No category at the ceiling can carry this label; input dropped");
        self.uncommitted.fetch_add(1, Ordering::Relaxed);
        self.conflicts.fetch_add(conflicts as u64, Ordering::Relaxed);
        SupervisedOutcome {
            category: None,
            label,
            conflicts_resolved: conflicts,
            degraded: true,
            label_degraded: false,
            resonated: false,
        }
    }

    /// Match-track `input` against one snapshot without writing anything.
    ///
    /// `label` is the label category the input will carry, or `None` for a
    /// label the store has not seen yet, which no category can be bound to.
    fn plan_input(
        &self,
        input: &Pattern,
        label: Option<CategoryIndex>,
        associations: &AssociationMap,
    ) -> Result<InputPlan<SA::Weight>> {
        let search = self.input.search();
        let snapshot = self.input.store().snapshot()?;
        let mut state = SearchState::new(self.input.vigilance());
        let cap = snapshot.len() + 2;
        let mut conflicts = 0;
        let admits = |idx: CategoryIndex| match label {
            Some(b) => associations.admits(idx, b),
            None => associations.get(idx).is_none(),
        };

        for _ in 0..cap {
            let proposal = match search.propose(&snapshot, input, &mut state, None)? {
                Proposal::Resonance(candidate) if !admits(candidate.index) => {
                    let matched = candidate.scores.matching.0;
                    let raised = matched + self.epsilon;
                    if raised <= matched {
                        return Err(ResonanceError::MatchTrackingNonTermination {
                            iterations: conflicts + 1,
                        });
                    }
                    trace!(
                        "Label conflict on {}: raising vigilance {:.4} -> {:.4}",
                        candidate.index,
                        state.effective_vigilance(),
                        raised
                    );
                    state.raise_vigilance(raised);
                    state.reject(candidate.index);
                    conflicts += 1;
                    continue;
                }
                Proposal::Degraded(_) => search
                    .best_match(&snapshot, input, |idx| admits(idx))
                    .map(Proposal::Degraded),
                other => Some(other),
            };
            return Ok(InputPlan {
                snapshot,
                proposal,
                resets: state.resets(),
                conflicts,
            });
        }

        Err(ResonanceError::MatchTrackingNonTermination { iterations: cap })
    }

    /// Predict the input's category and its bound label without learning.
    pub fn predict_label(&self, input: &Pattern) -> Result<Option<LabelPrediction>> {
        let prediction = match self.input.predict(input)? {
            Some(p) => p,
            None => return Ok(None),
        };
        let associations = self.associations.lock().map_err(ResonanceError::poisoned)?;
        Ok(Some(LabelPrediction {
            category: prediction.category,
            label: associations.get(prediction.category),
            activation: prediction.activation,
            matching: prediction.matching,
            passes_vigilance: prediction.passes_vigilance,
        }))
    }

    /// Label bound to an input category.
    pub fn association(&self, category: CategoryIndex) -> Result<Option<CategoryIndex>> {
        Ok(self
            .associations
            .lock()
            .map_err(ResonanceError::poisoned)?
            .get(category))
    }

    pub fn export_associations(&self) -> Result<Vec<AssociationRecord>> {
        Ok(self
            .associations
            .lock()
            .map_err(ResonanceError::poisoned)?
            .records())
    }

    /// Restore bindings. Both sides of every record must already exist in
    /// their stores. Nothing is written unless every record is accepted.
    pub fn import_associations(&self, records: Vec<AssociationRecord>) -> Result<usize> {
        let input_snapshot = self.input.store().snapshot()?;
        let label_snapshot = self.label.store().snapshot()?;
        let mut associations = self.associations.lock().map_err(ResonanceError::poisoned)?;

        let mut staged = associations.clone();
        for record in &records {
            if input_snapshot.get(record.category).is_none() {
                return Err(ResonanceError::UnknownCategory(record.category));
            }
            if label_snapshot.get(record.label).is_none() {
                return Err(ResonanceError::UnknownCategory(record.label));
            }
            staged.insert_once(record.category, record.label)?;
        }
        *associations = staged;
        Ok(records.len())
    }

    pub fn stats(&self) -> Result<SupervisedStats> {
        let associations = self.associations.lock().map_err(ResonanceError::poisoned)?.len();
        Ok(SupervisedStats {
            input: self.input.stats()?,
            label: self.label.stats()?,
            associations,
            conflicts_resolved: self.conflicts.load(Ordering::Relaxed),
            uncommitted: self.uncommitted.load(Ordering::Relaxed),
        })
    }
}
