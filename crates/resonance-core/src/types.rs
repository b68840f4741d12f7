//! Shared types used across the engine crates.

use crate::error::{ResonanceError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Stable identity of a category.
///
/// Assigned once at creation in strictly increasing order and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CategoryIndex(pub u64);

impl CategoryIndex {
    pub fn new(index: u64) -> Self {
        Self(index)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// The index that follows this one.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for CategoryIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// Minimum match score a category must reach to be accepted.
///
/// Always in `(0, 1]`. Match tracking raises the *effective* vigilance of a
/// single search past this range; that value lives in the search state, not here.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Vigilance(f64);

impl Vigilance {
    pub fn new(value: f64) -> Result<Self> {
        if value.is_finite() && value > 0.0 && value <= 1.0 {
            Ok(Self(value))
        } else {
            Err(ResonanceError::invalid_config(
                "vigilance",
                value,
                "must be in (0, 1]",
            ))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

/// Blend factor for weight updates, `β ∈ (0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct LearningRate(f64);

impl LearningRate {
    /// Fast learning: collapse fully onto the combined state.
    pub const FAST: LearningRate = LearningRate(1.0);

    pub fn new(value: f64) -> Result<Self> {
        if value.is_finite() && value > 0.0 && value <= 1.0 {
            Ok(Self(value))
        } else {
            Err(ResonanceError::invalid_config(
                "learning_rate",
                value,
                "must be in (0, 1]",
            ))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn is_fast(&self) -> bool {
        self.0 >= 1.0
    }
}

/// Activation bias (the classic `α` choice parameter).
///
/// Opaque to the engine; each similarity strategy interprets it.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct ChoiceParameter(f64);

impl ChoiceParameter {
    pub fn new(value: f64) -> Result<Self> {
        if value.is_finite() && value >= 0.0 {
            Ok(Self(value))
        } else {
            Err(ResonanceError::invalid_config(
                "choice",
                value,
                "must be finite and non-negative",
            ))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for ChoiceParameter {
    fn default() -> Self {
        Self(0.001)
    }
}

/// How strongly a category competes for an input. Higher is preferred.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct ActivationScore(pub f64);

/// How well a category contains an input, `1.0` meaning perfect overlap.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct MatchScore(pub f64);

impl MatchScore {
    /// The vigilance test.
    pub fn passes(&self, threshold: f64) -> bool {
        self.0 >= threshold
    }
}

/// Both scores for one (pattern, category) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub activation: ActivationScore,
    pub matching: MatchScore,
}

impl Scores {
    pub fn new(activation: f64, matching: f64) -> Self {
        Self {
            activation: ActivationScore(activation),
            matching: MatchScore(matching),
        }
    }
}

/// A learned prototype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category<W> {
    pub index: CategoryIndex,
    pub weight: W,
    /// Inputs committed to this category, including the one that created it.
    pub sample_count: u64,
    /// Logical sequence number of the input that created this category.
    pub created_at_seq: u64,
}

/// Export/import row for external persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRecord<W> {
    pub index: CategoryIndex,
    pub weight: W,
    pub sample_count: u64,
    #[serde(default)]
    pub created_at_seq: u64,
}

impl<W: Clone> From<&Category<W>> for CategoryRecord<W> {
    fn from(category: &Category<W>) -> Self {
        Self {
            index: category.index,
            weight: category.weight.clone(),
            sample_count: category.sample_count,
            created_at_seq: category.created_at_seq,
        }
    }
}

impl<W> From<CategoryRecord<W>> for Category<W> {
    fn from(record: CategoryRecord<W>) -> Self {
        Self {
            index: record.index,
            weight: record.weight,
            sample_count: record.sample_count,
            created_at_seq: record.created_at_seq,
        }
    }
}

/// Candidate preference order: activation descending, then smaller index.
///
/// Uses `total_cmp` so the order is total even for degenerate scores, which
/// keeps ranking reproducible whether it ran on one thread or many.
pub fn rank_order(
    a: (ActivationScore, CategoryIndex),
    b: (ActivationScore, CategoryIndex),
) -> Ordering {
    b.0 .0.total_cmp(&a.0 .0).then_with(|| a.1.cmp(&b.1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vigilance_bounds() {
        assert!(Vigilance::new(0.0).is_err());
        assert!(Vigilance::new(-0.1).is_err());
        assert!(Vigilance::new(1.000_001).is_err());
        assert!(Vigilance::new(f64::NAN).is_err());
        assert_eq!(Vigilance::new(1.0).unwrap().value(), 1.0);
        assert_eq!(Vigilance::new(0.7).unwrap().value(), 0.7);
    }

    #[test]
    fn learning_rate_bounds() {
        assert!(LearningRate::new(0.0).is_err());
        assert!(LearningRate::new(1.5).is_err());
        assert!(LearningRate::new(0.25).is_ok());
        assert!(LearningRate::FAST.is_fast());
    }

    #[test]
    fn rank_order_prefers_higher_activation_then_smaller_index() {
        let hi = (ActivationScore(0.9), CategoryIndex(5));
        let lo = (ActivationScore(0.1), CategoryIndex(0));
        assert_eq!(rank_order(hi, lo), Ordering::Less);

        let tie_a = (ActivationScore(0.5), CategoryIndex(2));
        let tie_b = (ActivationScore(0.5), CategoryIndex(7));
        assert_eq!(rank_order(tie_a, tie_b), Ordering::Less);
        assert_eq!(rank_order(tie_b, tie_a), Ordering::Greater);
    }

    #[test]
    fn category_index_display() {
        assert_eq!(CategoryIndex(3).to_string(), "c3");
        assert_eq!(CategoryIndex(3).next(), CategoryIndex(4));
    }
}
