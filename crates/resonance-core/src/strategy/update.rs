//! UPDATE: computing a category's next weight after resonance.

use crate::pattern::Pattern;
use crate::types::LearningRate;

/// Compute a category's next weight from its current weight and an accepted input.
///
/// Contract:
/// - With `LearningRate::FAST` the result depends only on `(weight, pattern)`.
/// - With `β < 1` the result blends continuously toward the fast-learning result.
/// - Re-presenting an input the weight already contains returns the same
///   weight (within floating tolerance).
pub trait UpdateStrategy: Send + Sync {
    /// Geometry-specific category state.
    type Weight: Clone + Send + Sync;

    /// A fresh, uncommitted weight for a given input dimension.
    fn neutral(&self, dimension: usize) -> Self::Weight;

    /// The next weight after accepting `pattern`.
    fn update(&self, weight: &Self::Weight, pattern: &Pattern, rate: LearningRate) -> Self::Weight;

    /// Input dimension a weight was built for, when the weight records one.
    ///
    /// Used to vet imported categories. `None` skips the check.
    fn weight_dimension(&self, _weight: &Self::Weight) -> Option<usize> {
        None
    }

    /// Weight of a category created for `pattern`.
    ///
    /// New categories always commit fully to their first member.
    fn commit_new(&self, pattern: &Pattern) -> Self::Weight {
        self.update(&self.neutral(pattern.dimension()), pattern, LearningRate::FAST)
    }
}
