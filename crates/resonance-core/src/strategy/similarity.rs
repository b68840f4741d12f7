//! SIMILARITY: scoring one category against one input.

use crate::pattern::Pattern;
use crate::types::{ChoiceParameter, Scores};

/// Score a category's weight against an input.
///
/// Implementations must be pure: the engine evaluates them for many
/// categories at once, possibly on several threads, without coordination.
/// They must also be total for any pattern that already passed the
/// engine's dimension check.
pub trait SimilarityStrategy: Send + Sync {
    /// Geometry-specific category state.
    type Weight: Clone + Send + Sync;

    /// Compute `(activation, match)` for this weight.
    ///
    /// The choice parameter is passed through untouched from configuration.
    fn score(&self, pattern: &Pattern, weight: &Self::Weight, choice: ChoiceParameter) -> Scores;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}
