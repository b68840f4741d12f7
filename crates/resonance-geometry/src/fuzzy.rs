//! FUZZY: hyper-rectangle categories over complement-coded inputs.
//!
//! A weight `w = [u, v^c]` encodes the box `[u, v]`. The fuzzy AND (`∧`,
//! component-wise minimum) of an input with a weight is the part of the input
//! the box already explains. Learning only ever lowers weight components, so
//! boxes only grow: once a point is inside a box it stays inside.

use resonance_core::pattern::Pattern;
use resonance_core::strategy::{Geometry, SimilarityStrategy, UpdateStrategy};
use resonance_core::types::{ChoiceParameter, LearningRate, Scores};

/// Fuzzy hyper-rectangle geometry.
pub type FuzzyGeometry = Geometry<FuzzySimilarity, FuzzyUpdate>;

/// Build the fuzzy geometry.
pub fn fuzzy() -> FuzzyGeometry {
    Geometry::new(FuzzySimilarity, FuzzyUpdate)
}

/// Choice `|I∧w| / (α + |w|)`, match `|I∧w| / |I|`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FuzzySimilarity;

/// Update `β(I∧w) + (1-β)w`; neutral weight is all ones.
#[derive(Debug, Clone, Copy, Default)]
pub struct FuzzyUpdate;

/// `|I∧w|`
fn overlap(pattern: &[f64], weight: &[f64]) -> f64 {
    pattern.iter().zip(weight).map(|(i, w)| i.min(*w)).sum()
}

impl SimilarityStrategy for FuzzySimilarity {
    type Weight = Vec<f64>;

    fn score(&self, pattern: &Pattern, weight: &Vec<f64>, choice: ChoiceParameter) -> Scores {
        let shared = overlap(pattern.values(), weight);
        let weight_norm: f64 = weight.iter().sum();
        let input_norm = pattern.l1_norm();

        let activation = shared / (choice.value() + weight_norm).max(f64::MIN_POSITIVE);
        // An all-zero input is trivially contained.
        let matching = if input_norm > 0.0 { shared / input_norm } else { 1.0 };
        Scores::new(activation, matching)
    }

    fn name(&self) -> &'static str {
        "fuzzy"
    }
}

impl UpdateStrategy for FuzzyUpdate {
    type Weight = Vec<f64>;

    fn neutral(&self, dimension: usize) -> Vec<f64> {
        vec![1.0; dimension]
    }

    fn update(&self, weight: &Vec<f64>, pattern: &Pattern, rate: LearningRate) -> Vec<f64> {
        let beta = rate.value();
        pattern
            .iter()
            .zip(weight)
            .map(|(i, w)| {
                let fast = i.min(*w);
                if rate.is_fast() {
                    fast
                } else {
                    beta * fast + (1.0 - beta) * w
                }
            })
            .collect()
    }

    fn weight_dimension(&self, weight: &Vec<f64>) -> Option<usize> {
        Some(weight.len())
    }
}

/// Size of the box a complement-coded weight encodes: `Σ (v - u)`.
///
/// Equals `d/2 - |w|` for a weight of length `d`. Non-decreasing under
/// `FuzzyUpdate`.
pub fn extent(weight: &[f64]) -> f64 {
    let half = weight.len() / 2;
    let (lower, upper_complement) = weight.split_at(half);
    lower
        .iter()
        .zip(upper_complement)
        .map(|(u, vc)| (1.0 - vc) - u)
        .sum()
}
