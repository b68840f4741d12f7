//! HYPERSPHERE: categories as balls around a centroid.
//!
//! Every category is bounded by the same radius ceiling `R̄`. A category's
//! "reach" for an input is `max(R, ‖x - c‖)`: the radius the ball would need
//! to contain the input. Match is one minus that reach relative to `R̄`.

use resonance_core::error::{ResonanceError, Result};
use resonance_core::pattern::Pattern;
use resonance_core::strategy::{Geometry, SimilarityStrategy, UpdateStrategy};
use resonance_core::types::{ChoiceParameter, LearningRate, Scores};
use serde::{Deserialize, Serialize};

/// Hypersphere geometry.
pub type HypersphereGeometry = Geometry<HypersphereSimilarity, HypersphereUpdate>;

/// Build the hypersphere geometry with radius ceiling `radius_bound`.
///
/// For inputs in the unit hypercube of dimension `d`, `sqrt(d)` is a natural bound.
pub fn hypersphere(radius_bound: f64) -> Result<HypersphereGeometry> {
    if !(radius_bound.is_finite() && radius_bound > 0.0) {
        return Err(ResonanceError::invalid_config(
            "radius_bound",
            radius_bound,
            "must be finite and positive",
        ));
    }
    Ok(Geometry::new(
        HypersphereSimilarity { radius_bound },
        HypersphereUpdate,
    ))
}

/// Ball weight. An empty centroid marks an uncommitted weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HypersphereWeight {
    pub centroid: Vec<f64>,
    pub radius: f64,
}

impl HypersphereWeight {
    pub fn is_committed(&self) -> bool {
        !self.centroid.is_empty()
    }

    fn distance_to(&self, pattern: &Pattern) -> f64 {
        self.centroid
            .iter()
            .zip(pattern.iter())
            .map(|(c, x)| (x - c) * (x - c))
            .sum::<f64>()
            .sqrt()
    }
}

/// Choice `(R̄ - reach) / (R̄ - R + α)`, match `1 - reach / R̄`.
#[derive(Debug, Clone, Copy)]
pub struct HypersphereSimilarity {
    radius_bound: f64,
}

impl HypersphereSimilarity {
    pub fn radius_bound(&self) -> f64 {
        self.radius_bound
    }
}

/// Grows the radius and drags the centroid just enough to reach the input.
#[derive(Debug, Clone, Copy, Default)]
pub struct HypersphereUpdate;

impl SimilarityStrategy for HypersphereSimilarity {
    type Weight = HypersphereWeight;

    fn score(&self, pattern: &Pattern, weight: &HypersphereWeight, choice: ChoiceParameter) -> Scores {
        if !weight.is_committed() {
            return Scores::new(0.0, 0.0);
        }
        let bound = self.radius_bound;
        let reach = weight.radius.max(weight.distance_to(pattern));
        let activation = (bound - reach) / (bound - weight.radius + choice.value()).max(f64::MIN_POSITIVE);
        let matching = (1.0 - reach / bound).clamp(0.0, 1.0);
        Scores::new(activation, matching)
    }

    fn name(&self) -> &'static str {
        "hypersphere"
    }
}

impl UpdateStrategy for HypersphereUpdate {
    type Weight = HypersphereWeight;

    fn neutral(&self, _dimension: usize) -> HypersphereWeight {
        HypersphereWeight {
            centroid: Vec::new(),
            radius: 0.0,
        }
    }

    fn update(&self, weight: &HypersphereWeight, pattern: &Pattern, rate: LearningRate) -> HypersphereWeight {
        if !weight.is_committed() {
            return HypersphereWeight {
                centroid: pattern.values().to_vec(),
                radius: 0.0,
            };
        }

        let step = rate.value() / 2.0;
        let distance = weight.distance_to(pattern);
        let radius = weight.radius + step * (weight.radius.max(distance) - weight.radius);

        let centroid = if distance > 0.0 {
            let pull = step * (1.0 - weight.radius.min(distance) / distance);
            weight
                .centroid
                .iter()
                .zip(pattern.iter())
                .map(|(c, x)| c + pull * (x - c))
                .collect()
        } else {
            weight.centroid.clone()
        };

        HypersphereWeight { centroid, radius }
    }

    /// An uncommitted ball reports dimension 0.
    fn weight_dimension(&self, weight: &HypersphereWeight) -> Option<usize> {
        Some(weight.centroid.len())
    }
}

/// The ball's radius.
pub fn extent(weight: &HypersphereWeight) -> f64 {
    weight.radius
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(v: &[f64]) -> Pattern {
        Pattern::new(v.to_vec()).unwrap()
    }

    #[test]
    fn rejects_bad_bound() {
        assert!(hypersphere(0.0).is_err());
        assert!(hypersphere(f64::INFINITY).is_err());
    }

    #[test]
    fn new_category_is_point_sphere() {
        let g = hypersphere(1.0).unwrap();
        let w = g.update.commit_new(&p(&[0.2, 0.4]));
        assert_eq!(w.centroid, vec![0.2, 0.4]);
        assert_eq!(w.radius, 0.0);
    }

    #[test]
    fn match_falls_with_distance() {
        let g = hypersphere(1.0).unwrap();
        let w = g.update.commit_new(&p(&[0.0, 0.0]));
        let near = g.similarity.score(&p(&[0.1, 0.0]), &w, ChoiceParameter::default());
        let far = g.similarity.score(&p(&[0.6, 0.0]), &w, ChoiceParameter::default());
        assert!((near.matching.0 - 0.9).abs() < 1e-12);
        assert!((far.matching.0 - 0.4).abs() < 1e-12);
        assert!(near.activation.0 > far.activation.0);
    }

    #[test]
    fn fast_learning_reaches_the_input_exactly() {
        let g = hypersphere(1.0).unwrap();
        let w = g.update.commit_new(&p(&[0.0, 0.0]));
        let grown = g.update.update(&w, &p(&[0.4, 0.0]), LearningRate::FAST);
        // Radius half the distance, centroid at the midpoint.
        assert!((grown.radius - 0.2).abs() < 1e-12);
        assert!((grown.centroid[0] - 0.2).abs() < 1e-12);
        // Both points now lie on the sphere.
        assert!((grown.distance_to(&p(&[0.0, 0.0])) - 0.2).abs() < 1e-12);
        assert!((grown.distance_to(&p(&[0.4, 0.0])) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn contained_input_leaves_weight_unchanged() {
        let g = hypersphere(1.0).unwrap();
        let w = g.update.commit_new(&p(&[0.0, 0.0]));
        let w = g.update.update(&w, &p(&[0.4, 0.0]), LearningRate::FAST);
        let again = g.update.update(&w, &p(&[0.25, 0.05]), LearningRate::new(0.3).unwrap());
        assert!((again.radius - w.radius).abs() < 1e-12);
        for (a, b) in again.centroid.iter().zip(&w.centroid) {
            assert!((a - b).abs() < 1e-12);
        }
    }
}
