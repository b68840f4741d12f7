//! Engine configuration.
//!
//! `EngineConfig` is the serializable form (what a TOML or JSON file holds).
//! `validate()` turns it into `EngineParams`, whose fields are typed and
//! already range-checked, so nothing is re-validated at learn time.

use resonance_core::error::{ResonanceError, Result};
use resonance_core::pattern::NonFinitePolicy;
use resonance_core::types::{ChoiceParameter, LearningRate, Vigilance};
use serde::{Deserialize, Serialize};

/// Smallest step match tracking may raise vigilance by.
pub const MIN_MATCH_TRACKING_EPSILON: f64 = 1e-9;

/// When to fan candidate scoring out across the rayon pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum Parallelism {
    /// Always score on the calling thread.
    Sequential,
    /// Go parallel once the store holds at least this many categories.
    Adaptive { min_categories: usize },
    /// Always go parallel.
    Always,
}

impl Default for Parallelism {
    fn default() -> Self {
        Parallelism::Adaptive { min_categories: 256 }
    }
}

impl Parallelism {
    pub fn is_parallel_for(&self, categories: usize) -> bool {
        match *self {
            Parallelism::Sequential => false,
            Parallelism::Adaptive { min_categories } => categories >= min_categories,
            Parallelism::Always => true,
        }
    }
}

/// Configuration for one resonance engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Baseline vigilance ρ, in `(0, 1]` (default: 0.75).
    #[serde(default = "default_vigilance")]
    pub vigilance: f64,
    /// Learning rate β, in `(0, 1]` (default: 1.0, fast learning).
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    /// Choice parameter α passed to the similarity strategy (default: 0.001).
    #[serde(default = "default_choice")]
    pub choice: f64,
    /// Category ceiling; at the ceiling the engine degrades instead of growing (default: 10000).
    #[serde(default = "default_max_categories")]
    pub max_categories: usize,
    /// Boundary handling of NaN/infinite components (default: reject).
    #[serde(default)]
    pub non_finite: NonFinitePolicy,
    /// Intra-input scoring parallelism.
    #[serde(default)]
    pub parallelism: Parallelism,
}

fn default_vigilance() -> f64 { 0.75 }
fn default_learning_rate() -> f64 { 1.0 }
fn default_choice() -> f64 { 0.001 }
fn default_max_categories() -> usize { 10_000 }
fn default_label_vigilance() -> f64 { 1.0 }
fn default_epsilon() -> f64 { 1e-4 }

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            vigilance: default_vigilance(),
            learning_rate: default_learning_rate(),
            choice: default_choice(),
            max_categories: default_max_categories(),
            non_finite: NonFinitePolicy::default(),
            parallelism: Parallelism::default(),
        }
    }
}

impl EngineConfig {
    pub fn with_vigilance(mut self, vigilance: f64) -> Self {
        self.vigilance = vigilance;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_choice(mut self, choice: f64) -> Self {
        self.choice = choice;
        self
    }

    pub fn with_max_categories(mut self, max_categories: usize) -> Self {
        self.max_categories = max_categories;
        self
    }

    pub fn with_non_finite(mut self, policy: NonFinitePolicy) -> Self {
        self.non_finite = policy;
        self
    }

    pub fn with_parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = parallelism;
        self
    }

    /// Check every field and produce typed parameters.
    pub fn validate(&self) -> Result<EngineParams> {
        let vigilance = Vigilance::new(self.vigilance)?;
        let learning_rate = LearningRate::new(self.learning_rate)?;
        let choice = ChoiceParameter::new(self.choice)?;

        if self.max_categories == 0 {
            return Err(ResonanceError::invalid_config(
                "max_categories",
                self.max_categories,
                "must be at least 1",
            ));
        }
        if let NonFinitePolicy::Substitute(value) = self.non_finite {
            if !value.is_finite() {
                return Err(ResonanceError::invalid_config(
                    "non_finite.value",
                    value,
                    "substitute must be finite",
                ));
            }
        }

        Ok(EngineParams {
            vigilance,
            learning_rate,
            choice,
            max_categories: self.max_categories,
            non_finite: self.non_finite,
            parallelism: self.parallelism,
        })
    }
}

/// Validated engine parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineParams {
    pub vigilance: Vigilance,
    pub learning_rate: LearningRate,
    pub choice: ChoiceParameter,
    pub max_categories: usize,
    pub non_finite: NonFinitePolicy,
    pub parallelism: Parallelism,
}

/// Configuration for a supervised (match-tracking) pair of engines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupervisedConfig {
    /// The input-side ("A") engine.
    #[serde(default)]
    pub input: EngineConfig,
    /// The label-side ("B") engine; vigilance 1.0 gives one category per distinct label.
    #[serde(default = "default_label_config")]
    pub label: EngineConfig,
    /// How far past the conflicting match score vigilance is raised (default: 1e-4).
    #[serde(default = "default_epsilon")]
    pub match_tracking_epsilon: f64,
}

fn default_label_config() -> EngineConfig {
    EngineConfig::default().with_vigilance(default_label_vigilance())
}

impl Default for SupervisedConfig {
    fn default() -> Self {
        Self {
            input: EngineConfig::default(),
            label: default_label_config(),
            match_tracking_epsilon: default_epsilon(),
        }
    }
}

impl SupervisedConfig {
    pub fn with_input(mut self, input: EngineConfig) -> Self {
        self.input = input;
        self
    }

    pub fn with_label(mut self, label: EngineConfig) -> Self {
        self.label = label;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.match_tracking_epsilon = epsilon;
        self
    }

    /// The epsilon actually used: at least `MIN_MATCH_TRACKING_EPSILON`.
    pub fn effective_epsilon(&self) -> Result<f64> {
        let eps = self.match_tracking_epsilon;
        if !eps.is_finite() || eps < 0.0 {
            return Err(ResonanceError::invalid_config(
                "match_tracking_epsilon",
                eps,
                "must be finite and non-negative",
            ));
        }
        Ok(eps.max(MIN_MATCH_TRACKING_EPSILON))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let params = EngineConfig::default().validate().unwrap();
        assert_eq!(params.vigilance.value(), 0.75);
        assert!(params.learning_rate.is_fast());
    }

    #[test]
    fn rejects_out_of_range_fields() {
        assert!(EngineConfig::default().with_vigilance(0.0).validate().is_err());
        assert!(EngineConfig::default().with_vigilance(1.2).validate().is_err());
        assert!(EngineConfig::default().with_learning_rate(0.0).validate().is_err());
        assert!(EngineConfig::default().with_learning_rate(1.01).validate().is_err());
        assert!(EngineConfig::default().with_max_categories(0).validate().is_err());
        assert!(EngineConfig::default().with_choice(-1.0).validate().is_err());
        assert!(EngineConfig::default()
            .with_non_finite(NonFinitePolicy::Substitute(f64::NAN))
            .validate()
            .is_err());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{ "vigilance": 0.9 }"#).unwrap();
        assert_eq!(config.vigilance, 0.9);
        assert_eq!(config.max_categories, 10_000);
        assert_eq!(config.parallelism, Parallelism::default());
    }

    #[test]
    fn epsilon_is_clamped_to_minimum() {
        let config = SupervisedConfig::default().with_epsilon(0.0);
        assert_eq!(config.effective_epsilon().unwrap(), MIN_MATCH_TRACKING_EPSILON);
        assert!(SupervisedConfig::default().with_epsilon(-1.0).effective_epsilon().is_err());
        assert_eq!(SupervisedConfig::default().label.vigilance, 1.0);
    }

    #[test]
    fn adaptive_parallelism_threshold() {
        let p = Parallelism::Adaptive { min_categories: 10 };
        assert!(!p.is_parallel_for(9));
        assert!(p.is_parallel_for(10));
        assert!(!Parallelism::Sequential.is_parallel_for(usize::MAX));
    }
}
