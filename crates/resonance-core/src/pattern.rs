//! Pattern: the immutable input vector.
//!
//! Normalization and complement coding happen upstream. A `Pattern` only
//! guarantees that every component is finite; the engine checks dimension.

use crate::error::{ResonanceError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// What to do with NaN or infinite components at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "value")]
pub enum NonFinitePolicy {
    /// Fail with `InvalidInput`.
    Reject,
    /// Replace each non-finite component with this value.
    Substitute(f64),
}

impl Default for NonFinitePolicy {
    fn default() -> Self {
        NonFinitePolicy::Reject
    }
}

/// A fixed-dimension vector of finite reals.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    values: Arc<[f64]>,
}

impl Pattern {
    /// Build a pattern, rejecting empty input and non-finite components.
    pub fn new(values: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(ResonanceError::InvalidInput {
                position: 0,
                value: f64::NAN,
            });
        }
        if let Some((position, &value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(ResonanceError::InvalidInput { position, value });
        }
        Ok(Self {
            values: values.into(),
        })
    }

    /// Build a pattern, replacing non-finite components with `replacement`.
    pub fn sanitized(mut values: Vec<f64>, replacement: f64) -> Result<Self> {
        if !replacement.is_finite() {
            return Err(ResonanceError::invalid_config(
                "non_finite.substitute",
                replacement,
                "replacement must be finite",
            ));
        }
        for v in values.iter_mut().filter(|v| !v.is_finite()) {
            *v = replacement;
        }
        Self::new(values)
    }

    /// Build a pattern under an explicit boundary policy.
    pub fn with_policy(values: Vec<f64>, policy: NonFinitePolicy) -> Result<Self> {
        match policy {
            NonFinitePolicy::Reject => Self::new(values),
            NonFinitePolicy::Substitute(replacement) => Self::sanitized(values, replacement),
        }
    }

    /// One-hot label encoding, for supervised targets.
    pub fn one_hot(class: usize, classes: usize) -> Result<Self> {
        if class >= classes {
            return Err(ResonanceError::InvalidInput {
                position: class,
                value: class as f64,
            });
        }
        let mut values = vec![0.0; classes];
        values[class] = 1.0;
        Self::new(values)
    }

    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Sum of absolute component values.
    pub fn l1_norm(&self) -> f64 {
        self.values.iter().map(|v| v.abs()).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.values.iter()
    }
}

impl TryFrom<Vec<f64>> for Pattern {
    type Error = ResonanceError;

    fn try_from(values: Vec<f64>) -> Result<Self> {
        Pattern::new(values)
    }
}

impl TryFrom<&[f64]> for Pattern {
    type Error = ResonanceError;

    fn try_from(values: &[f64]) -> Result<Self> {
        Pattern::new(values.to_vec())
    }
}

impl Serialize for Pattern {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.values.as_ref().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let values = Vec::<f64>::deserialize(deserializer)?;
        Pattern::new(values).map_err(serde::de::Error::custom)
    }
}
