//! Error types for resonance operations.
//!
//! Ordinary resets and match-tracking retries are control flow, not errors.
//! Only conditions the caller must act on surface here.

use crate::types::CategoryIndex;
use thiserror::Error;

/// Result type for resonance operations.
pub type Result<T> = std::result::Result<T, ResonanceError>;

/// Errors that can occur while building or driving an engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResonanceError {
    /// Input length differs from the engine's fixed dimension.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A component is NaN or infinite (or the pattern is empty).
    #[error("Invalid input at position {position}: {value}")]
    InvalidInput { position: usize, value: f64 },

    /// Rejected at construction time, never at learn time.
    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidConfiguration {
        field: String,
        value: String,
        reason: String,
    },

    /// The store is already at its category ceiling.
    #[error("Category capacity exceeded (limit {limit})")]
    CapacityExceeded { limit: usize },

    /// Match tracking failed to terminate within its iteration cap.
    #[error("Match tracking did not terminate after {iterations} iterations")]
    MatchTrackingNonTermination { iterations: usize },

    /// No category with this index exists in the store.
    #[error("Unknown category {0}")]
    UnknownCategory(CategoryIndex),

    /// Imported records violate the store's ordering invariants.
    #[error("Invalid import: {0}")]
    InvalidImport(String),

    /// Attempt to rewrite a write-once association with a different label.
    #[error("Association conflict on {category}: bound to {existing}, attempted {attempted}")]
    AssociationConflict {
        category: CategoryIndex,
        existing: CategoryIndex,
        attempted: CategoryIndex,
    },

    /// The search was abandoned before its commit step.
    #[error("Search cancelled before commit")]
    Cancelled,

    /// A lock guarding the category store was poisoned by a panicking writer.
    #[error("Category store poisoned: {0}")]
    StorePoisoned(String),

    /// A background learning task panicked or was aborted.
    #[error("Learning task failed: {0}")]
    TaskFailed(String),
}

// Convenience constructors
impl ResonanceError {
    pub fn invalid_config(
        field: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        ResonanceError::InvalidConfiguration {
            field: field.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        ResonanceError::DimensionMismatch { expected, actual }
    }

    pub fn invalid_import(msg: impl Into<String>) -> Self {
        ResonanceError::InvalidImport(msg.into())
    }

    pub fn poisoned(msg: impl ToString) -> Self {
        ResonanceError::StorePoisoned(msg.to_string())
    }

    /// Whether the caller can fix this by reformatting its input.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ResonanceError::DimensionMismatch { .. } | ResonanceError::InvalidInput { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_field() {
        let err = ResonanceError::invalid_config("vigilance", 1.5, "must be in (0, 1]");
        assert_eq!(
            err.to_string(),
            "Invalid value for vigilance: 1.5 (must be in (0, 1])"
        );
    }

    #[test]
    fn input_errors_are_classified() {
        assert!(ResonanceError::dimension_mismatch(4, 2).is_input_error());
        assert!(ResonanceError::InvalidInput { position: 0, value: f64::NAN }.is_input_error());
        assert!(!ResonanceError::Cancelled.is_input_error());
    }
}
