//! Resonance Core Prelude: convenient imports for common usage.
//!
//! ```rust
//! use resonance_core::prelude::*;
//! ```

pub use crate::types::{
    ActivationScore, Category, CategoryIndex, CategoryRecord, ChoiceParameter, LearningRate,
    MatchScore, Scores, Vigilance, rank_order,
};

pub use crate::pattern::{NonFinitePolicy, Pattern};

pub use crate::strategy::{Geometry, SimilarityStrategy, UpdateStrategy};

pub use crate::error::{ResonanceError, Result};
