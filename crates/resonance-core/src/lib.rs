//! # Resonance Core
//!
//! Core types and strategy contracts for adaptive resonance category learning.
//!
//! An adaptive resonance engine keeps a growing set of prototype categories.
//! Each input either *resonates* with an existing category that matches it
//! well enough (and refines that category), or founds a new one. This crate
//! holds the pieces every engine variant shares:
//!
//! - **Pattern** - an immutable, finite, fixed-dimension input vector
//! - **Scalars** - vigilance, learning rate, choice parameter, scores
//! - **SimilarityStrategy** - scores a category against an input
//! - **UpdateStrategy** - computes a category's next weight
//! - **ResonanceError** - the error taxonomy
//!
//! ## Quick Start
//!
//! ```rust
//! use resonance_core::prelude::*;
//!
//! let pattern = Pattern::new(vec![0.2, 0.8]).unwrap();
//! assert_eq!(pattern.dimension(), 2);
//!
//! let vigilance = Vigilance::new(0.75).unwrap();
//! assert!(MatchScore(0.8).passes(vigilance.value()));
//! ```

pub mod error;
pub mod pattern;
pub mod prelude;
pub mod strategy;
pub mod types;
