//! # Resonance
//!
//! Online, incremental category learning through adaptive resonance.
//!
//! Each input either *resonates* with an existing category (its match score
//! clears the vigilance threshold and the category's weight absorbs it) or
//! founds a new category. Learned categories are never forgotten, so the
//! engine stays stable while remaining plastic to novel inputs.
//!
//! ## Quick Start
//!
//! ```rust
//! use resonance::prelude::*;
//!
//! let config = EngineConfig::default().with_vigilance(0.7);
//! let engine = ArtEngine::new(fuzzy(), &config, 4).unwrap();
//!
//! // Complement-coded 2-D inputs: [x, y, 1-x, 1-y].
//! let inputs = [[1.0, 0.0, 0.0, 1.0], [0.0, 1.0, 1.0, 0.0], [0.9, 0.1, 0.1, 0.9]];
//! let assigned: Vec<u64> = inputs
//!     .iter()
//!     .map(|v| engine.learn(&Pattern::new(v.to_vec()).unwrap()).unwrap().category.0)
//!     .collect();
//! assert_eq!(assigned, vec![0, 1, 0]);
//! ```
//!
//! ## Architecture
//!
//! - [`resonance_core`] - Pattern, scalar types, strategy traits and errors
//! - [`resonance_geometry`] - Fuzzy hyper-rectangle and hypersphere geometries
//! - [`resonance_runtime`] - Category store, resonance search, engine, match tracking
//!
//! ## Key Concepts
//!
//! | Term | Meaning |
//! |------|---------|
//! | Vigilance ρ | Minimum match score for a category to be accepted |
//! | Reset | Rejecting a candidate for the current input |
//! | Fast learning | β = 1, the weight collapses onto the combined state |
//! | Match tracking | Raising vigilance past a category whose label disagrees |
//!
//! ## Supervised Learning
//!
//! ```rust
//! use resonance::prelude::*;
//!
//! let config = SupervisedConfig::default()
//!     .with_input(EngineConfig::default().with_vigilance(0.5));
//! let controller = MatchTrackingController::new(fuzzy(), fuzzy(), &config, 2, 2).unwrap();
//!
//! let x = Pattern::new(vec![0.2, 0.8]).unwrap();
//! let out = controller.learn_supervised(&x, &Pattern::one_hot(0, 2).unwrap()).unwrap();
//! assert!(out.committed());
//! ```

// Re-export all subcrates
pub use resonance_core as core;
pub use resonance_geometry as geometry;
pub use resonance_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust
/// use resonance::prelude::*;
/// ```
pub mod prelude {
    pub use resonance_core::prelude::*;
    pub use resonance_geometry::prelude::*;
    pub use resonance_runtime::prelude::*;
}
