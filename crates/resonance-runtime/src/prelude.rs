//! Resonance Runtime Prelude: convenient imports for common usage.
//!
//! ```rust
//! use resonance_runtime::prelude::*;
//! ```

// Re-export configuration
pub use crate::config::{
    EngineConfig, EngineParams, Parallelism, SupervisedConfig, MIN_MATCH_TRACKING_EPSILON,
};

// Re-export the engine
pub use crate::engine::{ArtEngine, LearnOutcome, Prediction};

// Re-export search and storage
pub use crate::search::{CancelToken, Candidate, Proposal, ResonanceSearch, SearchPhase, SearchState};
pub use crate::store::{CategoryStore, CommitOutcome, Committed, StoreSnapshot};

// Re-export match tracking
pub use crate::match_tracking::{
    AssociationMap, AssociationRecord, LabelPrediction, MatchTrackingController,
    SupervisedOutcome, SupervisedStats,
};

// Re-export metrics and drivers
pub use crate::metrics::{EngineMetrics, EngineStats};
pub use crate::batch::{learn_concurrent, learn_stream, predict_batch};

// Re-export async runtime when feature is enabled
#[cfg(feature = "async")]
pub use crate::async_runtime::AsyncEngine;
