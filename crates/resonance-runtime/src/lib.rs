//! # Resonance Runtime
//!
//! The engine proper: category storage, resonance search, supervised match
//! tracking and the drivers that feed them.
//!
//! A geometry from `resonance-geometry` (or any other
//! [`Geometry`](resonance_core::strategy::Geometry)) plugs into an
//! [`ArtEngine`](engine::ArtEngine), which is `Send + Sync` and meant to be
//! shared behind an `Arc`. Searches read lock-free snapshots of the
//! [`CategoryStore`](store::CategoryStore); only the commit step is
//! serialized.

pub mod config;
pub mod store;
pub mod search;
pub mod engine;
pub mod match_tracking;
pub mod metrics;
pub mod batch;
pub mod prelude;

#[cfg(feature = "async")]
pub mod async_runtime;
