//! # Resonance Geometry
//!
//! Concrete category geometries for the resonance engine.
//!
//! Each geometry is a [`Geometry`](resonance_core::strategy::Geometry) pair of
//! a similarity strategy and an update strategy over a shared weight type:
//!
//! | Geometry | Weight | Extent |
//! |----------|--------|--------|
//! | Fuzzy | hyper-rectangle in complement-coded form | rectangle size |
//! | Hypersphere | centroid + radius | radius |
//!
//! Inputs are expected to be normalized (and complement-coded for the fuzzy
//! geometry) upstream.

pub mod fuzzy;
pub mod hypersphere;
pub mod prelude;

pub use fuzzy::{extent as fuzzy_extent, fuzzy, FuzzyGeometry, FuzzySimilarity, FuzzyUpdate};
pub use hypersphere::{extent as hypersphere_extent, hypersphere, HypersphereGeometry, HypersphereSimilarity, HypersphereUpdate, HypersphereWeight};
