//! Resonance Geometry Prelude: convenient imports for common usage.

pub use crate::fuzzy::{extent as fuzzy_extent, fuzzy, FuzzyGeometry, FuzzySimilarity, FuzzyUpdate};
pub use crate::hypersphere::{
    extent as hypersphere_extent, hypersphere, HypersphereGeometry, HypersphereSimilarity, HypersphereUpdate, HypersphereWeight,
};
