//! Strategy contracts: the seams where a category geometry plugs in.
//!
//! A geometry is an explicit capability pair: a pure scoring function and a
//! pure update function over the same weight type. The engine never knows
//! what a weight looks like; it only ranks, tests and commits.

pub mod similarity;
pub mod update;

pub use similarity::SimilarityStrategy;
pub use update::UpdateStrategy;

/// A similarity/update pair sharing one weight representation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Geometry<S, U> {
    pub similarity: S,
    pub update: U,
}

impl<S, U> Geometry<S, U>
where
    S: SimilarityStrategy,
    U: UpdateStrategy<Weight = S::Weight>,
{
    pub fn new(similarity: S, update: U) -> Self {
        Self { similarity, update }
    }
}
