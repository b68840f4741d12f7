//! Batch drivers.
//!
//! `learn_stream` is the reference: one logical stream, presented in order.
//! Replaying the same stream yields the same assignments whatever
//! `Parallelism` the engine scores with.
//!
//! `learn_concurrent` lets several workers learn against one store at once.
//! Each input still commits atomically, but which input reaches the store
//! first is up to the scheduler, so assignments may differ between runs.

use crate::engine::{ArtEngine, LearnOutcome, Prediction};
use rayon::prelude::*;
use resonance_core::error::{ResonanceError, Result};
use resonance_core::pattern::Pattern;
use resonance_core::strategy::{SimilarityStrategy, UpdateStrategy};
use tracing::debug;

/// Learn `patterns` in order on the calling thread. Stops at the first error.
pub fn learn_stream<S, U>(engine: &ArtEngine<S, U>, patterns: &[Pattern]) -> Result<Vec<LearnOutcome>>
where
    S: SimilarityStrategy,
    U: UpdateStrategy<Weight = S::Weight>,
{
    patterns.iter().map(|p| engine.learn(p)).collect()
}

/// Learn `patterns` from `workers` threads sharing one store.
///
/// Results come back in input order; `LearnOutcome::sequence` records the
/// order in which commits actually landed.
pub fn learn_concurrent<S, U>(
    engine: &ArtEngine<S, U>,
    patterns: &[Pattern],
    workers: usize,
) -> Result<Vec<Result<LearnOutcome>>>
where
    S: SimilarityStrategy,
    U: UpdateStrategy<Weight = S::Weight>,
{
    if workers == 0 {
        return Err(ResonanceError::invalid_config(
            "workers",
            workers,
            "must be at least 1",
        ));
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|e| ResonanceError::invalid_config("workers", workers, e.to_string()))?;

    debug!("Learning {} inputs on {} workers", patterns.len(), workers);
    Ok(pool.install(|| patterns.par_iter().map(|p| engine.learn(p)).collect()))
}

/// Predict every pattern against the current store in parallel.
pub fn predict_batch<S, U>(engine: &ArtEngine<S, U>, patterns: &[Pattern]) -> Vec<Result<Option<Prediction>>>
where
    S: SimilarityStrategy,
    U: UpdateStrategy<Weight = S::Weight>,
{
    patterns.par_iter().map(|p| engine.predict(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use resonance_geometry::fuzzy;

    fn coded(x: f64) -> Pattern {
        Pattern::new(vec![x, 1.0 - x]).unwrap()
    }

    #[test]
    fn zero_workers_is_a_configuration_error() {
        let engine = ArtEngine::new(fuzzy(), &EngineConfig::default(), 2).unwrap();
        assert!(matches!(
            learn_concurrent(&engine, &[], 0),
            Err(ResonanceError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn stream_stops_on_bad_input() {
        let engine = ArtEngine::new(fuzzy(), &EngineConfig::default(), 2).unwrap();
        let patterns = vec![coded(0.1), Pattern::new(vec![0.5]).unwrap(), coded(0.9)];
        assert!(learn_stream(&engine, &patterns).is_err());
        assert_eq!(engine.stats().unwrap().inputs, 1);
    }

    #[test]
    fn predict_batch_preserves_order() {
        let engine = ArtEngine::new(fuzzy(), &EngineConfig::default().with_vigilance(0.9), 2).unwrap();
        learn_stream(&engine, &[coded(0.0), coded(1.0)]).unwrap();
        let predictions = predict_batch(&engine, &[coded(1.0), coded(0.0)]);
        let categories: Vec<u64> = predictions
            .into_iter()
            .map(|p| p.unwrap().unwrap().category.0)
            .collect();
        assert_eq!(categories, vec![1, 0]);
    }
}
