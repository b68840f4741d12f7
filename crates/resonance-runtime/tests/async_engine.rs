//! Async driver tests. Run with `--features async`.

#![cfg(feature = "async")]

use resonance_core::prelude::*;
use resonance_geometry::fuzzy;
use resonance_runtime::prelude::*;
use std::time::Duration;

fn coded(x: f64) -> Pattern {
    Pattern::new(vec![x, 1.0 - x]).unwrap()
}

#[tokio::test]
async fn learn_runs_on_blocking_pool() {
    let engine = AsyncEngine::new(ArtEngine::new(fuzzy(), &EngineConfig::default(), 2).unwrap());
    let out = engine.learn(coded(0.3)).await.unwrap();
    assert_eq!(out.category, CategoryIndex(0));
    assert_eq!(engine.stats().unwrap().inputs, 1);
}

#[tokio::test]
async fn generous_timeout_commits() {
    let engine = AsyncEngine::new(ArtEngine::new(fuzzy(), &EngineConfig::default(), 2).unwrap());
    let out = engine
        .learn_with_timeout(coded(0.7), Duration::from_secs(5))
        .await
        .unwrap();
    assert!(out.created());
}

#[tokio::test]
async fn timed_out_learn_either_commits_fully_or_not_at_all() {
    let engine = AsyncEngine::new(ArtEngine::new(fuzzy(), &EngineConfig::default(), 2).unwrap());
    match engine.learn_with_timeout(coded(0.4), Duration::ZERO).await {
        Ok(out) => {
            assert_eq!(engine.inner().len().unwrap(), 1);
            assert_eq!(out.sample_count, 1);
        }
        Err(ResonanceError::Cancelled) => assert!(engine.inner().is_empty().unwrap()),
        Err(e) => panic!("unexpected error: {e}"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_tasks_share_one_store() {
    let engine = AsyncEngine::new(
        ArtEngine::new(fuzzy(), &EngineConfig::default().with_vigilance(0.9), 2).unwrap(),
    );
    let tasks: Vec<_> = (0..32)
        .map(|i| {
            let engine = engine.clone();
            tokio::spawn(async move { engine.learn(coded(i as f64 / 31.0)).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }
    let total: u64 = engine
        .inner()
        .export_categories()
        .unwrap()
        .iter()
        .map(|r| r.sample_count)
        .sum();
    assert_eq!(total, 32);
}

#[tokio::test]
async fn batch_preserves_stream_order() {
    let engine = AsyncEngine::new(ArtEngine::new(fuzzy(), &EngineConfig::default(), 2).unwrap());
    let outcomes = engine
        .learn_batch((0..10).map(|i| coded(i as f64 / 9.0)).collect())
        .await
        .unwrap();
    let sequences: Vec<u64> = outcomes.iter().map(|o| o.sequence).collect();
    assert_eq!(sequences, (0..10).collect::<Vec<_>>());
}
