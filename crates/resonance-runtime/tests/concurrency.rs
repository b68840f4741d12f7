//! Many workers, one store.

use resonance_core::prelude::*;
use resonance_geometry::fuzzy;
use resonance_runtime::prelude::*;
use std::collections::BTreeSet;
use std::sync::Arc;

fn coded(x: f64, y: f64) -> Pattern {
    Pattern::new(vec![x, y, 1.0 - x, 1.0 - y]).unwrap()
}

fn grid(n: usize) -> Vec<Pattern> {
    (0..n)
        .map(|i| {
            let x = ((i * 37) % 101) as f64 / 100.0;
            let y = ((i * 59) % 103) as f64 / 102.0;
            coded(x, y)
        })
        .collect()
}

#[test]
fn concurrent_learning_loses_no_updates() {
    let engine = ArtEngine::new(fuzzy(), &EngineConfig::default().with_vigilance(0.8), 4).unwrap();
    let inputs = grid(500);

    let results = learn_concurrent(&engine, &inputs, 4).unwrap();
    let outcomes: Vec<LearnOutcome> = results.into_iter().map(|r| r.unwrap()).collect();

    // Every commit got its own slot in the global order.
    let sequences: BTreeSet<u64> = outcomes.iter().map(|o| o.sequence).collect();
    assert_eq!(sequences.len(), inputs.len());
    assert_eq!(sequences.iter().next_back(), Some(&(inputs.len() as u64 - 1)));

    // No sample was dropped and no category index was handed out twice.
    let records = engine.export_categories().unwrap();
    let total: u64 = records.iter().map(|r| r.sample_count).sum();
    assert_eq!(total, inputs.len() as u64);
    let indices: Vec<u64> = records.iter().map(|r| r.index.0).collect();
    assert_eq!(indices, (0..records.len() as u64).collect::<Vec<_>>());

    let created = outcomes.iter().filter(|o| o.created()).count();
    assert_eq!(created, records.len(), "each category was created exactly once");
}

#[test]
fn shared_engine_across_threads() {
    let engine = Arc::new(ArtEngine::new(fuzzy(), &EngineConfig::default(), 4).unwrap());
    let inputs = Arc::new(grid(200));

    let handles: Vec<_> = (0..4)
        .map(|w| {
            let engine = Arc::clone(&engine);
            let inputs = Arc::clone(&inputs);
            std::thread::spawn(move || {
                inputs
                    .iter()
                    .skip(w)
                    .step_by(4)
                    .map(|p| engine.learn(p).unwrap())
                    .count()
            })
        })
        .collect();
    let learned: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

    assert_eq!(learned, 200);
    assert_eq!(engine.stats().unwrap().inputs, 200);
}

#[test]
fn single_worker_concurrent_run_equals_stream() {
    let config = EngineConfig::default().with_vigilance(0.85);
    let inputs = grid(150);

    let streamed = ArtEngine::new(fuzzy(), &config, 4).unwrap();
    let expected: Vec<CategoryIndex> = learn_stream(&streamed, &inputs)
        .unwrap()
        .iter()
        .map(|o| o.category)
        .collect();

    let pooled = ArtEngine::new(fuzzy(), &config, 4).unwrap();
    let results = learn_concurrent(&pooled, &inputs, 1).unwrap();
    let sequences: Vec<u64> = results.iter().map(|r| r.as_ref().unwrap().sequence).collect();

    // With one worker rayon may still visit inputs out of order; compare in commit order.
    let mut by_commit: Vec<(u64, usize)> = sequences.iter().copied().zip(0..).collect();
    by_commit.sort();
    let replay: Vec<Pattern> = by_commit.iter().map(|&(_, i)| inputs[i].clone()).collect();
    let replayed = ArtEngine::new(fuzzy(), &config, 4).unwrap();
    let replay_categories: Vec<CategoryIndex> = learn_stream(&replayed, &replay)
        .unwrap()
        .iter()
        .map(|o| o.category)
        .collect();
    let pooled_categories: Vec<CategoryIndex> = by_commit
        .iter()
        .map(|&(_, i)| results[i].as_ref().unwrap().category)
        .collect();

    assert_eq!(replay_categories, pooled_categories);
    assert_eq!(expected.len(), pooled_categories.len());
}
