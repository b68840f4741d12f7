//! Clustering Demo: streaming synthetic blobs through resonance engines
//!
//! Protocol:
//! 1. Generate labelled blobs in the unit square
//! 2. Learn them as one ordered stream (fuzzy boxes and hyperspheres)
//! 3. Replay the stream with parallel scoring and confirm identical assignments
//! 4. Learn them concurrently from several workers
//! 5. Learn them supervised and measure label accuracy on held-out points
//!
//! Set `RUST_LOG=debug` to watch categories being created.

mod config;

use anyhow::Result;
use config::{DataConfig, DemoConfig};
use resonance::prelude::*;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Labelled points drawn around centres evenly spaced on a circle.
fn blobs(data: &DataConfig, seed_offset: u64) -> Vec<([f64; 2], usize)> {
    let mut state = data.seed.wrapping_add(seed_offset);
    let mut uniform = move || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (state >> 11) as f64 / (1u64 << 53) as f64
    };

    let spread = data.spread;
    let mut jitter = move || (uniform() + uniform() + uniform() - 1.5) * spread * 2.0;

    let mut points = Vec::with_capacity(data.clusters * data.points_per_cluster);
    for _ in 0..data.points_per_cluster {
        for class in 0..data.clusters {
            let angle = class as f64 / data.clusters.max(1) as f64 * std::f64::consts::TAU;
            let x = (0.5 + 0.3 * angle.cos() + jitter()).clamp(0.0, 1.0);
            let y = (0.5 + 0.3 * angle.sin() + jitter()).clamp(0.0, 1.0);
            points.push(([x, y], class));
        }
    }
    points
}

fn complement_coded(point: &[f64; 2]) -> Result<Pattern> {
    Ok(Pattern::new(vec![point[0], point[1], 1.0 - point[0], 1.0 - point[1]])?)
}

/// Fraction of points whose category's majority class is their own class.
fn purity(assignments: &[(CategoryIndex, usize)]) -> f64 {
    let mut votes: BTreeMap<CategoryIndex, BTreeMap<usize, usize>> = BTreeMap::new();
    for &(category, class) in assignments {
        *votes.entry(category).or_default().entry(class).or_default() += 1;
    }
    let majority: usize = votes
        .values()
        .map(|classes| classes.values().copied().max().unwrap_or(0))
        .sum();
    majority as f64 / assignments.len().max(1) as f64
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = DemoConfig::load(std::env::args().nth(1).map(PathBuf::from).as_deref())?;
    let data = blobs(&config.data, 0);
    let held_out = blobs(&config.data, 1);

    println!("╔══════════════════════════════════════════════════════╗");
    println!("║  Resonance: online clustering of synthetic blobs     ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();
    println!(
        "Data: {} clusters x {} points, spread {:.3}",
        config.data.clusters, config.data.points_per_cluster, config.data.spread
    );
    println!();

    // --- Phase 1: ordered stream, fuzzy boxes ---
    let patterns: Vec<Pattern> = data
        .iter()
        .map(|(p, _)| complement_coded(p))
        .collect::<Result<_>>()?;

    let fuzzy_engine = ArtEngine::new(
        fuzzy(),
        &config.engine.clone().with_parallelism(Parallelism::Sequential),
        4,
    )?;
    let outcomes = learn_stream(&fuzzy_engine, &patterns)?;
    let assignments: Vec<(CategoryIndex, usize)> = outcomes
        .iter()
        .zip(&data)
        .map(|(o, (_, class))| (o.category, *class))
        .collect();
    println!("── Fuzzy ─────────────────────────────────────────────");
    println!("  categories: {}", fuzzy_engine.len()?);
    println!("  purity:     {:.3}", purity(&assignments));

    // --- Phase 2: replay with parallel scoring ---
    let parallel_engine = ArtEngine::new(
        fuzzy(),
        &config.engine.clone().with_parallelism(Parallelism::Always),
        4,
    )?;
    let replay = learn_stream(&parallel_engine, &patterns)?;
    let identical = replay
        .iter()
        .zip(&outcomes)
        .all(|(a, b)| a.category == b.category && a.resonated == b.resonated);
    println!("  replay with parallel scoring identical: {}", identical);
    println!();

    // --- Phase 3: hyperspheres ---
    let points: Vec<Pattern> = data
        .iter()
        .map(|(p, _)| Pattern::new(p.to_vec()))
        .collect::<std::result::Result<_, _>>()?;
    let sphere_engine = ArtEngine::new(hypersphere(config.run.radius_bound)?, &config.engine, 2)?;
    let sphere_outcomes = learn_stream(&sphere_engine, &points)?;
    let sphere_assignments: Vec<(CategoryIndex, usize)> = sphere_outcomes
        .iter()
        .zip(&data)
        .map(|(o, (_, class))| (o.category, *class))
        .collect();
    println!("── Hypersphere ───────────────────────────────────────");
    println!("  categories: {}", sphere_engine.len()?);
    println!("  purity:     {:.3}", purity(&sphere_assignments));
    println!();

    // --- Phase 4: concurrent workers on one store ---
    let shared = ArtEngine::new(fuzzy(), &config.engine, 4)?;
    let results = learn_concurrent(&shared, &patterns, config.run.workers)?;
    let failures = results.iter().filter(|r| r.is_err()).count();
    let stats = shared.stats()?;
    println!("── Concurrent ({} workers) ─────────────────────────────", config.run.workers);
    println!("  categories:     {}", stats.categories);
    println!("  commit retries: {}", stats.commit_retries);
    println!("  failures:       {}", failures);
    println!();

    // --- Phase 5: supervised ---
    let controller = MatchTrackingController::new(
        fuzzy(),
        fuzzy(),
        &config.supervised,
        4,
        config.data.clusters,
    )?;
    for ((_, class), pattern) in data.iter().zip(&patterns) {
        controller.learn_supervised(pattern, &Pattern::one_hot(*class, config.data.clusters)?)?;
    }

    // Map label categories back to classes through the one-hot they learned.
    let label_class: BTreeMap<CategoryIndex, usize> = controller
        .label()
        .export_categories()?
        .into_iter()
        .filter_map(|r| {
            r.weight
                .iter()
                .position(|&w| w > 0.5)
                .map(|class| (r.index, class))
        })
        .collect();

    let mut correct = 0;
    for (point, class) in &held_out {
        let predicted = controller
            .predict_label(&complement_coded(point)?)?
            .and_then(|p| p.label)
            .and_then(|label| label_class.get(&label).copied());
        if predicted == Some(*class) {
            correct += 1;
        }
    }
    let supervised = controller.stats()?;
    println!("── Supervised ────────────────────────────────────────");
    println!("  input categories:   {}", supervised.input.categories);
    println!("  conflicts resolved: {}", supervised.conflicts_resolved);
    println!(
        "  held-out accuracy:  {:.3}",
        correct as f64 / held_out.len().max(1) as f64
    );
    println!();

    info!("Fuzzy engine stats: {}", serde_json::to_string(&fuzzy_engine.stats()?)?);
    println!("{}", serde_json::to_string_pretty(&supervised)?);
    Ok(())
}
