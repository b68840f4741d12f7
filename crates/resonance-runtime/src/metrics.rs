//! Engine counters.
//!
//! Counters are relaxed atomics: they are observability, not part of the
//! commit protocol, so a reader may see them a step behind the store.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters owned by an engine.
#[derive(Debug, Default)]
pub struct EngineMetrics {
    inputs: AtomicU64,
    resonances: AtomicU64,
    created: AtomicU64,
    degraded: AtomicU64,
    resets: AtomicU64,
    commit_retries: AtomicU64,
    cancelled: AtomicU64,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_resonance(&self, resets: usize) {
        self.inputs.fetch_add(1, Ordering::Relaxed);
        self.resonances.fetch_add(1, Ordering::Relaxed);
        self.resets.fetch_add(resets as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_created(&self, resets: usize) {
        self.inputs.fetch_add(1, Ordering::Relaxed);
        self.created.fetch_add(1, Ordering::Relaxed);
        self.resets.fetch_add(resets as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_degraded(&self, resets: usize) {
        self.inputs.fetch_add(1, Ordering::Relaxed);
        self.degraded.fetch_add(1, Ordering::Relaxed);
        self.resets.fetch_add(resets as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_retry(&self) {
        self.commit_retries.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_cancelled(&self) {
        self.cancelled.fetch_add(1, Ordering::Relaxed);
    }

    /// Read every counter.
    pub fn snapshot(&self, categories: usize) -> EngineStats {
        EngineStats {
            categories,
            inputs: self.inputs.load(Ordering::Relaxed),
            resonances: self.resonances.load(Ordering::Relaxed),
            created: self.created.load(Ordering::Relaxed),
            degraded: self.degraded.load(Ordering::Relaxed),
            resets: self.resets.load(Ordering::Relaxed),
            commit_retries: self.commit_retries.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time engine statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EngineStats {
    pub categories: usize,
    /// Inputs committed (resonated + created + degraded).
    pub inputs: u64,
    pub resonances: u64,
    pub created: u64,
    /// Inputs routed past a full store without passing vigilance.
    pub degraded: u64,
    /// Candidates rejected by the vigilance test across all searches.
    pub resets: u64,
    /// Commits that lost a race and searched again.
    pub commit_retries: u64,
    pub cancelled: u64,
}

impl EngineStats {
    /// Fraction of inputs absorbed by an existing category.
    pub fn resonance_ratio(&self) -> f64 {
        if self.inputs == 0 {
            0.0
        } else {
            self.resonances as f64 / self.inputs as f64
        }
    }

    /// Average resets per committed input.
    pub fn avg_resets(&self) -> f64 {
        if self.inputs == 0 {
            0.0
        } else {
            self.resets as f64 / self.inputs as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let m = EngineMetrics::new();
        m.record_created(0);
        m.record_resonance(2);
        m.record_resonance(1);
        m.record_degraded(4);
        m.record_retry();

        let stats = m.snapshot(1);
        assert_eq!(stats.inputs, 4);
        assert_eq!(stats.resonances, 2);
        assert_eq!(stats.created, 1);
        assert_eq!(stats.degraded, 1);
        assert_eq!(stats.resets, 7);
        assert_eq!(stats.commit_retries, 1);
        assert!((stats.resonance_ratio() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn empty_ratios_are_zero() {
        let stats = EngineStats::default();
        assert_eq!(stats.resonance_ratio(), 0.0);
        assert_eq!(stats.avg_resets(), 0.0);
    }
}
