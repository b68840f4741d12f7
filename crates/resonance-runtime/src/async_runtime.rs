//! Async driver for an engine shared across tokio tasks.
//!
//! Learning is CPU-bound, so every call runs on tokio's blocking pool.
//!
//! # Feature Flag
//!
//! This module requires the `async` feature:
//! ```toml
//! resonance-runtime = { version = "1.0", features = ["async"] }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use resonance_runtime::async_runtime::AsyncEngine;
//! use std::time::Duration;
//!
//! let engine = AsyncEngine::new(ArtEngine::new(fuzzy(), &config, 4)?);
//! match engine.learn_with_timeout(pattern, Duration::from_millis(5)).await {
//!     Ok(outcome) => println!("{}", outcome.category),
//!     Err(ResonanceError::Cancelled) => println!("timed out, nothing committed"),
//!     Err(e) => return Err(e),
//! }
//! ```

#![cfg(feature = "async")]

use crate::batch::learn_stream;
use crate::engine::{ArtEngine, LearnOutcome, Prediction};
use crate::metrics::EngineStats;
use crate::search::CancelToken;
use resonance_core::error::{ResonanceError, Result};
use resonance_core::pattern::Pattern;
use resonance_core::strategy::{SimilarityStrategy, UpdateStrategy};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinError;
use tracing::debug;

fn join_failed(err: JoinError) -> ResonanceError {
    ResonanceError::TaskFailed(err.to_string())
}

/// Cloneable async handle to one engine.
pub struct AsyncEngine<S: SimilarityStrategy, U> {
    engine: Arc<ArtEngine<S, U>>,
}

impl<S: SimilarityStrategy, U> Clone for AsyncEngine<S, U> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
        }
    }
}

impl<S, U> AsyncEngine<S, U>
where
    S: SimilarityStrategy + 'static,
    U: UpdateStrategy<Weight = S::Weight> + 'static,
    S::Weight: 'static,
{
    pub fn new(engine: ArtEngine<S, U>) -> Self {
        Self::from_shared(Arc::new(engine))
    }

    pub fn from_shared(engine: Arc<ArtEngine<S, U>>) -> Self {
        Self { engine }
    }

    /// The shared engine, for synchronous callers.
    pub fn inner(&self) -> Arc<ArtEngine<S, U>> {
        Arc::clone(&self.engine)
    }

    pub async fn learn(&self, pattern: Pattern) -> Result<LearnOutcome> {
        let engine = Arc::clone(&self.engine);
        tokio::task::spawn_blocking(move || engine.learn(&pattern))
            .await
            .map_err(join_failed)?
    }

    /// Learn, abandoning the search if it has not reached its commit within `timeout`.
    ///
    /// A search that already started committing when the deadline passed
    /// finishes and its outcome is returned.
    pub async fn learn_with_timeout(&self, pattern: Pattern, timeout: Duration) -> Result<LearnOutcome> {
        let engine = Arc::clone(&self.engine);
        let token = CancelToken::new();
        let worker_token = token.clone();
        let mut handle =
            tokio::task::spawn_blocking(move || engine.learn_cancellable(&pattern, &worker_token));

        let waited = tokio::time::timeout(timeout, &mut handle).await;
        match waited {
            Ok(joined) => joined.map_err(join_failed)?,
            Err(_) => {
                debug!("Learn deadline of {:?} passed, cancelling", timeout);
                token.cancel();
                handle.await.map_err(join_failed)?
            }
        }
    }

    /// Learn a batch as one ordered stream on the blocking pool.
    pub async fn learn_batch(&self, patterns: Vec<Pattern>) -> Result<Vec<LearnOutcome>> {
        let engine = Arc::clone(&self.engine);
        tokio::task::spawn_blocking(move || learn_stream(&engine, &patterns))
            .await
            .map_err(join_failed)?
    }

    pub async fn predict(&self, pattern: Pattern) -> Result<Option<Prediction>> {
        let engine = Arc::clone(&self.engine);
        tokio::task::spawn_blocking(move || engine.predict(&pattern))
            .await
            .map_err(join_failed)?
    }

    pub fn stats(&self) -> Result<EngineStats> {
        self.engine.stats()
    }
}
