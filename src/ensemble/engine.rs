//! Multi-backend sentiment engine: parallel comparison, sequential batch,
//! performance snapshots.

use crate::config::AppConfig;
use crate::ensemble::aggregator::ConsensusAggregator;
use crate::backends::registry::BackendRegistry;
use crate::error::EngineError;
use crate::metrics::{PerformanceSnapshot, PerformanceTracker};
use crate::types::outcome::{ConsensusResult, PredictionOutcome};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

/// The consensus engine. Constructed once at startup and shared by handle;
/// there is no global instance.
pub struct SentimentEngine {
    registry: BackendRegistry,
    aggregator: ConsensusAggregator,
    tracker: Arc<PerformanceTracker>,
}

impl SentimentEngine {
    /// Build the engine from configuration. Fails with
    /// [`EngineError::BackendLoadFailure`] only when zero backends load.
    pub fn new(config: &AppConfig) -> Result<Self, EngineError> {
        let tracker = Arc::new(PerformanceTracker::new());
        let descriptors = config
            .backends
            .iter()
            .map(|backend| backend.to_descriptor())
            .collect();
        let registry = BackendRegistry::load(descriptors, tracker.clone())?;

        info!(
            backends = registry.available_backends().len(),
            "Sentiment engine initialized"
        );
        Ok(Self::with_registry(registry, tracker))
    }

    pub(crate) fn with_registry(
        registry: BackendRegistry,
        tracker: Arc<PerformanceTracker>,
    ) -> Self {
        Self {
            registry,
            aggregator: ConsensusAggregator::new(),
            tracker,
        }
    }

    /// Keys of all loaded backends, sorted.
    pub fn available_backends(&self) -> Vec<String> {
        self.registry.available_backends()
    }

    /// Display name for a loaded backend key.
    pub fn display_name(&self, key: &str) -> Option<&str> {
        self.registry
            .descriptor_for(key)
            .ok()
            .map(|descriptor| descriptor.display_name.as_str())
    }

    /// Fan one text out to the requested backends and aggregate a consensus.
    ///
    /// Omitted `backends` means all available ones; requested keys missing
    /// from the registry are silently skipped. Every spawned unit runs to
    /// completion before this returns, and one backend's failure never
    /// cancels or delays its siblings. Outcomes land in completion order.
    pub async fn compare(&self, text: &str, backends: Option<&[String]>) -> ConsensusResult {
        let started = Instant::now();
        let requested: Vec<String> = match backends {
            Some(keys) => keys.to_vec(),
            None => self.registry.available_backends(),
        };

        let mut tasks = JoinSet::new();
        for key in &requested {
            if let Some(adapter) = self.registry.adapter(key) {
                let text = text.to_string();
                tasks.spawn_blocking(move || adapter.classify(&text));
            }
        }

        let mut outcomes = Vec::with_capacity(requested.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                // A panicked unit loses its outcome but never its siblings'.
                Err(e) => error!(error = %e, "Backend task failed to join"),
            }
        }

        let consensus = self.aggregator.aggregate(&outcomes);
        let elapsed = started.elapsed();

        debug!(
            backends = outcomes.len(),
            consensus = %consensus.label,
            agreement = consensus.agreement_score,
            elapsed_us = elapsed.as_micros() as u64,
            "Comparison complete"
        );

        ConsensusResult {
            text: text.to_string(),
            outcomes,
            consensus: consensus.label,
            average_confidence: consensus.average_confidence,
            agreement_score: consensus.agreement_score,
            elapsed,
        }
    }

    /// Classify an ordered list of texts with one backend, strictly
    /// sequentially. The output has exactly the input's length and order; a
    /// failure on item `i` leaves a failed outcome at position `i` and
    /// processing continues.
    ///
    /// With no explicit key the lexicographically smallest available backend
    /// is used for the whole batch. An unknown explicit key is
    /// [`EngineError::BackendUnavailable`].
    pub fn batch_predict(
        &self,
        texts: &[String],
        backend: Option<&str>,
    ) -> Result<Vec<PredictionOutcome>, EngineError> {
        let key = match backend {
            Some(key) => key.to_string(),
            None => self
                .registry
                .available_backends()
                .into_iter()
                .next()
                .ok_or(EngineError::NoBackends)?,
        };

        let adapter = self
            .registry
            .adapter(&key)
            .ok_or_else(|| EngineError::BackendUnavailable(key.clone()))?;

        info!(backend = %key, count = texts.len(), "Processing batch");

        let mut outcomes = Vec::with_capacity(texts.len());
        for (i, text) in texts.iter().enumerate() {
            outcomes.push(adapter.classify(text));

            if (i + 1) % 10 == 0 {
                debug!(processed = i + 1, total = texts.len(), "Batch progress");
            }
        }

        Ok(outcomes)
    }

    /// Per-backend counter views.
    pub fn performance_snapshot(&self) -> HashMap<String, PerformanceSnapshot> {
        self.tracker.snapshot_all()
    }

    /// Handle to the shared performance tracker.
    pub fn tracker(&self) -> Arc<PerformanceTracker> {
        self.tracker.clone()
    }
}
