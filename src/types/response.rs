//! JSON response projections published on the result subject
//!
//! Numeric fields are rounded to four decimals and timestamps rendered as
//! ISO-8601 strings; the core types stay untouched.

use crate::metrics::PerformanceSnapshot;
use crate::types::outcome::{ConsensusResult, PredictionOutcome, SentimentLabel};
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// One response message, shape selected by the request operation.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AnalyzeResponse {
    Comparison(ComparisonResponse),
    Batch(BatchResponse),
    Stats(StatsResponse),
    Error(ErrorResponse),
}

/// Serializable view of a single backend outcome.
#[derive(Debug, Clone, Serialize)]
pub struct OutcomeView {
    pub backend: String,
    pub model: String,
    pub sentiment: SentimentLabel,
    pub confidence: f64,
    /// Backend call latency in seconds
    pub processing_time: f64,
    pub timestamp: String,
}

impl From<&PredictionOutcome> for OutcomeView {
    fn from(outcome: &PredictionOutcome) -> Self {
        Self {
            backend: outcome.backend.clone(),
            model: outcome.model_name.clone(),
            sentiment: outcome.label,
            confidence: round4(outcome.confidence),
            processing_time: round4(outcome.latency.as_secs_f64()),
            timestamp: outcome.timestamp.to_rfc3339(),
        }
    }
}

/// Consensus summary block of a comparison response.
#[derive(Debug, Clone, Serialize)]
pub struct ConsensusView {
    pub sentiment: SentimentLabel,
    pub confidence: f64,
    pub agreement_score: f64,
}

/// Response to a `compare` request.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonResponse {
    pub request_id: String,
    pub status: String,
    pub text: String,
    pub consensus: ConsensusView,
    pub model_results: Vec<OutcomeView>,
    /// Total dispatch duration in seconds
    pub processing_time: f64,
    pub timestamp: String,
}

impl ComparisonResponse {
    pub fn new(request_id: String, result: &ConsensusResult) -> Self {
        Self {
            request_id,
            status: "success".to_string(),
            text: result.text.clone(),
            consensus: ConsensusView {
                sentiment: result.consensus,
                confidence: round4(result.average_confidence),
                agreement_score: round4(result.agreement_score),
            },
            model_results: result.outcomes.iter().map(OutcomeView::from).collect(),
            processing_time: round4(result.elapsed.as_secs_f64()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Response to a `batch` request; `results[i]` corresponds to `texts[i]`.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResponse {
    pub request_id: String,
    pub status: String,
    pub count: usize,
    pub results: Vec<OutcomeView>,
    pub timestamp: String,
}

impl BatchResponse {
    pub fn new(request_id: String, outcomes: &[PredictionOutcome]) -> Self {
        Self {
            request_id,
            status: "success".to_string(),
            count: outcomes.len(),
            results: outcomes.iter().map(OutcomeView::from).collect(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Per-backend performance view.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotView {
    pub model_name: String,
    pub total_predictions: u64,
    pub total_errors: u64,
    /// Mean latency of successful calls, in seconds
    pub average_processing_time: f64,
    pub error_rate: f64,
    /// One-time backend load latency, in seconds
    pub load_time: f64,
}

impl SnapshotView {
    pub fn new(model_name: String, snapshot: &PerformanceSnapshot) -> Self {
        Self {
            model_name,
            total_predictions: snapshot.total_predictions,
            total_errors: snapshot.total_errors,
            average_processing_time: round4(snapshot.average_latency.as_secs_f64()),
            error_rate: round4(snapshot.error_rate),
            load_time: round4(snapshot.load_latency.as_secs_f64()),
        }
    }
}

/// Response to a `stats` request.
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub request_id: String,
    pub status: String,
    pub backends: BTreeMap<String, SnapshotView>,
    pub timestamp: String,
}

impl StatsResponse {
    pub fn new(request_id: String, backends: BTreeMap<String, SnapshotView>) -> Self {
        Self {
            request_id,
            status: "success".to_string(),
            backends,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Error response for rejected or failed requests.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub request_id: String,
    pub status: String,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(request_id: String, error: String) -> Self {
        Self {
            request_id,
            status: "error".to_string(),
            error,
        }
    }
}
