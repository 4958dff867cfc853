//! Prediction and consensus data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Canonical sentiment vocabulary.
///
/// Raw backend tags never appear outside the adapter; everything downstream
/// works with this closed set. `Error` marks a failed backend call (or a
/// consensus over zero successful calls) and always pairs with confidence 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
    Unknown,
    Error,
}

impl SentimentLabel {
    /// Fixed label order used when tallying consensus votes. Ties on summed
    /// confidence resolve to whichever label comes first here.
    pub const VOTE_ORDER: [SentimentLabel; 4] = [
        SentimentLabel::Positive,
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
        SentimentLabel::Unknown,
    ];

    /// Parse a canonical label name from configuration (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "positive" => Some(SentimentLabel::Positive),
            "negative" => Some(SentimentLabel::Negative),
            "neutral" => Some(SentimentLabel::Neutral),
            "unknown" => Some(SentimentLabel::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Negative => "Negative",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::Unknown => "Unknown",
            SentimentLabel::Error => "Error",
        };
        f.write_str(name)
    }
}

/// Normalized result of one backend call.
#[derive(Debug, Clone)]
pub struct PredictionOutcome {
    /// Registry key of the backend that produced this outcome
    pub backend: String,
    /// Backend display name (the underlying model identifier)
    pub model_name: String,
    /// Canonical sentiment label
    pub label: SentimentLabel,
    /// Confidence in [0, 1]; always 0.0 when the call failed
    pub confidence: f64,
    /// Elapsed time of the backend call
    pub latency: Duration,
    /// Whether the backend call completed successfully
    pub success: bool,
    /// When the outcome was produced
    pub timestamp: DateTime<Utc>,
}

impl PredictionOutcome {
    /// Build a successful outcome.
    pub fn success(
        backend: String,
        model_name: String,
        label: SentimentLabel,
        confidence: f64,
        latency: Duration,
    ) -> Self {
        Self {
            backend,
            model_name,
            label,
            confidence,
            latency,
            success: true,
            timestamp: Utc::now(),
        }
    }

    /// Build a failed outcome: label `Error`, confidence 0.
    pub fn failure(backend: String, model_name: String, latency: Duration) -> Self {
        Self {
            backend,
            model_name,
            label: SentimentLabel::Error,
            confidence: 0.0,
            latency,
            success: false,
            timestamp: Utc::now(),
        }
    }
}

/// Result of comparing one text across multiple backends.
///
/// `outcomes` holds one entry per dispatched backend in completion order;
/// callers needing a deterministic order should sort by backend key.
#[derive(Debug, Clone)]
pub struct ConsensusResult {
    /// The analyzed text
    pub text: String,
    /// Per-backend outcomes, successes and failures alike
    pub outcomes: Vec<PredictionOutcome>,
    /// Consensus label chosen by confidence-weighted vote
    pub consensus: SentimentLabel,
    /// Mean confidence over successful outcomes (0.0 if none succeeded)
    pub average_confidence: f64,
    /// Fraction of successful outcomes agreeing with the consensus
    pub agreement_score: f64,
    /// Total wall-clock duration of the dispatch
    pub elapsed: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_parse() {
        assert_eq!(SentimentLabel::parse("positive"), Some(SentimentLabel::Positive));
        assert_eq!(SentimentLabel::parse("NEGATIVE"), Some(SentimentLabel::Negative));
        assert_eq!(SentimentLabel::parse("Neutral"), Some(SentimentLabel::Neutral));
        assert_eq!(SentimentLabel::parse("unknown"), Some(SentimentLabel::Unknown));
        assert_eq!(SentimentLabel::parse("error"), None);
        assert_eq!(SentimentLabel::parse("WEIRD_TAG"), None);
    }

    #[test]
    fn test_failed_outcome_invariants() {
        let outcome = PredictionOutcome::failure(
            "yelp".to_string(),
            "fitsblb/YelpReviewsAnalyzer".to_string(),
            Duration::from_millis(3),
        );

        assert!(!outcome.success);
        assert_eq!(outcome.label, SentimentLabel::Error);
        assert_eq!(outcome.confidence, 0.0);
    }
}
