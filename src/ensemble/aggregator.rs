//! Consensus aggregation across backend outcomes

use crate::types::outcome::{PredictionOutcome, SentimentLabel};
use std::collections::HashMap;

/// Aggregate judgment over the successful outcomes of one comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Consensus {
    pub label: SentimentLabel,
    pub average_confidence: f64,
    pub agreement_score: f64,
}

/// Computes the consensus label by confidence-weighted vote, plus the mean
/// confidence and an unweighted agreement score. Failed outcomes never
/// contribute; when every outcome failed the consensus is the `Error`
/// sentinel with confidence and agreement both zero.
#[derive(Debug, Default)]
pub struct ConsensusAggregator;

impl ConsensusAggregator {
    pub fn new() -> Self {
        Self
    }

    pub fn aggregate(&self, outcomes: &[PredictionOutcome]) -> Consensus {
        let successful: Vec<&PredictionOutcome> =
            outcomes.iter().filter(|o| o.success).collect();

        if successful.is_empty() {
            return Consensus {
                label: SentimentLabel::Error,
                average_confidence: 0.0,
                agreement_score: 0.0,
            };
        }

        let mut votes: HashMap<SentimentLabel, f64> = HashMap::new();
        let mut confidence_sum = 0.0;
        for outcome in &successful {
            *votes.entry(outcome.label).or_insert(0.0) += outcome.confidence;
            confidence_sum += outcome.confidence;
        }

        // Ties on summed confidence resolve by the fixed label order, keeping
        // the vote deterministic.
        let mut label = SentimentLabel::Neutral;
        let mut best_vote = f64::NEG_INFINITY;
        for candidate in SentimentLabel::VOTE_ORDER {
            if let Some(&vote) = votes.get(&candidate) {
                if vote > best_vote {
                    best_vote = vote;
                    label = candidate;
                }
            }
        }

        let average_confidence = confidence_sum / successful.len() as f64;
        let agreeing = successful.iter().filter(|o| o.label == label).count();
        let agreement_score = agreeing as f64 / successful.len() as f64;

        Consensus {
            label,
            average_confidence,
            agreement_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn outcome(backend: &str, label: SentimentLabel, confidence: f64) -> PredictionOutcome {
        PredictionOutcome::success(
            backend.to_string(),
            format!("model/{}", backend),
            label,
            confidence,
            Duration::from_millis(1),
        )
    }

    fn failed(backend: &str) -> PredictionOutcome {
        PredictionOutcome::failure(
            backend.to_string(),
            format!("model/{}", backend),
            Duration::from_millis(1),
        )
    }

    #[test]
    fn test_unanimous_vote() {
        let aggregator = ConsensusAggregator::new();
        let outcomes = vec![
            outcome("a", SentimentLabel::Positive, 0.90),
            outcome("b", SentimentLabel::Positive, 0.80),
        ];

        let consensus = aggregator.aggregate(&outcomes);
        assert_eq!(consensus.label, SentimentLabel::Positive);
        assert!((consensus.average_confidence - 0.85).abs() < 1e-9);
        assert_eq!(consensus.agreement_score, 1.0);
    }

    #[test]
    fn test_confidence_weight_beats_head_count() {
        let aggregator = ConsensusAggregator::new();
        // Two low-confidence negatives (sum 0.6) vs one strong positive (0.9).
        let outcomes = vec![
            outcome("a", SentimentLabel::Negative, 0.30),
            outcome("b", SentimentLabel::Negative, 0.30),
            outcome("c", SentimentLabel::Positive, 0.90),
        ];

        let consensus = aggregator.aggregate(&outcomes);
        assert_eq!(consensus.label, SentimentLabel::Positive);
        // Agreement counts heads, not weight: 1 of 3 matches the consensus.
        assert!((consensus.agreement_score - 1.0 / 3.0).abs() < 1e-9);
        assert!((consensus.average_confidence - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_failed_outcomes_are_excluded() {
        let aggregator = ConsensusAggregator::new();
        let outcomes = vec![
            outcome("a", SentimentLabel::Positive, 0.90),
            outcome("b", SentimentLabel::Positive, 0.80),
            failed("c"),
        ];

        let consensus = aggregator.aggregate(&outcomes);
        assert_eq!(consensus.label, SentimentLabel::Positive);
        assert!((consensus.average_confidence - 0.85).abs() < 1e-9);
        assert_eq!(consensus.agreement_score, 1.0);
    }

    #[test]
    fn test_all_failed_yields_error_sentinel() {
        let aggregator = ConsensusAggregator::new();
        let outcomes = vec![failed("a"), failed("b")];

        let consensus = aggregator.aggregate(&outcomes);
        assert_eq!(consensus.label, SentimentLabel::Error);
        assert_eq!(consensus.average_confidence, 0.0);
        assert_eq!(consensus.agreement_score, 0.0);
    }

    #[test]
    fn test_empty_input_yields_error_sentinel() {
        let consensus = ConsensusAggregator::new().aggregate(&[]);
        assert_eq!(consensus.label, SentimentLabel::Error);
    }

    #[test]
    fn test_tie_breaks_by_label_order() {
        let aggregator = ConsensusAggregator::new();
        let outcomes = vec![
            outcome("a", SentimentLabel::Neutral, 0.60),
            outcome("b", SentimentLabel::Positive, 0.60),
        ];

        // Equal summed confidence; Positive precedes Neutral in the fixed order.
        let consensus = aggregator.aggregate(&outcomes);
        assert_eq!(consensus.label, SentimentLabel::Positive);
        assert_eq!(consensus.agreement_score, 0.5);
    }

    #[test]
    fn test_single_success_is_its_own_consensus() {
        let aggregator = ConsensusAggregator::new();
        let outcomes = vec![outcome("a", SentimentLabel::Unknown, 0.40), failed("b")];

        let consensus = aggregator.aggregate(&outcomes);
        assert_eq!(consensus.label, SentimentLabel::Unknown);
        assert!((consensus.average_confidence - 0.40).abs() < 1e-9);
        assert_eq!(consensus.agreement_score, 1.0);
    }
}
