//! Backend adapter: one opaque classifier behind the common call contract
//!
//! The adapter normalizes the raw output into a canonical outcome, records
//! latency with the performance tracker, and absorbs classifier failures so
//! they never reach the dispatcher.

use crate::backends::classifier::Classifier;
use crate::backends::registry::BackendDescriptor;
use crate::metrics::PerformanceTracker;
use crate::types::outcome::{PredictionOutcome, SentimentLabel};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, warn};

/// Wraps one loaded classifier.
pub struct BackendAdapter {
    key: String,
    display_name: String,
    label_map: HashMap<String, SentimentLabel>,
    classifier: Box<dyn Classifier>,
    tracker: Arc<PerformanceTracker>,
}

impl BackendAdapter {
    pub(crate) fn new(
        descriptor: &BackendDescriptor,
        classifier: Box<dyn Classifier>,
        tracker: Arc<PerformanceTracker>,
    ) -> Self {
        Self {
            key: descriptor.key.clone(),
            display_name: descriptor.display_name.clone(),
            label_map: descriptor.label_map.clone(),
            classifier,
            tracker,
        }
    }

    /// Registry key of the wrapped backend.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Display name (model identifier) of the wrapped backend.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Classify one text. Never fails: classifier errors become failed
    /// outcomes. Every call, success or failure, updates the tracker.
    pub fn classify(&self, text: &str) -> PredictionOutcome {
        let started = Instant::now();

        let outcome = match self.classifier.classify(text) {
            Ok(raw) => match raw.into_best() {
                Some(best) => PredictionOutcome::success(
                    self.key.clone(),
                    self.display_name.clone(),
                    self.normalize(&best.tag),
                    best.score.clamp(0.0, 1.0),
                    started.elapsed(),
                ),
                None => {
                    warn!(backend = %self.key, "Classifier returned no scored tags");
                    PredictionOutcome::failure(
                        self.key.clone(),
                        self.display_name.clone(),
                        started.elapsed(),
                    )
                }
            },
            Err(e) => {
                error!(backend = %self.key, error = %e, "Classifier call failed");
                PredictionOutcome::failure(
                    self.key.clone(),
                    self.display_name.clone(),
                    started.elapsed(),
                )
            }
        };

        self.tracker
            .record_call(&self.key, outcome.latency, outcome.success);
        outcome
    }

    /// Map a raw tag to the canonical vocabulary: the descriptor table first,
    /// then a case-insensitive infix heuristic, then `Neutral`.
    fn normalize(&self, raw_tag: &str) -> SentimentLabel {
        if let Some(&label) = self.label_map.get(raw_tag) {
            return label;
        }

        let lower = raw_tag.to_lowercase();
        if lower.contains("neg") {
            SentimentLabel::Negative
        } else if lower.contains("pos") {
            SentimentLabel::Positive
        } else {
            // "neu" and anything unmatched both land on Neutral
            SentimentLabel::Neutral
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::classifier::{RawPrediction, ScoredTag};
    use anyhow::bail;
    use std::time::Duration;

    struct Scripted {
        tag: &'static str,
        score: f64,
    }

    impl Classifier for Scripted {
        fn classify(&self, _text: &str) -> anyhow::Result<RawPrediction> {
            Ok(RawPrediction::Single(ScoredTag {
                tag: self.tag.to_string(),
                score: self.score,
            }))
        }
    }

    struct Failing;

    impl Classifier for Failing {
        fn classify(&self, _text: &str) -> anyhow::Result<RawPrediction> {
            bail!("inference exploded")
        }
    }

    struct RankedScripted(Vec<(&'static str, f64)>);

    impl Classifier for RankedScripted {
        fn classify(&self, _text: &str) -> anyhow::Result<RawPrediction> {
            Ok(RawPrediction::Ranked(
                self.0
                    .iter()
                    .map(|(tag, score)| ScoredTag {
                        tag: tag.to_string(),
                        score: *score,
                    })
                    .collect(),
            ))
        }
    }

    fn descriptor_with_labels(labels: &[(&str, SentimentLabel)]) -> BackendDescriptor {
        BackendDescriptor {
            key: "test".to_string(),
            display_name: "test-model".to_string(),
            label_map: labels
                .iter()
                .map(|(raw, label)| (raw.to_string(), *label))
                .collect(),
            vocabulary: crate::backends::classifier::TagVocabulary {
                positive: "POS".to_string(),
                negative: "NEG".to_string(),
                neutral: None,
            },
            output_shape: Default::default(),
        }
    }

    fn make_adapter(
        labels: &[(&str, SentimentLabel)],
        classifier: Box<dyn Classifier>,
    ) -> (BackendAdapter, Arc<PerformanceTracker>) {
        let tracker = Arc::new(PerformanceTracker::new());
        let descriptor = descriptor_with_labels(labels);
        (
            BackendAdapter::new(&descriptor, classifier, tracker.clone()),
            tracker,
        )
    }

    #[test]
    fn test_mapped_tag_uses_table() {
        let (adapter, _) = make_adapter(
            &[("LABEL_1", SentimentLabel::Positive)],
            Box::new(Scripted { tag: "LABEL_1", score: 0.9 }),
        );

        let outcome = adapter.classify("whatever");
        assert!(outcome.success);
        assert_eq!(outcome.label, SentimentLabel::Positive);
        assert_eq!(outcome.confidence, 0.9);
    }

    #[test]
    fn test_unmapped_tag_falls_back_to_infix() {
        let (adapter, _) = make_adapter(&[], Box::new(Scripted { tag: "NEGATIVE", score: 0.8 }));
        assert_eq!(adapter.classify("x").label, SentimentLabel::Negative);

        let (adapter, _) = make_adapter(&[], Box::new(Scripted { tag: "pos_class", score: 0.8 }));
        assert_eq!(adapter.classify("x").label, SentimentLabel::Positive);

        let (adapter, _) = make_adapter(&[], Box::new(Scripted { tag: "NEUTRAL", score: 0.8 }));
        assert_eq!(adapter.classify("x").label, SentimentLabel::Neutral);
    }

    #[test]
    fn test_unmatched_tag_defaults_to_neutral() {
        let (adapter, _) = make_adapter(&[], Box::new(Scripted { tag: "WEIRD_TAG", score: 0.8 }));
        let outcome = adapter.classify("x");

        assert!(outcome.success);
        assert_eq!(outcome.label, SentimentLabel::Neutral);
    }

    #[test]
    fn test_explicit_unknown_mapping() {
        let (adapter, _) = make_adapter(
            &[("other", SentimentLabel::Unknown)],
            Box::new(Scripted { tag: "other", score: 0.6 }),
        );

        assert_eq!(adapter.classify("x").label, SentimentLabel::Unknown);
    }

    #[test]
    fn test_ranked_output_picks_highest_score() {
        let (adapter, _) = make_adapter(
            &[
                ("LABEL_0", SentimentLabel::Negative),
                ("LABEL_2", SentimentLabel::Positive),
            ],
            Box::new(RankedScripted(vec![
                ("LABEL_0", 0.1),
                ("LABEL_1", 0.2),
                ("LABEL_2", 0.7),
            ])),
        );

        let outcome = adapter.classify("x");
        assert_eq!(outcome.label, SentimentLabel::Positive);
        assert_eq!(outcome.confidence, 0.7);
    }

    #[test]
    fn test_classifier_failure_is_absorbed() {
        let (adapter, tracker) = make_adapter(&[], Box::new(Failing));

        let outcome = adapter.classify("x");
        assert!(!outcome.success);
        assert_eq!(outcome.label, SentimentLabel::Error);
        assert_eq!(outcome.confidence, 0.0);

        let snapshot = tracker.snapshot("test").unwrap();
        assert_eq!(snapshot.total_errors, 1);
        assert_eq!(snapshot.total_predictions, 0);
    }

    #[test]
    fn test_empty_ranked_output_is_a_failure() {
        let (adapter, _) = make_adapter(&[], Box::new(RankedScripted(Vec::new())));

        let outcome = adapter.classify("x");
        assert!(!outcome.success);
        assert_eq!(outcome.label, SentimentLabel::Error);
    }

    #[test]
    fn test_confidence_clamped_to_unit_interval() {
        let (adapter, _) = make_adapter(&[], Box::new(Scripted { tag: "pos", score: 1.7 }));
        assert_eq!(adapter.classify("x").confidence, 1.0);
    }

    #[test]
    fn test_every_call_updates_tracker() {
        let (adapter, tracker) = make_adapter(&[], Box::new(Scripted { tag: "pos", score: 0.9 }));

        adapter.classify("one");
        adapter.classify("two");

        let snapshot = tracker.snapshot("test").unwrap();
        assert_eq!(snapshot.total_predictions, 2);
        assert_eq!(snapshot.total_errors, 0);
        assert!(snapshot.average_latency >= Duration::ZERO);
    }
}
