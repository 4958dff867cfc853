//! Configuration management for the sentiment ensemble service

use crate::backends::classifier::{OutputShape, TagVocabulary};
use crate::backends::registry::BackendDescriptor;
use crate::types::outcome::SentimentLabel;
use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub nats: NatsConfig,
    /// One entry per sentiment backend; loaded once into the registry
    #[serde(default = "default_backends")]
    pub backends: Vec<BackendConfig>,
    pub pipeline: PipelineConfig,
    pub logging: LoggingConfig,
}

/// NATS connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NatsConfig {
    /// NATS server URL
    pub url: String,
    /// Subject for incoming analysis requests
    pub request_subject: String,
    /// Subject for outgoing analysis results
    pub result_subject: String,
}

/// One backend's identity, label-normalization table, and classifier
/// parameters. The label table maps the backend's raw tags to the canonical
/// vocabulary and is immutable once the registry loads.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Registry key
    pub key: String,
    /// Model identifier used as the display name
    pub model: String,
    /// Raw tag -> canonical label name (positive/negative/neutral/unknown)
    pub labels: HashMap<String, String>,
    /// The backend's native tag names
    pub tags: TagVocabulary,
    /// Output shape the backend emits ("single" or "ranked")
    #[serde(default)]
    pub output: OutputShape,
}

impl BackendConfig {
    /// Build the immutable registry descriptor. Mapping entries with an
    /// unrecognized canonical name are dropped with a warning; the adapter's
    /// fallback heuristic covers the raw tags they would have matched.
    pub fn to_descriptor(&self) -> BackendDescriptor {
        let mut label_map = HashMap::new();
        for (raw, canonical) in &self.labels {
            match SentimentLabel::parse(canonical) {
                Some(label) => {
                    label_map.insert(raw.clone(), label);
                }
                None => warn!(
                    backend = %self.key,
                    raw = %raw,
                    canonical = %canonical,
                    "Unrecognized canonical label in mapping, skipping entry"
                ),
            }
        }

        BackendDescriptor {
            key: self.key.clone(),
            display_name: self.model.clone(),
            label_map,
            vocabulary: self.tags.clone(),
            output_shape: self.output,
        }
    }
}

/// Request-processing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Number of concurrently processed requests
    pub workers: usize,
    /// Maximum accepted text length, in bytes
    #[serde(default = "default_max_text_length")]
    pub max_text_length: usize,
    /// Maximum number of texts per batch request
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
    /// Seconds between periodic performance summaries
    #[serde(default = "default_report_interval_secs")]
    pub report_interval_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

fn default_max_text_length() -> usize {
    1000
}

fn default_max_batch_size() -> usize {
    50
}

fn default_report_interval_secs() -> u64 {
    30
}

fn default_backends() -> Vec<BackendConfig> {
    fn labels(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(raw, canonical)| (raw.to_string(), canonical.to_string()))
            .collect()
    }

    vec![
        BackendConfig {
            key: "yelp".to_string(),
            model: "fitsblb/YelpReviewsAnalyzer".to_string(),
            labels: labels(&[("LABEL_0", "negative"), ("LABEL_1", "positive")]),
            tags: TagVocabulary {
                positive: "LABEL_1".to_string(),
                negative: "LABEL_0".to_string(),
                neutral: None,
            },
            output: OutputShape::Ranked,
        },
        BackendConfig {
            key: "distilbert".to_string(),
            model: "distilbert-base-uncased-finetuned-sst-2-english".to_string(),
            labels: labels(&[("NEGATIVE", "negative"), ("POSITIVE", "positive")]),
            tags: TagVocabulary {
                positive: "POSITIVE".to_string(),
                negative: "NEGATIVE".to_string(),
                neutral: None,
            },
            output: OutputShape::Single,
        },
        BackendConfig {
            key: "cardiffnlp".to_string(),
            model: "cardiffnlp/twitter-roberta-base-sentiment-latest".to_string(),
            labels: labels(&[
                ("LABEL_0", "negative"),
                ("LABEL_1", "neutral"),
                ("LABEL_2", "positive"),
            ]),
            tags: TagVocabulary {
                positive: "LABEL_2".to_string(),
                negative: "LABEL_0".to_string(),
                neutral: Some("LABEL_1".to_string()),
            },
            output: OutputShape::Ranked,
        },
        BackendConfig {
            key: "finbert".to_string(),
            model: "ProsusAI/finbert".to_string(),
            labels: labels(&[
                ("negative", "negative"),
                ("neutral", "neutral"),
                ("positive", "positive"),
            ]),
            tags: TagVocabulary {
                positive: "positive".to_string(),
                negative: "negative".to_string(),
                neutral: Some("neutral".to_string()),
            },
            output: OutputShape::Ranked,
        },
    ]
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            nats: NatsConfig {
                url: "nats://localhost:4222".to_string(),
                request_subject: "sentiment.requests".to_string(),
                result_subject: "sentiment.results".to_string(),
            },
            backends: default_backends(),
            pipeline: PipelineConfig {
                workers: 4,
                max_text_length: default_max_text_length(),
                max_batch_size: default_max_batch_size(),
                report_interval_secs: default_report_interval_secs(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}
