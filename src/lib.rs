//! Sentiment Ensemble Library
//!
//! A multi-backend sentiment analysis service: one request is dispatched to
//! several independently loaded classifiers, their outputs normalized into a
//! common vocabulary and aggregated into a consensus judgment with a
//! quantified agreement level.

pub mod backends;
pub mod config;
pub mod consumer;
pub mod ensemble;
pub mod error;
pub mod metrics;
pub mod producer;
pub mod types;

pub use config::AppConfig;
pub use consumer::{RequestConsumer, RequestStream};
pub use ensemble::SentimentEngine;
pub use error::EngineError;
pub use metrics::{PerformanceSnapshot, PerformanceTracker};
pub use producer::ResultProducer;
pub use types::{AnalyzeRequest, AnalyzeResponse, ConsensusResult, PredictionOutcome, SentimentLabel};
