//! Consensus engine components

pub mod aggregator;
pub mod engine;

pub use aggregator::ConsensusAggregator;
pub use engine::SentimentEngine;
