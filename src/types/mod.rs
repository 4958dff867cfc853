//! Type definitions for the sentiment ensemble service

pub mod outcome;
pub mod request;
pub mod response;

pub use outcome::{ConsensusResult, PredictionOutcome, SentimentLabel};
pub use request::AnalyzeRequest;
pub use response::AnalyzeResponse;
