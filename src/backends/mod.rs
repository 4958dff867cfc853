//! Sentiment backend components: classifier contract, registry, adapter

pub mod adapter;
pub mod classifier;
pub mod registry;

pub use adapter::BackendAdapter;
pub use classifier::{Classifier, LexiconClassifier, RawPrediction, ScoredTag};
pub use registry::{BackendDescriptor, BackendRegistry};
