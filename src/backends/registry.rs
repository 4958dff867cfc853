//! Backend registry: loads classifiers once and serves immutable descriptors

use crate::backends::adapter::BackendAdapter;
use crate::backends::classifier::{Classifier, LexiconClassifier, OutputShape, TagVocabulary};
use crate::error::EngineError;
use crate::metrics::PerformanceTracker;
use crate::types::outcome::SentimentLabel;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Text used to smoke-test each backend during load.
const SMOKE_TEST_TEXT: &str = "This is a test.";

/// Immutable description of one backend: identity, display name, and the
/// raw-tag normalization table, plus the parameters its classifier is built
/// from. Owned exclusively by the registry after load.
#[derive(Debug, Clone)]
pub struct BackendDescriptor {
    /// Opaque registry key
    pub key: String,
    /// Human-readable model identifier
    pub display_name: String,
    /// Raw backend tag to canonical label
    pub label_map: HashMap<String, SentimentLabel>,
    /// The backend's native tag names
    pub vocabulary: TagVocabulary,
    /// Output shape the backend emits
    pub output_shape: OutputShape,
}

struct BackendEntry {
    descriptor: BackendDescriptor,
    adapter: Arc<BackendAdapter>,
}

/// Static table of loaded backends. Read-only after [`BackendRegistry::load`].
pub struct BackendRegistry {
    backends: HashMap<String, BackendEntry>,
}

impl BackendRegistry {
    /// Initialize every listed backend independently. A backend that fails
    /// its smoke test is dropped with a warning; only an empty result is
    /// fatal. Each successful load records its latency with the tracker.
    pub fn load(
        descriptors: Vec<BackendDescriptor>,
        tracker: Arc<PerformanceTracker>,
    ) -> Result<Self, EngineError> {
        Self::load_with(descriptors, tracker, |descriptor| {
            Box::new(LexiconClassifier::new(
                descriptor.vocabulary.clone(),
                descriptor.output_shape,
            ))
        })
    }

    /// [`BackendRegistry::load`] with the classifier construction injected,
    /// so load-time failures can be driven in tests.
    pub(crate) fn load_with<F>(
        descriptors: Vec<BackendDescriptor>,
        tracker: Arc<PerformanceTracker>,
        build: F,
    ) -> Result<Self, EngineError>
    where
        F: Fn(&BackendDescriptor) -> Box<dyn Classifier>,
    {
        let mut backends = HashMap::new();

        for descriptor in descriptors {
            let started = Instant::now();
            let classifier = build(&descriptor);

            match classifier.classify(SMOKE_TEST_TEXT) {
                Ok(_) => {
                    let load_latency = started.elapsed();
                    tracker.record_load(&descriptor.key, load_latency);
                    info!(
                        backend = %descriptor.key,
                        model = %descriptor.display_name,
                        load_us = load_latency.as_micros() as u64,
                        "Backend loaded"
                    );

                    let adapter =
                        Arc::new(BackendAdapter::new(&descriptor, classifier, tracker.clone()));
                    backends.insert(
                        descriptor.key.clone(),
                        BackendEntry {
                            descriptor,
                            adapter,
                        },
                    );
                }
                Err(e) => {
                    warn!(
                        backend = %descriptor.key,
                        model = %descriptor.display_name,
                        error = %e,
                        "Failed to load backend, skipping"
                    );
                }
            }
        }

        if backends.is_empty() {
            return Err(EngineError::BackendLoadFailure);
        }

        info!(count = backends.len(), "Backend registry initialized");
        Ok(Self { backends })
    }

    /// Build a registry from pre-constructed adapters. Test seam for wiring
    /// in scripted or failing classifiers.
    pub(crate) fn from_adapters(
        entries: Vec<(BackendDescriptor, Arc<BackendAdapter>)>,
    ) -> Self {
        Self {
            backends: entries
                .into_iter()
                .map(|(descriptor, adapter)| {
                    (
                        descriptor.key.clone(),
                        BackendEntry {
                            descriptor,
                            adapter,
                        },
                    )
                })
                .collect(),
        }
    }

    /// Keys of all successfully loaded backends, sorted.
    pub fn available_backends(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.backends.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// The adapter for a backend key, if loaded.
    pub fn adapter(&self, key: &str) -> Option<Arc<BackendAdapter>> {
        self.backends.get(key).map(|entry| entry.adapter.clone())
    }

    /// The immutable descriptor for a backend key.
    pub fn descriptor_for(&self, key: &str) -> Result<&BackendDescriptor, EngineError> {
        self.backends
            .get(key)
            .map(|entry| &entry.descriptor)
            .ok_or_else(|| EngineError::BackendUnavailable(key.to_string()))
    }
}
