//! Engine error taxonomy
//!
//! Only whole-engine failures surface as errors. Per-call inference failures
//! are absorbed by the adapter and represented as failed outcomes, so a
//! comparison never fails just because a subset of backends errored.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Zero backends loaded at initialization. Fatal; the caller must abort
    /// startup.
    #[error("no sentiment backends could be loaded")]
    BackendLoadFailure,

    /// A caller named a backend key not present in the registry.
    #[error("backend `{0}` is not available")]
    BackendUnavailable(String),

    /// No backend exists to default to. A successfully loaded registry is
    /// never empty, so this is unreachable in the running service.
    #[error("no backends available")]
    NoBackends,
}
