//! Analysis request payloads received over NATS

use serde::{Deserialize, Serialize};

/// A request published on the request subject by clients.
///
/// The `op` field selects the operation; `request_id` is echoed back in the
/// matching response so clients can correlate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum AnalyzeRequest {
    /// Compare one text across several backends and report the consensus
    Compare {
        request_id: String,
        text: String,
        /// Backend keys to dispatch to; all available backends when omitted
        #[serde(default)]
        backends: Option<Vec<String>>,
    },
    /// Classify an ordered list of texts with a single backend
    Batch {
        request_id: String,
        texts: Vec<String>,
        /// Backend key to use for the whole batch; engine picks one when omitted
        #[serde(default)]
        backend: Option<String>,
    },
    /// Report per-backend performance statistics
    Stats { request_id: String },
}

impl AnalyzeRequest {
    /// Client-supplied correlation id of this request.
    pub fn request_id(&self) -> &str {
        match self {
            AnalyzeRequest::Compare { request_id, .. } => request_id,
            AnalyzeRequest::Batch { request_id, .. } => request_id,
            AnalyzeRequest::Stats { request_id } => request_id,
        }
    }
}
