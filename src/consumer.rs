//! NATS consumer for incoming analysis requests
//!
//! Owns deserialization: subscribers hand the service ready `AnalyzeRequest`
//! values, and malformed payloads are logged and dropped here.

use crate::types::request::AnalyzeRequest;
use anyhow::Result;
use async_nats::{Client, Subscriber};
use futures::StreamExt;
use tracing::{info, warn};

/// Consumer for receiving analysis requests from NATS
pub struct RequestConsumer {
    client: Client,
    subject: String,
}

impl RequestConsumer {
    /// Create a new request consumer
    pub fn new(client: Client, subject: &str) -> Self {
        Self {
            client,
            subject: subject.to_string(),
        }
    }

    /// Subscribe to the request subject
    pub async fn subscribe(&self) -> Result<RequestStream> {
        let subscriber = self.client.subscribe(self.subject.clone()).await?;
        info!(subject = %self.subject, "Subscribed to request subject");
        Ok(RequestStream {
            subscriber,
            subject: self.subject.clone(),
        })
    }

    /// Get the subject name
    pub fn subject(&self) -> &str {
        &self.subject
    }
}

/// Active subscription yielding decoded requests.
pub struct RequestStream {
    subscriber: Subscriber,
    subject: String,
}

impl RequestStream {
    /// Next well-formed request, or `None` when the subscription closes.
    /// Payloads that fail to decode are skipped.
    pub async fn next_request(&mut self) -> Option<AnalyzeRequest> {
        while let Some(message) = self.subscriber.next().await {
            if let Some(request) = decode(&self.subject, &message.payload) {
                return Some(request);
            }
        }
        None
    }
}

fn decode(subject: &str, payload: &[u8]) -> Option<AnalyzeRequest> {
    match serde_json::from_slice::<AnalyzeRequest>(payload) {
        Ok(request) => Some(request),
        Err(e) => {
            warn!(subject = %subject, error = %e, "Discarding malformed request");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_valid_compare_request() {
        let payload = br#"{"op": "compare", "request_id": "req_1", "text": "hello"}"#;
        let request = decode("sentiment.requests", payload).unwrap();

        assert!(matches!(
            request,
            AnalyzeRequest::Compare { ref request_id, .. } if request_id == "req_1"
        ));
    }

    #[test]
    fn test_decode_rejects_malformed_payloads() {
        assert!(decode("sentiment.requests", b"not json").is_none());
        assert!(decode("sentiment.requests", br#"{"op": "launch"}"#).is_none());
        assert!(decode("sentiment.requests", br#"{"text": "no op field"}"#).is_none());
    }
}
