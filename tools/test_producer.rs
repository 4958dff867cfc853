//! Test Request Producer
//!
//! Generates and publishes sample analysis requests to NATS for service
//! testing.

use rand::Rng;
use serde_json::json;
use std::time::Duration;
use tracing::{info, warn};

const POSITIVE_TEXTS: &[&str] = &[
    "Great food and excellent service!",
    "I love this product, absolutely amazing.",
    "Best experience I have had in years.",
    "Wonderful staff and a perfect evening.",
];

const NEGATIVE_TEXTS: &[&str] = &[
    "Terrible service and awful food.",
    "Worst purchase I have ever made.",
    "Horrible experience, rude staff.",
    "Completely disappointing and a waste of money.",
];

const NEUTRAL_TEXTS: &[&str] = &[
    "The package arrived on Tuesday.",
    "It is a restaurant on the corner.",
    "The meeting starts at nine.",
    "They changed the menu last month.",
];

/// Request generator for testing
struct RequestGenerator {
    rng: rand::rngs::ThreadRng,
    request_counter: u64,
}

impl RequestGenerator {
    fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
            request_counter: 0,
        }
    }

    fn random_text(&mut self) -> &'static str {
        let pool = match self.rng.gen_range(0..3) {
            0 => POSITIVE_TEXTS,
            1 => NEGATIVE_TEXTS,
            _ => NEUTRAL_TEXTS,
        };
        pool[self.rng.gen_range(0..pool.len())]
    }

    fn next_id(&mut self) -> String {
        self.request_counter += 1;
        format!("req_{:08}", self.request_counter)
    }

    /// Generate a compare request over all backends
    fn generate_compare(&mut self) -> serde_json::Value {
        json!({
            "op": "compare",
            "request_id": self.next_id(),
            "text": self.random_text(),
        })
    }

    /// Generate a batch request with a handful of texts
    fn generate_batch(&mut self) -> serde_json::Value {
        let count = self.rng.gen_range(2..6);
        let texts: Vec<&str> = (0..count).map(|_| self.random_text()).collect();
        json!({
            "op": "batch",
            "request_id": self.next_id(),
            "texts": texts,
        })
    }

    fn generate_stats(&mut self) -> serde_json::Value {
        json!({
            "op": "stats",
            "request_id": self.next_id(),
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("test_producer=info".parse()?),
        )
        .init();

    info!("Starting Test Request Producer");

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let nats_url = args.get(1).map(|s| s.as_str()).unwrap_or("nats://localhost:4222");
    let subject = args.get(2).map(|s| s.as_str()).unwrap_or("sentiment.requests");
    let count: u64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(100);
    let batch_rate: f64 = args.get(4).and_then(|s| s.parse().ok()).unwrap_or(0.2);
    let delay_ms: u64 = args.get(5).and_then(|s| s.parse().ok()).unwrap_or(100);

    info!(
        nats_url = %nats_url,
        subject = %subject,
        count = count,
        batch_rate = batch_rate,
        delay_ms = delay_ms,
        "Configuration loaded"
    );

    // Connect to NATS
    let client = match async_nats::connect(nats_url).await {
        Ok(c) => {
            info!("Connected to NATS");
            c
        }
        Err(e) => {
            warn!(error = %e, "Failed to connect to NATS. Running in dry-run mode.");
            return run_dry_mode(count, batch_rate, delay_ms).await;
        }
    };

    let mut generator = RequestGenerator::new();
    let mut rng = rand::thread_rng();

    info!("Starting to publish {} requests...", count);

    let mut compare_count = 0;
    let mut batch_count = 0;

    for i in 0..count {
        let request = if rng.gen_bool(batch_rate) {
            batch_count += 1;
            generator.generate_batch()
        } else {
            compare_count += 1;
            generator.generate_compare()
        };

        let payload = serde_json::to_vec(&request)?;
        client.publish(subject.to_string(), payload.into()).await?;

        if (i + 1) % 10 == 0 {
            info!(
                "Published {}/{} requests ({} compare, {} batch)",
                i + 1,
                count,
                compare_count,
                batch_count
            );
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    // Close with a stats request to log the service's view of the run
    let stats = generator.generate_stats();
    client
        .publish(subject.to_string(), serde_json::to_vec(&stats)?.into())
        .await?;

    info!(
        "Completed! Published {} requests ({} compare, {} batch)",
        count, compare_count, batch_count
    );

    Ok(())
}

async fn run_dry_mode(count: u64, batch_rate: f64, delay_ms: u64) -> anyhow::Result<()> {
    info!("Running in dry-run mode (no NATS connection)");

    let mut generator = RequestGenerator::new();
    let mut rng = rand::thread_rng();

    for i in 0..count {
        let request = if rng.gen_bool(batch_rate) {
            generator.generate_batch()
        } else {
            generator.generate_compare()
        };

        let json = serde_json::to_string_pretty(&request)?;

        if (i + 1) % 10 == 0 || i == 0 {
            info!("Sample request {}:\n{}", i + 1, json);
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    Ok(())
}
