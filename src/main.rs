//! Sentiment Ensemble Service - Main Entry Point
//!
//! Consumes analysis requests from NATS, runs the multi-backend consensus
//! engine, and publishes results. Supports parallel request processing.

use anyhow::Result;
use sentiment_ensemble::{
    config::{AppConfig, PipelineConfig},
    consumer::RequestConsumer,
    ensemble::SentimentEngine,
    metrics::SnapshotReporter,
    producer::ResultProducer,
    types::request::AnalyzeRequest,
    types::response::{
        AnalyzeResponse, BatchResponse, ComparisonResponse, ErrorResponse, SnapshotView,
        StatsResponse,
    },
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load()?;

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(
        format!("sentiment_ensemble={}", config.logging.level).parse()?,
    );
    if config.logging.format == "json" {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("Starting Sentiment Ensemble Service");
    info!(
        workers = config.pipeline.workers,
        max_text_length = config.pipeline.max_text_length,
        max_batch_size = config.pipeline.max_batch_size,
        "Configuration loaded"
    );

    // Initialize the consensus engine; zero loaded backends aborts startup
    let engine = Arc::new(SentimentEngine::new(&config)?);
    info!(
        "Engine initialized with {} backends: {:?}",
        engine.available_backends().len(),
        engine.available_backends()
    );

    // Connect to NATS
    let client = async_nats::connect(&config.nats.url).await?;
    info!("Connected to NATS at {}", config.nats.url);

    // Initialize consumer and producer
    let consumer = RequestConsumer::new(client.clone(), &config.nats.request_subject);
    let producer = Arc::new(ResultProducer::new(client.clone(), &config.nats.result_subject));

    info!("Listening on subject: {}", config.nats.request_subject);
    info!("Publishing results to: {}", config.nats.result_subject);

    // Semaphore to limit concurrent processing
    let semaphore = Arc::new(Semaphore::new(config.pipeline.workers));
    let processed_count = Arc::new(AtomicU64::new(0));

    let config = Arc::new(config);

    // Periodic per-backend performance summary
    let reporter_engine = engine.clone();
    let interval = config.pipeline.report_interval_secs;
    tokio::spawn(async move {
        let tracker = reporter_engine.tracker();
        let reporter = SnapshotReporter::new(tracker, interval);
        reporter.start().await;
    });

    // Process requests in parallel
    let mut requests = consumer.subscribe().await?;

    while let Some(request) = requests.next_request().await {
        let permit = semaphore.clone().acquire_owned().await.unwrap();

        let engine = engine.clone();
        let producer = producer.clone();
        let config = config.clone();
        let processed_count = processed_count.clone();

        tokio::spawn(async move {
            let request_id = request.request_id().to_string();
            let response = handle_request(&engine, &config.pipeline, request).await;

            if let Err(e) = producer.publish(&response).await {
                error!(
                    request_id = %request_id,
                    error = %e,
                    "Failed to publish result"
                );
            }

            let count = processed_count.fetch_add(1, Ordering::Relaxed) + 1;
            if count % 100 == 0 {
                info!(processed = count, "Processing milestone");
            }

            drop(permit);
        });
    }

    info!("Service shutting down...");
    Ok(())
}

/// Validate and dispatch one request. Request validation (emptiness, length
/// and batch-size limits) lives here, outside the engine core.
async fn handle_request(
    engine: &SentimentEngine,
    pipeline: &PipelineConfig,
    request: AnalyzeRequest,
) -> AnalyzeResponse {
    match request {
        AnalyzeRequest::Compare {
            request_id,
            text,
            backends,
        } => {
            let text = text.trim();
            if text.is_empty() || text.len() > pipeline.max_text_length {
                return AnalyzeResponse::Error(ErrorResponse::new(
                    request_id,
                    format!(
                        "text must be between 1 and {} characters",
                        pipeline.max_text_length
                    ),
                ));
            }

            let result = engine.compare(text, backends.as_deref()).await;
            AnalyzeResponse::Comparison(ComparisonResponse::new(request_id, &result))
        }

        AnalyzeRequest::Batch {
            request_id,
            texts,
            backend,
        } => {
            if texts.is_empty() {
                return AnalyzeResponse::Error(ErrorResponse::new(
                    request_id,
                    "at least one text is required".to_string(),
                ));
            }
            if texts.len() > pipeline.max_batch_size {
                return AnalyzeResponse::Error(ErrorResponse::new(
                    request_id,
                    format!("maximum {} texts allowed per batch", pipeline.max_batch_size),
                ));
            }
            if let Some(i) = texts
                .iter()
                .position(|t| t.trim().is_empty() || t.len() > pipeline.max_text_length)
            {
                return AnalyzeResponse::Error(ErrorResponse::new(
                    request_id,
                    format!(
                        "text at index {} must be between 1 and {} characters",
                        i, pipeline.max_text_length
                    ),
                ));
            }

            match engine.batch_predict(&texts, backend.as_deref()) {
                Ok(outcomes) => {
                    AnalyzeResponse::Batch(BatchResponse::new(request_id, &outcomes))
                }
                Err(e) => AnalyzeResponse::Error(ErrorResponse::new(request_id, e.to_string())),
            }
        }

        AnalyzeRequest::Stats { request_id } => {
            let backends: BTreeMap<String, SnapshotView> = engine
                .performance_snapshot()
                .into_iter()
                .map(|(key, snapshot)| {
                    let model_name = engine
                        .display_name(&key)
                        .unwrap_or_default()
                        .to_string();
                    (key, SnapshotView::new(model_name, &snapshot))
                })
                .collect();

            AnalyzeResponse::Stats(StatsResponse::new(request_id, backends))
        }
    }
}
