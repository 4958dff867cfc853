//! Per-backend performance counters, safe under concurrent dispatch.
//!
//! Counters for one backend share a mutex; counters for distinct backends
//! are independent, so concurrent workers hitting different backends never
//! contend with each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Default)]
struct CounterGroup {
    load_latency: Duration,
    predictions: u64,
    errors: u64,
    cumulative_latency: Duration,
}

/// Point-in-time view of one backend's counters.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceSnapshot {
    /// One-time backend load latency
    pub load_latency: Duration,
    /// Count of successful calls
    pub total_predictions: u64,
    /// Count of failed calls
    pub total_errors: u64,
    /// Mean latency of successful calls; zero when there were none
    pub average_latency: Duration,
    /// errors / (predictions + errors); zero when there were no calls
    pub error_rate: f64,
}

/// Rolling counters keyed by backend.
#[derive(Default)]
pub struct PerformanceTracker {
    counters: RwLock<HashMap<String, Mutex<CounterGroup>>>,
}

impl PerformanceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a backend's one-time load latency. Called once per backend at
    /// registry initialization.
    pub fn record_load(&self, key: &str, latency: Duration) {
        self.update(key, |group| group.load_latency = latency);
    }

    /// Record one adapter call. Cumulative latency only advances on success.
    pub fn record_call(&self, key: &str, latency: Duration, success: bool) {
        self.update(key, |group| {
            if success {
                group.predictions += 1;
                group.cumulative_latency += latency;
            } else {
                group.errors += 1;
            }
        });
    }

    fn update(&self, key: &str, apply: impl FnOnce(&mut CounterGroup)) {
        // Fast path: key already registered, read lock plus the per-key mutex.
        if let Ok(map) = self.counters.read() {
            if let Some(cell) = map.get(key) {
                if let Ok(mut group) = cell.lock() {
                    apply(&mut group);
                }
                return;
            }
        }

        if let Ok(mut map) = self.counters.write() {
            let cell = map.entry(key.to_string()).or_default();
            if let Ok(mut group) = cell.lock() {
                apply(&mut group);
            }
        }
    }

    /// Snapshot one backend's counters.
    pub fn snapshot(&self, key: &str) -> Option<PerformanceSnapshot> {
        let map = self.counters.read().ok()?;
        let cell = map.get(key)?;
        let group = cell.lock().ok()?;
        Some(Self::snapshot_group(&group))
    }

    /// Snapshot every registered backend.
    pub fn snapshot_all(&self) -> HashMap<String, PerformanceSnapshot> {
        let mut snapshots = HashMap::new();
        if let Ok(map) = self.counters.read() {
            for (key, cell) in map.iter() {
                if let Ok(group) = cell.lock() {
                    snapshots.insert(key.clone(), Self::snapshot_group(&group));
                }
            }
        }
        snapshots
    }

    fn snapshot_group(group: &CounterGroup) -> PerformanceSnapshot {
        let average_latency = if group.predictions > 0 {
            group.cumulative_latency / group.predictions as u32
        } else {
            Duration::ZERO
        };

        let attempts = group.predictions + group.errors;
        let error_rate = if attempts > 0 {
            group.errors as f64 / attempts as f64
        } else {
            0.0
        };

        PerformanceSnapshot {
            load_latency: group.load_latency,
            total_predictions: group.predictions,
            total_errors: group.errors,
            average_latency,
            error_rate,
        }
    }

    /// Log one summary line per backend.
    pub fn log_summary(&self) {
        let mut snapshots: Vec<(String, PerformanceSnapshot)> =
            self.snapshot_all().into_iter().collect();
        snapshots.sort_by(|a, b| a.0.cmp(&b.0));

        for (key, snapshot) in snapshots {
            info!(
                backend = %key,
                predictions = snapshot.total_predictions,
                errors = snapshot.total_errors,
                avg_latency_us = snapshot.average_latency.as_micros() as u64,
                error_rate = format!("{:.3}", snapshot.error_rate),
                "Backend performance"
            );
        }
    }
}

/// Periodic reporter that logs per-backend summaries.
pub struct SnapshotReporter {
    tracker: Arc<PerformanceTracker>,
    interval_secs: u64,
}

impl SnapshotReporter {
    pub fn new(tracker: Arc<PerformanceTracker>, interval_secs: u64) -> Self {
        Self {
            tracker,
            interval_secs,
        }
    }

    /// Start the periodic reporting task.
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        loop {
            interval.tick().await;
            self.tracker.log_summary();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_record_and_snapshot() {
        let tracker = PerformanceTracker::new();

        tracker.record_load("a", Duration::from_millis(120));
        tracker.record_call("a", Duration::from_millis(10), true);
        tracker.record_call("a", Duration::from_millis(30), true);
        tracker.record_call("a", Duration::from_millis(5), false);

        let snapshot = tracker.snapshot("a").unwrap();
        assert_eq!(snapshot.load_latency, Duration::from_millis(120));
        assert_eq!(snapshot.total_predictions, 2);
        assert_eq!(snapshot.total_errors, 1);
        // Failed-call latency must not count toward the average.
        assert_eq!(snapshot.average_latency, Duration::from_millis(20));
        assert!((snapshot.error_rate - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_calls_reports_zero() {
        let tracker = PerformanceTracker::new();
        tracker.record_load("a", Duration::from_millis(50));

        let snapshot = tracker.snapshot("a").unwrap();
        assert_eq!(snapshot.total_predictions, 0);
        assert_eq!(snapshot.total_errors, 0);
        assert_eq!(snapshot.average_latency, Duration::ZERO);
        assert_eq!(snapshot.error_rate, 0.0);
    }

    #[test]
    fn test_unknown_key_has_no_snapshot() {
        let tracker = PerformanceTracker::new();
        assert!(tracker.snapshot("missing").is_none());
    }

    #[test]
    fn test_keys_are_independent() {
        let tracker = PerformanceTracker::new();
        tracker.record_call("a", Duration::from_millis(1), true);
        tracker.record_call("b", Duration::from_millis(1), false);

        assert_eq!(tracker.snapshot("a").unwrap().total_errors, 0);
        assert_eq!(tracker.snapshot("b").unwrap().total_predictions, 0);
        assert_eq!(tracker.snapshot_all().len(), 2);
    }

    #[test]
    fn test_no_lost_updates_under_concurrency() {
        let tracker = Arc::new(PerformanceTracker::new());
        let threads = 8;
        let per_thread = 250u64;

        let handles: Vec<_> = (0..threads)
            .map(|i| {
                let tracker = tracker.clone();
                thread::spawn(move || {
                    for n in 0..per_thread {
                        // Half the threads report successes, half failures.
                        let success = i % 2 == 0;
                        tracker.record_call("shared", Duration::from_micros(n), success);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = tracker.snapshot("shared").unwrap();
        let expected = threads as u64 / 2 * per_thread;
        assert_eq!(snapshot.total_predictions, expected);
        assert_eq!(snapshot.total_errors, expected);
        assert!((snapshot.error_rate - 0.5).abs() < 1e-9);
    }
}
