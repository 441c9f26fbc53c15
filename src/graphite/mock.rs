//! Mock metric source for unit testing.
//!
//! This module provides a source that can be used in tests
//! without making real network requests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::FetchError;

use super::MetricSource;

/// Configuration for mock source behavior.
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// Error to return for every fetch, if set.
    pub fail_with: Option<FetchError>,
    /// Simulated latency in milliseconds.
    pub latency_ms: u64,
}

/// Mock metric source for testing.
#[derive(Debug, Clone, Default)]
pub struct MockMetricSource {
    /// Mock configuration.
    config: MockConfig,
    /// Series by metric name. Entries are `None` for null datapoints.
    series: Arc<Mutex<HashMap<String, Vec<Option<f64>>>>>,
    /// Number of fetches served.
    calls: Arc<AtomicUsize>,
    /// Last `(metric, range_seconds)` requested.
    last_request: Arc<Mutex<Option<(String, u64)>>>,
}

impl MockMetricSource {
    /// Create a new mock source with no metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock source with custom configuration.
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Register a metric with the given values.
    pub fn set_series(&self, metric: &str, values: &[f64]) {
        let points = values.iter().copied().map(Some).collect();
        self.set_raw_series(metric, points);
    }

    /// Register a metric including null datapoints.
    pub fn set_raw_series(&self, metric: &str, points: Vec<Option<f64>>) {
        let mut series = self.series.lock().unwrap();
        series.insert(metric.to_string(), points);
    }

    /// Number of fetches served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Last `(metric, range_seconds)` requested.
    pub fn last_request(&self) -> Option<(String, u64)> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetricSource for MockMetricSource {
    async fn fetch(&self, metric: &str, range_seconds: u64) -> Result<Vec<f64>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some((metric.to_string(), range_seconds));

        if self.config.latency_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.config.latency_ms)).await;
        }

        if let Some(err) = &self.config.fail_with {
            return Err(err.clone());
        }

        let series = self.series.lock().unwrap();
        series
            .get(metric)
            .map(|points| points.iter().flatten().copied().collect())
            .ok_or(FetchError::MetricNotFound)
    }
}
