//! Metric source backed by a Graphite-compatible render API.
//!
//! This module handles:
//! - The [`MetricSource`] seam the evaluator fetches through
//! - Render API response types
//! - The reqwest-backed Graphite client
//! - Mock source for testing

pub mod client;
pub mod mock;
pub mod types;

use async_trait::async_trait;

use crate::error::FetchError;

pub use client::GraphiteClient;
pub use mock::{MockConfig, MockMetricSource};
pub use types::RenderSeries;

/// Anything that can return the recent values of a named metric.
#[async_trait]
pub trait MetricSource: Send + Sync {
    /// Fetch the non-null values of `metric` over the trailing `range_seconds`,
    /// in backend order. An empty vector means the metric exists but has no
    /// data in the window.
    async fn fetch(&self, metric: &str, range_seconds: u64) -> Result<Vec<f64>, FetchError>;
}
