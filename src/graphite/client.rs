//! Graphite render API client.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::Config;
use crate::error::{FetchError, UmpireError};
use crate::metrics;

use super::types::{first_series_values, RenderSeries};
use super::MetricSource;

/// Client for a Graphite-compatible `/render/` endpoint.
#[derive(Debug, Clone)]
pub struct GraphiteClient {
    /// HTTP client for backend requests.
    http: reqwest::Client,
    /// Backend base URL.
    base_url: Url,
}

impl GraphiteClient {
    /// Create a new client from config.
    pub fn new(config: &Config) -> Result<Self, UmpireError> {
        let base_url = config
            .graphite_base_url()
            .map_err(UmpireError::InvalidConfig)?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.backend_timeout_ms))
            .connect_timeout(Duration::from_millis(config.backend_timeout_ms.min(2_000)))
            .tcp_nodelay(true)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Ok(Self { http, base_url })
    }

    /// Build the render URL for a metric over the trailing `range_seconds`.
    pub fn render_url(&self, metric: &str, range_seconds: u64) -> Url {
        let mut url = self.base_url.clone();
        let path = format!("{}/render/", url.path().trim_end_matches('/'));
        url.set_path(&path);
        url.query_pairs_mut()
            .clear()
            .append_pair("target", metric)
            .append_pair("format", "json")
            .append_pair("from", &format!("-{}s", range_seconds));
        url
    }

    async fn request_series(&self, url: Url) -> Result<Vec<RenderSeries>, FetchError> {
        let response = self.http.get(url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::MetricServiceUnavailable {
                reason: format!("HTTP {}", response.status()),
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body)
            .map_err(|e| FetchError::MalformedResponse(format!("failed to parse render response: {}", e)))
    }
}

#[async_trait]
impl MetricSource for GraphiteClient {
    #[instrument(skip(self), fields(backend = %self.base_url))]
    async fn fetch(&self, metric: &str, range_seconds: u64) -> Result<Vec<f64>, FetchError> {
        let url = self.render_url(metric, range_seconds);
        debug!(url = %url, "Requesting datapoints");

        let start = Instant::now();
        let result = self.request_series(url).await;
        metrics::record_backend_fetch_latency(start);

        let values = result
            .and_then(|series| first_series_values(&series).ok_or(FetchError::MetricNotFound))
            .inspect_err(|e| {
                metrics::inc_backend_fetch_failures(e.kind());
                warn!(error = %e, "Backend fetch failed");
            })?;

        debug!(count = values.len(), "Fetched datapoints");
        Ok(values)
    }
}
