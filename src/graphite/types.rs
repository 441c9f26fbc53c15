//! Graphite render API response types.

use serde::de::IgnoredAny;
use serde::Deserialize;

/// One series from a `format=json` render response.
#[derive(Debug, Clone, Deserialize)]
pub struct RenderSeries {
    /// Resolved target name.
    #[serde(default)]
    pub target: Option<String>,
    /// `[value, timestamp]` pairs, oldest first.
    pub datapoints: Vec<Datapoint>,
}

/// A single `[value, timestamp]` pair. The timestamp is not used.
#[derive(Debug, Clone, Deserialize)]
pub struct Datapoint(pub Option<f64>, pub IgnoredAny);

impl RenderSeries {
    /// Non-null values in backend order.
    pub fn values(&self) -> Vec<f64> {
        self.datapoints.iter().filter_map(|point| point.0).collect()
    }
}

/// Pick the values of the first series, or `None` if the response is empty.
pub fn first_series_values(series: &[RenderSeries]) -> Option<Vec<f64>> {
    series.first().map(RenderSeries::values)
}
