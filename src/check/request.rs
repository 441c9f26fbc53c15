//! Check request parsing and validation.

use crate::error::RequestError;

/// Raw `/check` query parameters, as received.
#[derive(Debug, Clone, Default)]
pub struct CheckParams {
    /// Metric name or target expression.
    pub metric: Option<String>,
    /// Lower bound, inclusive.
    pub min: Option<String>,
    /// Upper bound, inclusive.
    pub max: Option<String>,
    /// Lookback window in seconds.
    pub range: Option<String>,
    /// Presence flag; any value sets it.
    pub empty_ok: Option<String>,
}

impl CheckParams {
    /// Collect parameters from raw query pairs. A repeated key keeps its
    /// last value; unknown keys are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        pairs.into_iter().fold(Self::default(), |mut params, (key, value)| {
            match key.as_str() {
                "metric" => params.metric = Some(value),
                "min" => params.min = Some(value),
                "max" => params.max = Some(value),
                "range" => params.range = Some(value),
                "empty_ok" => params.empty_ok = Some(value),
                _ => {}
            }
            params
        })
    }
}

/// A validated check request.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckRequest {
    /// Metric name or target expression.
    pub metric: String,
    /// Lower bound, if any.
    pub min: Option<f64>,
    /// Upper bound, if any.
    pub max: Option<f64>,
    /// Lookback window in seconds.
    pub range_seconds: u64,
    /// Treat an empty window as healthy.
    pub empty_ok: bool,
}

impl CheckRequest {
    /// Build a request with no bounds set.
    pub fn new(metric: impl Into<String>, range_seconds: u64) -> Self {
        Self {
            metric: metric.into(),
            min: None,
            max: None,
            range_seconds,
            empty_ok: false,
        }
    }

    /// Set the lower bound.
    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// Set the upper bound.
    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    /// Set the empty-window flag.
    pub fn empty_ok(mut self, empty_ok: bool) -> Self {
        self.empty_ok = empty_ok;
        self
    }

    /// Check the request invariant: non-empty metric and at least one bound.
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.metric.trim().is_empty() || (self.min.is_none() && self.max.is_none()) {
            return Err(RequestError::MissingParameters);
        }
        Ok(())
    }

    /// Whether `value` lies outside the configured bounds.
    ///
    /// NaN never compares below or above a bound, so it is in range.
    pub fn is_out_of_range(&self, value: f64) -> bool {
        self.min.is_some_and(|min| value < min) || self.max.is_some_and(|max| value > max)
    }
}

impl TryFrom<CheckParams> for CheckRequest {
    type Error = RequestError;

    fn try_from(params: CheckParams) -> Result<Self, Self::Error> {
        let metric = non_empty(params.metric);
        let range = non_empty(params.range);
        let min = non_empty(params.min);
        let max = non_empty(params.max);

        let (Some(metric), Some(range)) = (metric, range) else {
            return Err(RequestError::MissingParameters);
        };
        if min.is_none() && max.is_none() {
            return Err(RequestError::MissingParameters);
        }

        Ok(Self {
            metric,
            min: min.map(|v| parse_bound("min", v)).transpose()?,
            max: max.map(|v| parse_bound("max", v)).transpose()?,
            range_seconds: parse_range(range)?,
            empty_ok: params.empty_ok.is_some(),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_bound(name: &'static str, value: String) -> Result<f64, RequestError> {
    value
        .trim()
        .parse()
        .map_err(|_| RequestError::InvalidParameter { name, value })
}

fn parse_range(value: String) -> Result<u64, RequestError> {
    value
        .trim()
        .parse()
        .map_err(|_| RequestError::InvalidParameter { name: "range", value })
}
