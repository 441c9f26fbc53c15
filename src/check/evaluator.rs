//! Runs one check end to end: validate, fetch, average, compare.

use std::sync::Arc;

use axum::http::StatusCode;
use serde::Serialize;
use strum::{Display, IntoStaticStr};
use tracing::{debug, error, instrument, warn};

use crate::error::{FetchError, RequestError};
use crate::graphite::MetricSource;
use crate::metrics;

use super::request::{CheckParams, CheckRequest};

/// Message returned when the backend cannot be reached.
pub const BACKEND_UNAVAILABLE_MESSAGE: &str =
    "connecting to backend metrics service failed with error 'request timed out'";

/// Message returned when the window holds no datapoints.
pub const NO_DATA_MESSAGE: &str = "no values for metric in range";

/// Message returned for unclassified failures.
pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

/// Terminal state of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Outcome {
    /// Average within bounds.
    ThresholdPass,
    /// Average outside bounds.
    ThresholdFail,
    /// Backend returned no datapoints for the window.
    NoData,
    /// Request failed validation, or the target needs composition.
    BadRequest,
    /// Backend reports the metric does not exist.
    NotFound,
    /// Backend unreachable, timed out, or answered non-2xx.
    ServiceUnavailable,
    /// Anything else.
    InternalError,
}

/// JSON body of a check response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CheckBody {
    /// Averaged value.
    Value {
        /// Mean of the datapoints.
        value: f64,
    },
    /// Error description.
    Error {
        /// Human-readable message.
        error: String,
    },
}

impl CheckBody {
    fn error(message: impl Into<String>) -> Self {
        CheckBody::Error {
            error: message.into(),
        }
    }
}

/// Outcome of a check, paired with its HTTP status.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckResult {
    /// Terminal state.
    pub outcome: Outcome,
    /// Status code to answer with.
    pub status: StatusCode,
    /// Response body.
    pub body: CheckBody,
}

impl CheckResult {
    fn new(outcome: Outcome, status: StatusCode, body: CheckBody) -> Self {
        Self {
            outcome,
            status,
            body,
        }
    }

    /// Result for a request that failed validation.
    pub fn invalid(err: &RequestError) -> Self {
        Self::new(Outcome::BadRequest, StatusCode::BAD_REQUEST, CheckBody::error(err.to_string()))
    }

    /// Result for a failed fetch.
    pub fn fetch_failed(err: &FetchError) -> Self {
        match err {
            FetchError::MetricNotComposite(message) => {
                Self::new(Outcome::BadRequest, StatusCode::BAD_REQUEST, CheckBody::error(message.clone()))
            }
            FetchError::MetricNotFound => {
                Self::new(Outcome::NotFound, StatusCode::NOT_FOUND, CheckBody::error("metric not found"))
            }
            FetchError::MetricServiceUnavailable { .. } => Self::new(
                Outcome::ServiceUnavailable,
                StatusCode::SERVICE_UNAVAILABLE,
                CheckBody::error(BACKEND_UNAVAILABLE_MESSAGE),
            ),
            FetchError::MalformedResponse(_) => Self::internal(),
        }
    }

    /// Result for an unclassified failure.
    pub fn internal() -> Self {
        Self::new(
            Outcome::InternalError,
            StatusCode::INTERNAL_SERVER_ERROR,
            CheckBody::error(INTERNAL_ERROR_MESSAGE),
        )
    }

    /// Result for an empty window.
    pub fn no_data(empty_ok: bool) -> Self {
        let status = if empty_ok {
            StatusCode::OK
        } else {
            StatusCode::NOT_FOUND
        };
        Self::new(Outcome::NoData, status, CheckBody::error(NO_DATA_MESSAGE))
    }

    /// Result for a computed average.
    pub fn value(value: f64, out_of_range: bool) -> Self {
        if out_of_range {
            Self::new(Outcome::ThresholdFail, StatusCode::INTERNAL_SERVER_ERROR, CheckBody::Value { value })
        } else {
            Self::new(Outcome::ThresholdPass, StatusCode::OK, CheckBody::Value { value })
        }
    }

    /// Whether the check counts as healthy.
    pub fn is_healthy(&self) -> bool {
        self.status.is_success()
    }
}

/// Arithmetic mean in encountered order, or `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Evaluates check requests against a metric source.
#[derive(Clone)]
pub struct Evaluator {
    source: Arc<dyn MetricSource>,
}

impl std::fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Evaluator").finish_non_exhaustive()
    }
}

impl Evaluator {
    /// Create an evaluator over the given source.
    pub fn new(source: Arc<dyn MetricSource>) -> Self {
        Self { source }
    }

    /// Validate raw query parameters, then evaluate.
    pub async fn check(&self, params: CheckParams) -> CheckResult {
        let result = match CheckRequest::try_from(params) {
            Ok(request) => self.evaluate_request(&request).await,
            Err(err) => {
                debug!(error = %err, "Rejected check request");
                CheckResult::invalid(&err)
            }
        };

        metrics::inc_checks(result.outcome);
        result
    }

    /// Evaluate a request built in code. The request invariant is still
    /// enforced before anything is fetched.
    pub async fn evaluate(&self, request: &CheckRequest) -> CheckResult {
        let result = match request.validate() {
            Ok(()) => self.evaluate_request(request).await,
            Err(err) => CheckResult::invalid(&err),
        };
        metrics::inc_checks(result.outcome);
        result
    }

    #[instrument(skip(self, request), fields(metric = %request.metric, range = request.range_seconds))]
    async fn evaluate_request(&self, request: &CheckRequest) -> CheckResult {
        let values = match self.source.fetch(&request.metric, request.range_seconds).await {
            Ok(values) => values,
            Err(err) => {
                match &err {
                    FetchError::MalformedResponse(reason) => error!(%reason, "Unclassified fetch failure"),
                    other => warn!(error = %other, "Fetch failed"),
                }
                return CheckResult::fetch_failed(&err);
            }
        };

        let Some(value) = mean(&values) else {
            debug!(empty_ok = request.empty_ok, "No datapoints in range");
            return CheckResult::no_data(request.empty_ok);
        };

        // A non-finite average has no JSON representation.
        if !value.is_finite() {
            error!(value, points = values.len(), "Average is not finite");
            return CheckResult::internal();
        }

        let out_of_range = request.is_out_of_range(value);
        debug!(value, out_of_range, points = values.len(), "Evaluated metric");
        CheckResult::value(value, out_of_range)
    }
}
