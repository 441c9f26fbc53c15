//! Unified error types for the check service.

use thiserror::Error;

/// Process-level error type (startup, configuration, server).
#[derive(Error, Debug)]
pub enum UmpireError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration loaded but failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// HTTP client construction error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors returned by a metric source when fetching datapoints.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// The backend returned an empty result set for the target.
    #[error("metric not found")]
    MetricNotFound,

    /// The target needs composition the backend cannot perform.
    #[error("{0}")]
    MetricNotComposite(String),

    /// Transport failure, timeout or non-2xx answer from the backend.
    #[error("metrics service unavailable: {reason}")]
    MetricServiceUnavailable {
        /// What went wrong on the wire.
        reason: String,
    },

    /// The backend answered 2xx with a body we could not interpret.
    #[error("malformed backend response: {0}")]
    MalformedResponse(String),
}

impl FetchError {
    /// Short label used for logs and failure counters.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::MetricNotFound => "not_found",
            FetchError::MetricNotComposite(_) => "not_composite",
            FetchError::MetricServiceUnavailable { .. } => "unavailable",
            FetchError::MalformedResponse(_) => "malformed",
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        let reason = if err.is_timeout() {
            "request timed out".to_string()
        } else {
            err.to_string()
        };
        FetchError::MetricServiceUnavailable { reason }
    }
}

/// Check request validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// `metric`, `range`, or both of `min`/`max` are absent.
    #[error("missing parameters")]
    MissingParameters,

    /// A parameter is present but does not parse.
    #[error("invalid parameter '{name}'")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Raw value as received.
        value: String,
    },
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, UmpireError>;
