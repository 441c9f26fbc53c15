//! Metric threshold checks.
//!
//! A check fetches recent datapoints for a metric, averages them, and
//! compares the average against optional `min`/`max` bounds.

pub mod evaluator;
pub mod request;

pub use evaluator::{mean, CheckBody, CheckResult, Evaluator, Outcome};
pub use request::{CheckParams, CheckRequest};
