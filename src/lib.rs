//! Metric threshold checks over a Graphite-compatible backend.
//!
//! `GET /check?metric=...&range=...&min=...&max=...` fetches the metric's
//! datapoints for the trailing window, averages them, and answers with the
//! average and a status code a load balancer can act on:
//!
//! ```text
//! 200 {"value": 4.0}                      average within [min, max]
//! 500 {"value": 4.0}                      average out of bounds
//! 404 {"error": "metric not found"}       backend has no such target
//! 503 {"error": "connecting to ..."}      backend unreachable
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`graphite`]: Metric source trait and Graphite client
//! - [`check`]: Request validation and evaluation
//! - [`api`]: HTTP routes and handlers
//! - [`metrics`]: Prometheus metrics for the service itself
//! - [`utils`]: Utility functions

pub mod api;
pub mod check;
pub mod config;
pub mod error;
pub mod graphite;
pub mod metrics;
pub mod utils;

pub use config::Config;
pub use error::{Result, UmpireError};
