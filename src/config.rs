//! Application configuration loaded from environment variables.

use serde::Deserialize;
use url::Url;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Metrics Backend ===
    /// Base URL of the Graphite-compatible backend.
    pub graphite_url: String,

    /// Timeout for the single backend request, in milliseconds.
    #[serde(default = "default_backend_timeout_ms")]
    pub backend_timeout_ms: u64,

    // === Server Configuration ===
    /// HTTP server port for the check endpoints.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Redirect plain-http requests to https.
    #[serde(default)]
    pub force_https: bool,

    /// Port for the Prometheus exporter; disabled when unset.
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

fn default_backend_timeout_ms() -> u64 {
    10_000
}

fn default_port() -> u16 {
    8080
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Build a config for a backend URL with every other field defaulted.
    pub fn with_graphite_url(graphite_url: impl Into<String>) -> Self {
        Self {
            graphite_url: graphite_url.into(),
            backend_timeout_ms: default_backend_timeout_ms(),
            port: default_port(),
            force_https: false,
            metrics_port: None,
        }
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        self.graphite_base_url()?;

        if self.backend_timeout_ms == 0 {
            return Err("BACKEND_TIMEOUT_MS must be greater than 0".to_string());
        }

        if self.metrics_port == Some(self.port) {
            return Err("METRICS_PORT must differ from PORT".to_string());
        }

        Ok(())
    }

    /// Parse `GRAPHITE_URL`, requiring an absolute http(s) URL.
    pub fn graphite_base_url(&self) -> Result<Url, String> {
        let url = Url::parse(self.graphite_url.trim())
            .map_err(|e| format!("GRAPHITE_URL is not a valid URL: {}", e))?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(format!("GRAPHITE_URL must use http or https, got {}", other)),
        }
    }
}
