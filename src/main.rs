//! Metric threshold check service entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use umpire::api::{create_router, AppState};
use umpire::check::{CheckParams, Evaluator};
use umpire::config::Config;
use umpire::graphite::GraphiteClient;
use umpire::metrics;
use umpire::utils::shutdown_signal;

/// Threshold checks over Graphite metrics.
#[derive(Parser, Debug)]
#[command(name = "umpire")]
#[command(about = "Health-check endpoint that compares averaged Graphite metrics against bounds")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP server port (overrides PORT).
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the check endpoints (default).
    Serve {
        /// HTTP server port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration validity.
    CheckConfig,

    /// Run a single check and print the response body.
    Check {
        /// Metric name or target expression.
        #[arg(long)]
        metric: String,

        /// Lookback window in seconds.
        #[arg(long)]
        range: u64,

        /// Lower bound.
        #[arg(long, allow_negative_numbers = true)]
        min: Option<f64>,

        /// Upper bound.
        #[arg(long, allow_negative_numbers = true)]
        max: Option<f64>,

        /// Treat an empty window as healthy.
        #[arg(long)]
        empty_ok: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("umpire=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    // Initialize metrics
    metrics::init_metrics();

    // Handle subcommands
    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(),
        Some(Command::Check {
            metric,
            range,
            min,
            max,
            empty_ok,
        }) => {
            let params = CheckParams {
                metric: Some(metric),
                min: min.map(|v| v.to_string()),
                max: max.map(|v| v.to_string()),
                range: Some(range.to_string()),
                empty_ok: empty_ok.then(String::new),
            };
            cmd_check(params).await
        }
        Some(Command::Serve { port }) => cmd_serve(port.or(args.port)).await,
        None => cmd_serve(args.port).await,
    }
}

/// Load and validate configuration, logging the failure reason.
fn load_config() -> anyhow::Result<Config> {
    let config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    Ok(config)
}

/// Check configuration validity.
fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("UMPIRE - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Graphite URL: {}", config.graphite_url);
    println!("  Backend Timeout: {}ms", config.backend_timeout_ms);
    println!("  Port: {}", config.port);
    println!("  Force HTTPS: {}", config.force_https);
    match config.metrics_port {
        Some(port) => println!("  Metrics Exporter: port {}", port),
        None => println!("  Metrics Exporter: Disabled"),
    }
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Run one check from the command line.
async fn cmd_check(params: CheckParams) -> anyhow::Result<()> {
    let config = load_config()?;
    let evaluator = Evaluator::new(Arc::new(GraphiteClient::new(&config)?));

    let result = evaluator.check(params).await;
    println!("{}", serde_json::to_string(&result.body)?);

    if result.is_healthy() {
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "check {} ({})",
            result.outcome,
            result.status
        ))
    }
}

/// Serve the HTTP API until a shutdown signal arrives.
async fn cmd_serve(port_override: Option<u16>) -> anyhow::Result<()> {
    info!("Loading configuration...");
    let mut config = load_config()?;

    if let Some(port) = port_override {
        config.port = port;
    }

    info!("Configuration loaded successfully");
    info!("Metrics backend: {}", config.graphite_url);
    info!("Backend timeout: {}ms", config.backend_timeout_ms);
    info!("HTTPS enforcement: {}", if config.force_https { "enabled" } else { "disabled" });

    if let Some(metrics_port) = config.metrics_port {
        let addr = SocketAddr::from(([0, 0, 0, 0], metrics_port));
        metrics::install_exporter(addr)?;
        info!("Prometheus exporter listening on {}", addr);
    }

    let source = GraphiteClient::new(&config)?;
    let app_state = AppState::new(Evaluator::new(Arc::new(source)));
    let router = create_router(app_state, config.force_https);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
