//! Resource Registrar Entry Point
//!
//! Loads configuration, registers every resource kind, then keeps the
//! registrations alive until Ctrl-C.

use anyhow::Result;
use tracing::{Level, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use resource_registrar::core::{Bootstrap, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration from environment and -D arguments
    let config = Config::from_env().with_args(std::env::args().skip(1));

    // Initialize logging
    init_logging(&config.logging.level);

    info!("Starting {} v{}", config.server.name, config.server.version);
    info!("Working directory: {}", config.resources.working_dir.display());

    let mut bootstrap = Bootstrap::new(config);
    let summary = bootstrap.start()?;
    match serde_json::to_string(&summary) {
        Ok(json) => info!("Startup summary: {json}"),
        Err(e) => warn!("Cannot serialize startup summary: {e}"),
    }

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    if let Some(report) = bootstrap.stop() {
        info!(
            "{} resources unregistered, {} failed",
            report.unregistered(),
            report.failed()
        );
    }

    Ok(())
}

/// Initialize the logging subsystem.
///
/// Configures tracing with the specified log level and format.
fn init_logging(level: &str) {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();
}
