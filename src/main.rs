//! intersector: section a solid model with a plane
//!
//! Loads a shape, intersects it with a user-supplied plane, writes the
//! resulting edges to `intersection.stp` and shows the input and the result.

use std::process::ExitCode;

use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use intersector::backend::mesh::MeshBackend;
use intersector::cli::{self, Cli};
use intersector::config;

/// Determines the log level from CLI arguments.
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        },
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber for logging.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Entry point for the intersector command.
fn main() -> ExitCode {
    let args = Cli::parse();

    // Load configuration
    let cfg = match config::load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialise logging
    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    info!(version = env!("CARGO_PKG_VERSION"), "Starting intersector");

    let mut backend = MeshBackend::new();
    if let Some(viewer) = cfg.viewer.to_viewer() {
        info!(viewer = viewer.command(), "Viewer configured");
        backend = backend.with_viewer(viewer);
    }

    let result = cli::execute(&backend, &args.command, &mut std::io::stdout());
    cli::report(&result, &mut std::io::stderr())
}
