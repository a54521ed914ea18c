//! Subburn - Batch Subtitle Burn-in
//!
//! Entry point: parses the two directory arguments, sets up logging, and
//! hands the run to the batch orchestrator.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{
    filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

use subburn::cli::Args;
use subburn::config::Config;
use subburn::error::BurnError;
use subburn::gate::{AutoContinue, BatchGate, StdinGate};
use subburn::media::EncoderFactory;
use subburn::progress::ProgressTracker;
use subburn::workflow::BatchOrchestrator;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging to both console and file
    let _guard = setup_logging(args.verbose)?;
    info!("Starting Subburn - Batch Subtitle Burn-in");

    // Load configuration
    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => Config::default(),
    };
    info!(
        "Batch size {}, concurrency hint {}, encoder {}",
        config.batch.batch_size, config.batch.concurrency, config.media.binary_path
    );

    // Validate input directory before any work is attempted
    if !args.input_dir.exists() {
        return Err(BurnError::FileNotFound(args.input_dir.display().to_string()).into());
    }
    if !args.input_dir.is_dir() {
        return Err(BurnError::NotADirectory(args.input_dir.display().to_string()).into());
    }

    let gate: Box<dyn BatchGate> = if args.yes {
        Box::new(AutoContinue)
    } else {
        Box::new(StdinGate::new())
    };
    let encoder = EncoderFactory::create_encoder(config.media.clone());
    let tracker = Arc::new(ProgressTracker::terminal());

    let orchestrator = BatchOrchestrator::new(config, encoder, tracker, gate);
    orchestrator.run(&args.input_dir, &args.output_dir).await?;

    info!("Subburn completed");
    Ok(())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<WorkerGuard> {
    // Create log directory
    let log_dir = std::env::current_dir()?.join(".subburn").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "subburn.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);

    // Determine log level
    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    // The progress display owns stdout, so the console only shows warnings
    // unless verbose output was requested
    let console_level = if verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_filter(console_level);

    // Create file layer
    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    // Setup layered subscriber
    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer);

    // Initialize the subscriber
    subscriber
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!(
        "Logging initialized - console: {}, file: {}",
        console_level,
        log_dir.join("subburn.log").display()
    );

    Ok(guard)
}
