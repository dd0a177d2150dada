//! dirscout - Recursive HTTP Content Discovery Scanner
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use dirscout::config::{CliArgs, Command, ScanArgs, ScanConfig};
use dirscout::output::{JsonLinesSink, LogSink, MultiSink, ResultSink};
use dirscout::progress::{print_header, print_summary, ProgressReporter};
use dirscout::scan::ScanCoordinator;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    // Parse CLI arguments
    let args = CliArgs::parse();

    // Setup logging
    setup_logging(args.verbose, args.quiet)?;

    match args.command {
        Command::Scan(scan_args) => run_scan(scan_args),
    }
}

fn run_scan(args: ScanArgs) -> Result<()> {
    // Validate and create config
    let config = ScanConfig::from_args(args).context("Invalid configuration")?;
    config.log_summary();

    // Assemble result sinks
    let mut sinks =
        MultiSink::new().with(Arc::new(LogSink::new(config.ignore_statuses.clone())));

    let json = match &config.output_path {
        Some(path) => {
            let sink = Arc::new(JsonLinesSink::create(path).context("Failed to open output file")?);
            sinks.push(sink.clone());
            Some(sink)
        }
        None => None,
    };

    let progress = if config.show_progress {
        let reporter = Arc::new(ProgressReporter::new(config.ignore_statuses.clone()));
        sinks.push(reporter.clone());
        Some(reporter)
    } else {
        None
    };

    if let Some(ref p) = progress {
        p.set_status("Loading dictionary...");
    }

    // Create coordinator (loads the dictionary, builds the HTTP client)
    let sink: Arc<dyn ResultSink> = Arc::new(sinks);
    let coordinator = ScanCoordinator::from_config(&config, sink)
        .context("Failed to initialize scanner")?;

    // Setup signal handler for graceful shutdown
    let handle = coordinator.handle();
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupt received, shutting down...");
        handle.cancel();
    })
    .context("Failed to set signal handler")?;

    // Print header
    if config.show_progress {
        print_header(
            config.target.as_str(),
            config.worker_count,
            &config.dictionary.to_string(),
            coordinator.dictionary().len(),
        );
    }

    // Run the scan
    let summary = coordinator.run().context("Scan failed")?;

    // Finish progress
    if let Some(ref p) = progress {
        if summary.completed {
            p.finish("Scan completed");
        } else {
            p.finish("Scan interrupted");
        }
    }

    if let Some(ref sink) = json {
        sink.flush().context("Failed to write output file")?;
        info!(path = %sink.path().display(), "Results written");
    }

    // Print summary
    if let Some(ref p) = progress {
        print_summary(&summary, &p.findings());
    }

    // Report success/failure
    if !summary.completed {
        info!("Scan was interrupted before completion");
    }

    if summary.failures > 0 {
        info!(failures = summary.failures, "Scan completed with request failures");
    }

    Ok(())
}

fn setup_logging(verbose: bool, quiet: bool) -> Result<()> {
    let filter = if quiet {
        EnvFilter::new("warn")
    } else if verbose {
        EnvFilter::new("dirscout=debug,warn")
    } else {
        EnvFilter::new("dirscout=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}
