//! MediaSift - Content-Addressed Duplicate Filter
//!
//! A cross-platform Rust CLI application that ingests media files from
//! removable storage into a backup tree and filters out files already known
//! by content (BLAKE3), using a persistent hash index that enforces an
//! at-most-once-per-content guarantee across all runs.

pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod hasher;
pub mod index;
pub mod ingest;
pub mod logging;
pub mod progress;
pub mod signal;

use std::sync::Arc;

use anyhow::Context;

use crate::classify::{Classifier, ClassifierConfig};
use crate::cli::Cli;
use crate::config::Config;
use crate::error::ExitCode;
use crate::index::HashIndex;
use crate::progress::Progress;

/// Run the application with parsed CLI arguments.
///
/// Ingests the source folder, classifies the resulting batch against the
/// hash index, and prints the report. Returns the process exit code for
/// completed runs; hard failures (unusable source, unusable index) surface
/// as errors.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let mut config = Config::load();
    cli.apply_to(&mut config);

    if cli.save_config {
        config.save().context("Cannot save configuration")?;
        log::info!("Saved configuration defaults");
    }

    let handler = signal::install_handler()?;

    // Ingest: filter the source tree, then (unless --no-copy) mirror the
    // candidates into the backup folder. The classifier operates on
    // whichever paths will actually be kept.
    let candidates = ingest::collect_candidates(&cli.source, &config.extensions)?;
    if candidates.is_empty() {
        log::warn!("No media files provided for duplicate checking");
        return Ok(ExitCode::NoCandidates);
    }

    let batch = if cli.no_copy {
        candidates
    } else {
        ingest::copy_to_backup(&candidates, &config.backup_folder())?
    };
    if batch.is_empty() {
        log::warn!("No files were copied into the backup folder");
        return Ok(ExitCode::NoCandidates);
    }

    if handler.is_shutdown_requested() {
        return Ok(ExitCode::Interrupted);
    }

    let index_path = config.resolve_index_path()?;
    let index = HashIndex::open(&index_path)
        .with_context(|| format!("Cannot open hash index at {}", index_path.display()))?;
    log::info!("Using hash index at {}", index.location().display());

    let mut classifier_config = ClassifierConfig::default()
        .with_shutdown_flag(handler.get_flag())
        .with_progress_callback(Arc::new(Progress::new(cli.quiet || cli.json)));
    if let Some(threads) = config.io_threads {
        classifier_config = classifier_config.with_io_threads(threads);
    }

    let classifier = Classifier::new(classifier_config);
    let report = classifier.classify_batch(&index, &batch)?;

    // The report is the interface to the downstream upload/notification
    // stages: JSON for machines, summary plus upload list for humans.
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.summary());
        if !report.unique.is_empty() {
            println!("\nReady for upload:");
            for path in &report.unique {
                println!("  {}", path.display());
            }
        }
    }

    if report.interrupted {
        Ok(ExitCode::Interrupted)
    } else if report.is_empty() {
        Ok(ExitCode::NoCandidates)
    } else if report.skipped.is_empty() {
        Ok(ExitCode::Success)
    } else {
        Ok(ExitCode::PartialSuccess)
    }
}
