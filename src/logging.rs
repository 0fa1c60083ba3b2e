//! Logging infrastructure for MediaSift.
//!
//! Structured logging using the `log` facade and `env_logger` backend.
//! Log levels are determined by (in priority order):
//!
//! 1. `RUST_LOG` environment variable (if set)
//! 2. CLI flags: `--quiet` (error only) or `--verbose` (debug/trace)
//! 3. Default: info level
//!
//! Diagnostics go to stderr; the classification report itself is printed by
//! the application layer, never from here.

use std::env;
use std::io::Write;

use env_logger::Builder;
use log::LevelFilter;

/// Initialize the logging subsystem based on CLI verbosity flags.
///
/// Call once at application start, before any logging calls.
///
/// # Arguments
///
/// * `verbose` - Verbosity count from CLI (0=info, 1=debug, 2+=trace)
/// * `quiet` - If true, only show errors (overridden by `RUST_LOG`)
///
/// # Panics
///
/// Panics if called more than once, as `env_logger` can only be installed
/// once per process.
pub fn init_logging(verbose: u8, quiet: bool) {
    let use_env = env::var("RUST_LOG").is_ok();

    let mut builder = Builder::new();

    if use_env {
        builder.parse_default_env();
    } else {
        builder.filter_level(determine_level(verbose, quiet));
    }

    configure_format(&mut builder, verbose);
    builder.init();

    log::debug!("Logging initialized at level: {:?}", log::max_level());
}

/// Determine the log level from CLI flags.
fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

/// Configure the log line format.
///
/// Verbose runs include timestamp and module path; the default format is
/// level + message only.
fn configure_format(builder: &mut Builder, verbose: u8) {
    if verbose >= 1 {
        builder.format(|buf, record| {
            let timestamp = buf.timestamp_seconds();
            let level = record.level();
            let level_style = buf.default_level_style(level);
            writeln!(
                buf,
                "{} {level_style}{:<5}{level_style:#} [{}] {}",
                timestamp,
                level,
                record.module_path().unwrap_or("unknown"),
                record.args()
            )
        });
    } else {
        builder.format(|buf, record| {
            let level = record.level();
            let level_style = buf.default_level_style(level);
            writeln!(
                buf,
                "{level_style}{:<5}{level_style:#} {}",
                level,
                record.args()
            )
        });
    }
}
