//! Command-line interface definitions for MediaSift.
//!
//! All CLI arguments are defined with the clap derive API. The binary has a
//! single operation (ingest a source folder and classify the candidates
//! against the persistent hash index), so the surface is flat, no
//! subcommands.
//!
//! # Example
//!
//! ```bash
//! # Ingest a mounted card into the backup tree and filter duplicates
//! mediasift /media/card
//!
//! # Classify in place, machine-readable report
//! mediasift /media/card --no-copy --json
//!
//! # Verbose mode with a custom index location
//! mediasift -v /media/card --index /srv/backup/index.db
//! ```

use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;

/// Content-addressed duplicate filter for media card backups.
///
/// MediaSift copies media files from a source folder into the backup tree
/// and classifies each one as new or already-known by content, using a
/// persistent BLAKE3 hash index. Files seen in any earlier run are reported
/// as duplicates and excluded from the upload list.
#[derive(Debug, Parser)]
#[command(name = "mediasift")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Source folder to ingest (e.g. the mounted card)
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Backup destination root
    #[arg(short, long, value_name = "DIR")]
    pub dest: Option<PathBuf>,

    /// Backup subfolder under the destination root (default: Photos_<year>)
    #[arg(long, value_name = "NAME")]
    pub subfolder: Option<String>,

    /// Path to the hash index database
    ///
    /// If not specified, a default platform-specific path is used.
    #[arg(long, value_name = "PATH", env = "MEDIASIFT_INDEX")]
    pub index: Option<PathBuf>,

    /// Classify source files in place instead of copying them into the
    /// backup tree first
    #[arg(long)]
    pub no_copy: bool,

    /// Extension to ingest, without the dot (can be specified multiple
    /// times; replaces the configured set)
    #[arg(short = 'e', long = "extension", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Number of I/O threads for hashing (default: 4)
    ///
    /// Lower values reduce disk thrashing on HDDs.
    #[arg(long, value_name = "N")]
    pub io_threads: Option<usize>,

    /// Print the full report as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Persist the effective settings as the new configuration defaults
    #[arg(long)]
    pub save_config: bool,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress output and all logging except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Merge CLI overrides into the loaded configuration.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(ref dest) = self.dest {
            config.destination = dest.clone();
        }
        if let Some(ref subfolder) = self.subfolder {
            config.backup_subfolder = Some(subfolder.clone());
        }
        if let Some(ref index) = self.index {
            config.index_path = Some(index.clone());
        }
        if !self.extensions.is_empty() {
            config.extensions = self.extensions.iter().map(|e| e.to_lowercase()).collect();
        }
        if let Some(threads) = self.io_threads {
            config.io_threads = Some(threads);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_invocation() {
        let cli = Cli::try_parse_from(["mediasift", "/media/card"]).unwrap();
        assert_eq!(cli.source, PathBuf::from("/media/card"));
        assert!(!cli.no_copy);
        assert!(!cli.json);
        assert!(cli.extensions.is_empty());
    }

    #[test]
    fn test_source_is_required() {
        assert!(Cli::try_parse_from(["mediasift"]).is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["mediasift", "/src", "-q", "-v"]).is_err());
    }

    #[test]
    fn test_apply_to_overrides_config() {
        let cli = Cli::try_parse_from([
            "mediasift",
            "/media/card",
            "--dest",
            "/backup",
            "--subfolder",
            "Trip",
            "--index",
            "/data/index.db",
            "-e",
            "JPG",
            "-e",
            "mov",
            "--io-threads",
            "2",
        ])
        .unwrap();

        let mut config = Config::default();
        cli.apply_to(&mut config);

        assert_eq!(config.destination, PathBuf::from("/backup"));
        assert_eq!(config.backup_subfolder.as_deref(), Some("Trip"));
        assert_eq!(config.index_path, Some(PathBuf::from("/data/index.db")));
        // Extensions replace the configured set and are lowercased.
        assert_eq!(config.extensions.len(), 2);
        assert!(config.extensions.contains("jpg"));
        assert!(config.extensions.contains("mov"));
        assert_eq!(config.io_threads, Some(2));
    }

    #[test]
    fn test_apply_to_keeps_defaults_without_flags() {
        let cli = Cli::try_parse_from(["mediasift", "/media/card"]).unwrap();

        let mut config = Config::default();
        let before = config.clone();
        cli.apply_to(&mut config);

        assert_eq!(config.extensions, before.extensions);
        assert_eq!(config.destination, before.destination);
        assert!(config.index_path.is_none());
    }
}
