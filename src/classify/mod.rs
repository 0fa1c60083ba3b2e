//! Dedup classification module.
//!
//! Drives the hasher and the hash index over a batch of candidate files and
//! partitions them into unique/duplicate/skipped sets.
//!
//! # Pipeline
//!
//! 1. **Hash**: candidates are hashed in parallel on a bounded I/O pool.
//! 2. **Admit**: `insert_if_absent` runs sequentially in input order, so for
//!    a given batch order the partition is deterministic: the first file with
//!    a given content wins, every later one is reported as its duplicate.
//!
//! Per-file failures (missing, unreadable) are data in the report, never
//! batch errors. Only a failing index store aborts the batch.
//!
//! # Example
//!
//! ```no_run
//! use mediasift::classify::Classifier;
//! use mediasift::index::HashIndex;
//! use std::path::{Path, PathBuf};
//!
//! let index = HashIndex::open(Path::new("index.db")).unwrap();
//! let classifier = Classifier::with_defaults();
//! let batch = vec![PathBuf::from("/backup/a.jpg"), PathBuf::from("/backup/b.jpg")];
//! let report = classifier.classify_batch(&index, &batch).unwrap();
//! println!("{}", report.summary());
//! ```

pub mod report;

pub use report::{BatchReport, DuplicateFile, SkipReason, SkippedFile};

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use crate::hasher::{digest_to_hex, Digest, HashError, Hasher};
use crate::index::{HashIndex, StoreError};
use crate::progress::ProgressCallback;

/// Errors that abort an entire batch.
///
/// Expected per-file conditions never surface here; they are recorded in the
/// report instead.
#[derive(thiserror::Error, Debug)]
pub enum ClassifyError {
    /// The hash index failed. A failing store invalidates every later admit
    /// decision, so the batch stops immediately.
    #[error("Hash index failure aborted the batch: {0}")]
    Store(#[from] StoreError),
}

/// Configuration for batch classification.
#[derive(Clone, Default)]
pub struct ClassifierConfig {
    /// Number of I/O threads for parallel hashing.
    /// `None` uses the default of 4 to prevent disk thrashing.
    pub io_threads: Option<usize>,
    /// Optional shutdown flag for graceful cancellation.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for ClassifierConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierConfig")
            .field("io_threads", &self.io_threads)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl ClassifierConfig {
    /// Default number of I/O threads.
    pub const DEFAULT_IO_THREADS: usize = 4;

    /// Set the number of hashing threads.
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = Some(threads.max(1));
        self
    }

    /// Set the shutdown flag for graceful cancellation.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn io_threads(&self) -> usize {
        self.io_threads.unwrap_or(Self::DEFAULT_IO_THREADS)
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Outcome of the hashing stage for one candidate.
enum HashOutcome {
    Hashed { digest: Digest, size: u64 },
    Missing,
    Unreadable(String),
    Cancelled,
}

/// Batch classifier over a hash index.
#[derive(Debug, Default)]
pub struct Classifier {
    hasher: Hasher,
    config: ClassifierConfig,
}

impl Classifier {
    /// Create a classifier with the given configuration.
    #[must_use]
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            hasher: Hasher::new(),
            config,
        }
    }

    /// Create a classifier with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ClassifierConfig::default())
    }

    /// Classify a batch of candidate files against the index.
    ///
    /// Every candidate of a completed batch lands in exactly one of the
    /// report's `unique`, `duplicates`, or `skipped` lists. An empty batch is
    /// a valid call producing an all-empty report.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::Store`] if the index fails; per-file
    /// conditions never abort the batch.
    pub fn classify_batch(
        &self,
        index: &HashIndex,
        candidates: &[PathBuf],
    ) -> Result<BatchReport, ClassifyError> {
        let mut report = BatchReport::new(candidates.len());

        if candidates.is_empty() {
            log::debug!("Empty candidate batch, nothing to classify");
            return Ok(report);
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("hashing", candidates.len());
        }

        log::info!("Hashing {} candidate file(s)", candidates.len());
        let outcomes = self.hash_candidates(candidates);

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("hashing");
        }

        // Admission runs in input order; the index's test-and-set decides
        // winner vs. duplicate.
        for (path, outcome) in candidates.iter().zip(outcomes) {
            if self.config.is_shutdown_requested() {
                report.interrupted = true;
                break;
            }

            match outcome {
                HashOutcome::Cancelled => {
                    report.interrupted = true;
                }
                HashOutcome::Missing => {
                    log::warn!("File not found: {}", path.display());
                    report.skipped.push(SkippedFile {
                        path: path.clone(),
                        reason: SkipReason::Missing,
                    });
                }
                HashOutcome::Unreadable(cause) => {
                    log::warn!("Skipping {}: {}", path.display(), cause);
                    report.skipped.push(SkippedFile {
                        path: path.clone(),
                        reason: SkipReason::Unreadable(cause),
                    });
                }
                HashOutcome::Hashed { digest, size } => {
                    if index.insert_if_absent(&digest, path)? {
                        log::debug!("Admitted unique file: {}", path.display());
                        report.unique.push(path.clone());
                        report.unique_bytes += size;
                    } else {
                        let original = index
                            .lookup(&digest)?
                            .ok_or_else(|| StoreError::MissingWinner(digest_to_hex(&digest)))?;
                        log::debug!(
                            "Duplicate found: {} (matches {})",
                            path.display(),
                            original.display()
                        );
                        report.duplicates.push(DuplicateFile {
                            path: path.clone(),
                            original,
                        });
                    }
                }
            }
        }

        if report.interrupted {
            log::info!("Classification interrupted by shutdown signal");
        }
        log::info!(
            "Classified {} candidate(s): {} unique, {} duplicate(s), {} skipped",
            report.total_candidates,
            report.unique_count(),
            report.duplicate_count(),
            report.skipped_count()
        );

        Ok(report)
    }

    /// Hash all candidates on a bounded thread pool, preserving input order.
    fn hash_candidates(&self, candidates: &[PathBuf]) -> Vec<HashOutcome> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.io_threads())
            .build()
            .unwrap_or_else(|_| {
                log::warn!(
                    "Failed to create custom thread pool, using global pool with {} threads",
                    rayon::current_num_threads()
                );
                rayon::ThreadPoolBuilder::new().build().unwrap()
            });

        pool.install(|| {
            candidates
                .par_iter()
                .enumerate()
                .map(|(idx, path)| {
                    if self.config.is_shutdown_requested() {
                        return HashOutcome::Cancelled;
                    }

                    if let Some(ref callback) = self.config.progress_callback {
                        callback.on_progress(idx + 1, path.to_string_lossy().as_ref());
                    }

                    if !path.exists() {
                        return HashOutcome::Missing;
                    }

                    let size = fs::metadata(path).map(|m| m.len()).unwrap_or(0);

                    match self.hasher.digest(path) {
                        Ok(digest) => {
                            if let Some(ref callback) = self.config.progress_callback {
                                callback.on_item_completed(size);
                            }
                            HashOutcome::Hashed { digest, size }
                        }
                        // The file vanished between the existence check and
                        // the open; same classification as never present.
                        Err(HashError::NotFound(_)) => HashOutcome::Missing,
                        Err(e) => HashOutcome::Unreadable(e.to_string()),
                    }
                })
                .collect()
        })
    }
}
