//! Batch classification results.
//!
//! The report is the classifier's sole output channel: every candidate that
//! entered a completed batch appears in exactly one of `unique`, `duplicates`,
//! or `skipped`.

use std::path::PathBuf;

use bytesize::ByteSize;
use serde::Serialize;

/// Why a candidate was excluded from both the unique and duplicate sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The file no longer existed at classification time.
    Missing,
    /// The file could not be hashed (read failure, permission, I/O fault).
    Unreadable(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing => write!(f, "missing"),
            Self::Unreadable(cause) => write!(f, "unreadable: {cause}"),
        }
    }
}

/// A candidate excluded from classification, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    /// The excluded candidate.
    pub path: PathBuf,
    /// Why it was excluded.
    pub reason: SkipReason,
}

/// A candidate rejected as a duplicate of an earlier admission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateFile {
    /// The rejected candidate.
    pub path: PathBuf,
    /// The first file ever admitted with the same content, possibly from a
    /// previous run and possibly no longer on disk.
    pub original: PathBuf,
}

/// Result of classifying one batch of candidates.
///
/// Transient and owned by the caller; nothing in here is persisted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    /// Candidates admitted in this run, in input order. This is the list the
    /// upload stage consumes.
    pub unique: Vec<PathBuf>,
    /// Candidates rejected in this run, each pointing at the recorded holder
    /// of its content.
    pub duplicates: Vec<DuplicateFile>,
    /// Candidates excluded from both sets.
    pub skipped: Vec<SkippedFile>,
    /// Number of candidates supplied to the batch.
    pub total_candidates: usize,
    /// Total byte size of the admitted files.
    pub unique_bytes: u64,
    /// True if the batch was cancelled before examining every candidate.
    /// Unexamined candidates appear in none of the lists.
    pub interrupted: bool,
}

impl BatchReport {
    /// Create a report for a batch of `total_candidates` files.
    #[must_use]
    pub fn new(total_candidates: usize) -> Self {
        Self {
            total_candidates,
            ..Self::default()
        }
    }

    /// Number of candidates admitted.
    #[must_use]
    pub fn unique_count(&self) -> usize {
        self.unique.len()
    }

    /// Number of candidates rejected as duplicates.
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.duplicates.len()
    }

    /// Number of candidates excluded.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// True if no candidate produced a result at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.unique.is_empty() && self.duplicates.is_empty() && self.skipped.is_empty()
    }

    /// Human-readable multi-line summary of the batch.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Duplicate check completed:".to_string(),
            format!("- Total files checked: {}", self.total_candidates),
            format!(
                "- Unique files: {} ({})",
                self.unique_count(),
                ByteSize::b(self.unique_bytes)
            ),
            format!("- Duplicates skipped: {}", self.duplicate_count()),
        ];

        if !self.skipped.is_empty() {
            lines.push(format!("- Not processed: {}", self.skipped_count()));
        }

        if !self.duplicates.is_empty() {
            let sample: Vec<String> = self
                .duplicates
                .iter()
                .take(5)
                .map(|d| {
                    d.path
                        .file_name()
                        .map_or_else(|| d.path.display().to_string(), |n| n.to_string_lossy().into_owned())
                })
                .collect();
            let ellipsis = if self.duplicate_count() > 5 { "..." } else { "" };
            lines.push(format!("- Sample duplicates: {}{}", sample.join(", "), ellipsis));
        }

        if self.interrupted {
            lines.push("- Interrupted before completion".to_string());
        }

        lines.join("\n")
    }
}
