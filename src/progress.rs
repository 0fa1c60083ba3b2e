//! Progress reporting utilities using indicatif.
//!
//! The classifier reports through the [`ProgressCallback`] trait; the
//! [`Progress`] struct implements it with a terminal progress bar for the
//! hashing phase. The core never prints on its own, so a quiet reporter (or
//! none at all) leaves the terminal untouched.

use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressStyle};

/// Progress callback for the classification pipeline.
///
/// Implement this trait to receive progress updates while a batch is being
/// hashed and classified.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase (e.g., "hashing")
    /// * `total` - Total number of items to process
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called for each item processed.
    ///
    /// # Arguments
    ///
    /// * `current` - Current item number (1-based)
    /// * `path` - Path being processed
    fn on_progress(&self, current: usize, path: &str);

    /// Called when an item has been processed, providing its size.
    fn on_item_completed(&self, _bytes: u64) {}

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);
}

/// Terminal progress reporter.
pub struct Progress {
    hashing: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, no progress bar is displayed.
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            hashing: Mutex::new(None),
            quiet,
        }
    }

    fn hashing_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet || phase != "hashing" {
            return;
        }

        let pb = ProgressBar::new(total as u64);
        pb.set_style(Self::hashing_style());
        pb.set_message("Hashing");
        *self.hashing.lock().unwrap_or_else(|e| e.into_inner()) = Some(pb);
    }

    fn on_progress(&self, current: usize, path: &str) {
        if self.quiet {
            return;
        }

        if let Some(ref pb) = *self.hashing.lock().unwrap_or_else(|e| e.into_inner()) {
            pb.set_position(current as u64);
            pb.set_message(truncate_path(path, 30));
        }
    }

    fn on_phase_end(&self, phase: &str) {
        if self.quiet || phase != "hashing" {
            return;
        }

        if let Some(pb) = self
            .hashing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            pb.finish_with_message("Hashing complete");
        }
    }
}

/// Truncate a path for display in the progress bar.
fn truncate_path(path: &str, max_len: usize) -> String {
    if path.len() <= max_len {
        return path.to_string();
    }

    let file_name = std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    if file_name.len() >= max_len {
        return format!("...{}", &file_name[file_name.len() - max_len + 3..]);
    }

    format!(".../{}", file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_path_unchanged() {
        assert_eq!(truncate_path("a/b.jpg", 30), "a/b.jpg");
    }

    #[test]
    fn test_truncate_long_path_keeps_file_name() {
        let path = "/very/long/backup/tree/of/folders/IMG_0001.jpg";
        assert_eq!(truncate_path(path, 30), ".../IMG_0001.jpg");
    }

    #[test]
    fn test_truncate_long_file_name() {
        let name = "a".repeat(40);
        let truncated = truncate_path(&name, 30);
        assert!(truncated.starts_with("..."));
        assert_eq!(truncated.len(), 30);
    }
}
