//! Candidate ingest: the copy/filter walk that feeds the classifier.
//!
//! Walks a source folder (typically a mounted card), keeps files whose
//! extension is in the configured media set, and copies them into the backup
//! tree. The copied paths form the ordered candidate batch the classifier
//! consumes. Which extensions count as media is decided here, never by the
//! dedup core.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Errors raised by the ingest stage.
#[derive(thiserror::Error, Debug)]
pub enum IngestError {
    /// The source folder does not exist or is not a directory.
    #[error("Source folder does not exist: {0}")]
    SourceMissing(PathBuf),

    /// The backup destination folder could not be created.
    #[error("Failed to create destination folder {path}: {source}")]
    CreateDest {
        /// Destination folder
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Recursively collect media files under `source`, in a deterministic order.
///
/// Entries are visited sorted by file name so the same tree always produces
/// the same batch order. Unreadable directory entries are logged and skipped.
///
/// # Errors
///
/// Returns [`IngestError::SourceMissing`] if `source` is not a directory.
pub fn collect_candidates(
    source: &Path,
    extensions: &HashSet<String>,
) -> Result<Vec<PathBuf>, IngestError> {
    if !source.is_dir() {
        return Err(IngestError::SourceMissing(source.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        if has_supported_extension(entry.path(), extensions) {
            files.push(entry.into_path());
        }
    }

    log::info!(
        "Found {} supported file(s) under {}",
        files.len(),
        source.display()
    );
    Ok(files)
}

/// True if the path's lowercase extension is in the supported set.
fn has_supported_extension(path: &Path, extensions: &HashSet<String>) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .is_some_and(|e| extensions.contains(&e))
}

/// Copy candidates into the backup folder, returning the destination paths.
///
/// The folder is created on demand. A file that fails to copy is logged and
/// left out of the returned batch; an existing destination file with the
/// same name is overwritten.
///
/// # Errors
///
/// Returns [`IngestError::CreateDest`] if the backup folder cannot be
/// created. Per-file copy failures are not errors.
pub fn copy_to_backup(
    candidates: &[PathBuf],
    dest_folder: &Path,
) -> Result<Vec<PathBuf>, IngestError> {
    fs::create_dir_all(dest_folder).map_err(|e| IngestError::CreateDest {
        path: dest_folder.to_path_buf(),
        source: e,
    })?;
    log::info!("Destination folder: {}", dest_folder.display());

    let mut copied = Vec::new();
    for src in candidates {
        let Some(name) = src.file_name() else {
            continue;
        };
        let dest = dest_folder.join(name);

        match fs::copy(src, &dest) {
            Ok(_) => {
                log::debug!("Copied {} to {}", src.display(), dest.display());
                copied.push(dest);
            }
            Err(e) => {
                log::error!("Error copying {}: {}", src.display(), e);
            }
        }
    }

    log::info!(
        "Copied {} file(s) to {}",
        copied.len(),
        dest_folder.display()
    );
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn extensions(list: &[&str]) -> HashSet<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_collect_filters_by_extension() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("photo.JPG"), b"a").unwrap();
        fs::write(dir.path().join("clip.mp4"), b"b").unwrap();
        fs::write(dir.path().join("notes.txt"), b"c").unwrap();
        fs::write(dir.path().join("noext"), b"d").unwrap();

        let found = collect_candidates(dir.path(), &extensions(&["jpg", "mp4"])).unwrap();

        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["clip.mp4", "photo.JPG"]);
    }

    #[test]
    fn test_collect_recurses_in_sorted_order() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("bb")).unwrap();
        fs::create_dir(dir.path().join("aa")).unwrap();
        fs::write(dir.path().join("bb/2.jpg"), b"x").unwrap();
        fs::write(dir.path().join("aa/1.jpg"), b"y").unwrap();
        fs::write(dir.path().join("aa/3.jpg"), b"z").unwrap();

        let found = collect_candidates(dir.path(), &extensions(&["jpg"])).unwrap();

        let rel: Vec<_> = found
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            rel,
            vec![
                PathBuf::from("aa/1.jpg"),
                PathBuf::from("aa/3.jpg"),
                PathBuf::from("bb/2.jpg"),
            ]
        );
    }

    #[test]
    fn test_collect_missing_source_is_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("not-mounted");

        assert!(matches!(
            collect_candidates(&missing, &extensions(&["jpg"])),
            Err(IngestError::SourceMissing(_))
        ));
    }

    #[test]
    fn test_copy_creates_folder_and_copies() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("card");
        fs::create_dir(&src).unwrap();
        let a = src.join("a.jpg");
        fs::write(&a, b"payload").unwrap();

        let dest = dir.path().join("backup/Photos_2025");
        let copied = copy_to_backup(&[a], &dest).unwrap();

        assert_eq!(copied, vec![dest.join("a.jpg")]);
        assert_eq!(fs::read(&copied[0]).unwrap(), b"payload");
    }

    #[test]
    fn test_copy_overwrites_same_name() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("card");
        fs::create_dir(&src).unwrap();
        let a = src.join("a.jpg");
        fs::write(&a, b"new bytes").unwrap();

        let dest = dir.path().join("backup");
        fs::create_dir(&dest).unwrap();
        fs::write(dest.join("a.jpg"), b"old").unwrap();

        let copied = copy_to_backup(&[a], &dest).unwrap();
        assert_eq!(fs::read(&copied[0]).unwrap(), b"new bytes");
    }

    #[test]
    fn test_copy_skips_failing_file() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("card");
        fs::create_dir(&src).unwrap();
        let good = src.join("good.jpg");
        fs::write(&good, b"ok").unwrap();
        let vanished = src.join("vanished.jpg");

        let dest = dir.path().join("backup");
        let copied = copy_to_backup(&[vanished, good], &dest).unwrap();

        assert_eq!(copied, vec![dest.join("good.jpg")]);
    }
}
