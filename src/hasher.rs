//! BLAKE3 file hasher with streaming support.
//!
//! Computes the 256-bit content digest that serves as a file's identity
//! throughout the system. The digest depends only on the file's byte content,
//! never on its path, name, or filesystem metadata.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// Buffer size for streaming hash computation (64 KiB).
const HASH_BUFFER_SIZE: usize = 64 * 1024;

/// 256-bit BLAKE3 content digest.
pub type Digest = [u8; 32];

/// Errors that can occur while hashing a file.
///
/// All variants mean the same thing to the classifier: the file was not
/// processed and must not be recorded in the index.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    fn from_io(path: &Path, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source,
            },
        }
    }
}

/// Streaming BLAKE3 hasher.
///
/// Stateless; a single instance can be shared across threads and reused
/// for any number of files.
///
/// # Example
///
/// ```no_run
/// use mediasift::hasher::Hasher;
/// use std::path::Path;
///
/// let hasher = Hasher::new();
/// let digest = hasher.digest(Path::new("photo.jpg")).unwrap();
/// println!("{}", mediasift::hasher::digest_to_hex(&digest));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Hasher;

impl Hasher {
    /// Create a new hasher.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Compute the content digest of a file without loading it into memory.
    ///
    /// Reads the file in 64 KiB chunks and folds them through BLAKE3.
    /// Identical byte content yields an identical digest regardless of path
    /// or metadata.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or a read fails
    /// mid-stream. The caller must treat the file as not processed.
    pub fn digest(&self, path: &Path) -> Result<Digest, HashError> {
        let file = File::open(path).map_err(|e| HashError::from_io(path, e))?;

        let mut reader = BufReader::with_capacity(HASH_BUFFER_SIZE, file);
        let mut hasher = blake3::Hasher::new();
        let mut buffer = [0u8; HASH_BUFFER_SIZE];

        loop {
            let bytes_read = reader
                .read(&mut buffer)
                .map_err(|e| HashError::from_io(path, e))?;

            if bytes_read == 0 {
                break;
            }

            hasher.update(&buffer[..bytes_read]);
        }

        Ok(*hasher.finalize().as_bytes())
    }
}

/// Convert a digest to its lowercase hexadecimal string form.
#[must_use]
pub fn digest_to_hex(digest: &Digest) -> String {
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Parse a 64-character hexadecimal string back into a digest.
#[must_use]
pub fn hex_to_digest(hex: &str) -> Option<Digest> {
    if hex.len() != 64 {
        return None;
    }

    let mut digest = [0u8; 32];
    for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
        let hex_str = std::str::from_utf8(chunk).ok()?;
        digest[i] = u8::from_str_radix(hex_str, 16).ok()?;
    }

    Some(digest)
}
