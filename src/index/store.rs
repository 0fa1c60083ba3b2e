//! SQLite-backed hash index store.
//!
//! # Durability
//!
//! The database runs in WAL mode with `synchronous=FULL`: a successful
//! [`HashIndex::insert_if_absent`] has reached stable storage before the call
//! returns, so a racing inserter can only observe `false` for a digest whose
//! winning entry is already durable. Reopening the store after a crash that
//! followed a successful insert must still report the digest as present.
//!
//! # Concurrency
//!
//! The connection is wrapped in a `Mutex`, making [`HashIndex`] shareable
//! across threads. In-process races serialize on the lock; cross-process
//! races serialize on SQLite's own locking. Either way the `PRIMARY KEY`
//! conflict clause guarantees exactly one winner per digest.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

use rusqlite::{params, Connection, OptionalExtension};

use crate::hasher::Digest;

/// Result alias for index store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by the index store.
///
/// A `false` return from [`HashIndex::insert_if_absent`] is *not* an error;
/// these variants all mean the store itself misbehaved.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// The directory for the store location could not be created.
    #[error("Failed to create index directory {path}: {source}")]
    Directory {
        /// Directory that could not be created
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The database could not be opened or initialized.
    #[error("Failed to open hash index at {path}: {source}")]
    Open {
        /// Store location
        path: PathBuf,
        /// The underlying SQLite error
        #[source]
        source: rusqlite::Error,
    },

    /// A read query failed.
    #[error("Hash index query failed: {0}")]
    Query(#[source] rusqlite::Error),

    /// A write failed for a reason other than "entry already exists".
    #[error("Hash index write failed: {0}")]
    Write(#[source] rusqlite::Error),

    /// An entry that lost an insert race could not find the winning entry.
    #[error("Hash index entry for digest {0} vanished after insert conflict")]
    MissingWinner(String),
}

/// A persisted record associating one digest with the first file observed
/// with that content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Content digest (primary key).
    pub digest: Digest,
    /// Path of the first file admitted with this content.
    pub path: PathBuf,
    /// Unix timestamp of the admission.
    pub admitted_at: u64,
}

/// Durable mapping from content digest to first-seen file path.
pub struct HashIndex {
    conn: Mutex<Connection>,
    location: PathBuf,
}

impl std::fmt::Debug for HashIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashIndex")
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

impl HashIndex {
    /// Open or create the index database at `path`.
    ///
    /// Idempotent: opening an already-initialized store does not alter
    /// existing entries. The parent directory is created if missing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the location is unwritable or the database
    /// is corrupted beyond repair.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| StoreError::Directory {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let conn = Connection::open(path).map_err(|e| StoreError::Open {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::initialize(conn, path.to_path_buf())
    }

    /// Open a private in-memory index.
    ///
    /// Carries no durability; intended for tests and dry runs.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| StoreError::Open {
            path: PathBuf::from(":memory:"),
            source: e,
        })?;

        Self::initialize(conn, PathBuf::from(":memory:"))
    }

    fn initialize(conn: Connection, location: PathBuf) -> StoreResult<Self> {
        let map_open = |e: rusqlite::Error| StoreError::Open {
            path: location.clone(),
            source: e,
        };

        // journal_mode returns the resulting mode as a row.
        conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))
            .map_err(map_open)?;
        conn.pragma_update(None, "synchronous", "FULL")
            .map_err(map_open)?;
        conn.busy_timeout(Duration::from_secs(5)).map_err(map_open)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS content_index (
                digest          BLOB PRIMARY KEY,
                first_seen_path TEXT NOT NULL,
                admitted_at     INTEGER NOT NULL
            )",
            [],
        )
        .map_err(map_open)?;

        log::debug!("Opened hash index at {}", location.display());

        Ok(Self {
            conn: Mutex::new(conn),
            location,
        })
    }

    /// The location this index was opened at.
    #[must_use]
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Look up the first-seen path for a digest.
    ///
    /// Pure read; returns `None` if the digest has never been admitted.
    pub fn lookup(&self, digest: &Digest) -> StoreResult<Option<PathBuf>> {
        Ok(self.entry(digest)?.map(|e| e.path))
    }

    /// Fetch the full entry for a digest, if present.
    pub fn entry(&self, digest: &Digest) -> StoreResult<Option<IndexEntry>> {
        let conn = self.lock();
        conn.query_row(
            "SELECT first_seen_path, admitted_at FROM content_index WHERE digest = ?1",
            params![digest.as_slice()],
            |row| {
                Ok(IndexEntry {
                    digest: *digest,
                    path: PathBuf::from(row.get::<_, String>(0)?),
                    admitted_at: row.get(1)?,
                })
            },
        )
        .optional()
        .map_err(StoreError::Query)
    }

    /// Atomically record `path` as the first holder of `digest`.
    ///
    /// Returns `true` and durably persists a new entry only if no entry
    /// existed for the digest; returns `false` and leaves the store unchanged
    /// if one already did. Concurrent attempts on the same digest produce
    /// exactly one `true`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] on storage failure (disk full,
    /// permission, corruption). Never returned for the duplicate case.
    pub fn insert_if_absent(&self, digest: &Digest, path: &Path) -> StoreResult<bool> {
        let admitted_at = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        let conn = self.lock();
        let inserted = conn
            .execute(
                "INSERT INTO content_index (digest, first_seen_path, admitted_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(digest) DO NOTHING",
                params![
                    digest.as_slice(),
                    path.to_string_lossy().into_owned(),
                    admitted_at
                ],
            )
            .map_err(StoreError::Write)?;

        Ok(inserted == 1)
    }

    /// Number of entries in the index.
    pub fn len(&self) -> StoreResult<u64> {
        let conn = self.lock();
        conn.query_row("SELECT COUNT(*) FROM content_index", [], |row| row.get(0))
            .map_err(StoreError::Query)
    }

    /// Whether the index holds no entries yet.
    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        // A poisoned lock only means another thread panicked mid-query;
        // the connection itself is still usable.
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}
