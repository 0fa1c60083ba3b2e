//! Persistent hash index module.
//!
//! This module provides the durable mapping from content digest to the first
//! file ever observed with that content. It is the single source of truth for
//! duplicate detection and survives process termination.
//!
//! # Architecture
//!
//! * [`store`]: SQLite-based persistence, schema management, and the atomic
//!   test-and-set primitive.
//!
//! # Invariants
//!
//! * The digest is the primary key: at most one entry per digest, ever.
//! * Entries are never updated or deleted by normal operation. The index is a
//!   permanent ledger, not a cache.
//! * A recorded path is the path that was active at the moment of insertion;
//!   whether that file still exists on disk is not tracked.

pub mod store;

pub use store::{HashIndex, IndexEntry, StoreError, StoreResult};
