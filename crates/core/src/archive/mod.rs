//! SQLite-backed archive of generated market studies.
//!
//! This module provides the persistent memoization store, using SQLite with
//! async access via tokio-rusqlite. It supports:
//!
//! - Exact-match lookup by unique canonical activity name
//! - Atomic insert-if-absent writes (duplicate inserts are benign)
//! - Full-archive listing, most recent first
//! - Automatic schema migrations and WAL mode for concurrent access
//!
//! The archive is append-only by design: records are never mutated or
//! evicted once written.

pub mod connection;
pub mod migrations;
pub mod studies;

pub use crate::Error;

pub use connection::ArchiveDb;
pub use studies::StudyRecord;
