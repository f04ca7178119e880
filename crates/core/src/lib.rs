//! Core types and shared functionality for dirasa.
//!
//! This crate provides:
//! - The study archive (SQLite memoization store)
//! - The pipeline orchestrator and its provider traits
//! - Unified error types
//! - Configuration structures

pub mod activity;
pub mod archive;
pub mod config;
pub mod error;
pub mod pipeline;

pub use activity::{CanonicalActivity, ClassificationOutcome};
pub use archive::{ArchiveDb, StudyRecord};
pub use config::AppConfig;
pub use error::Error;
pub use pipeline::{Classify, Generate, Source, StudyPipeline, StudyResponse};
