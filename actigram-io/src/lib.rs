//! File Formats for Actigram Recordings and Trained Models
//!
//! ## Overview
//!
//! `actigram-core` is deliberately free of file I/O and serialization: it
//! consumes in-memory sample slices and produces in-memory parameters.
//! This crate owns everything that touches disk around it:
//!
//! - [`csv`] reads merged recording sessions (one CSV file per session)
//!   into labeled [`ImuSample`](actigram_core::ImuSample) vectors.
//! - [`snapshot`] persists a trained model as JSON and re-validates it on
//!   load, so a decoded-against model is always one that factorizes.
//! - [`report`] renders an evaluation run as a JSON report.
//!
//! ## Recording format
//!
//! One session per file, header line first, int64 nanosecond timestamps:
//!
//! ```csv
//! timestamp,acc_x,acc_y,acc_z,gyr_x,gyr_y,gyr_z,activity
//! 1698403200000000000,0.12,-0.03,9.79,0.001,0.002,-0.001,standing
//! 1698403200010000000,0.09,-0.01,9.82,0.002,0.001,0.000,standing
//! ```
//!
//! Ingestion is tolerant per line: a malformed line is counted and
//! skipped, an unknown activity label yields an unlabeled sample. Only a
//! wrong header fails the whole file, because a wrong column order would
//! silently scramble every axis.
//!
//! ## Numeric fidelity
//!
//! Snapshots round-trip every `f64` exactly: values are written in
//! shortest-representation decimal and parsed back with full precision,
//! so a reloaded model decodes identically to the one that was saved.

pub mod csv;
pub mod report;
pub mod snapshot;

// Public API
pub use csv::{read_session, ReaderStats, SessionReader, CSV_HEADER};
pub use report::{ActivityReport, EvaluationReport};
pub use snapshot::{load_model, save_model, ModelSnapshot, SNAPSHOT_VERSION};

/// Errors for recording ingestion and model persistence
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Underlying file I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// First line of a recording is not the expected column header
    #[error("Bad CSV header: expected {expected:?}, got {actual:?}")]
    Header {
        /// Header the format requires
        expected: &'static str,
        /// Header actually present
        actual: String,
    },

    /// JSON encoding or parsing failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Snapshot written by an incompatible format version
    #[error("Snapshot format version {actual} not supported (expected {expected})")]
    SnapshotVersion {
        /// Version this build reads and writes
        expected: u32,
        /// Version found in the file
        actual: u32,
    },

    /// Snapshot field that does not map onto a model component
    #[error("Invalid snapshot field: {0}")]
    SnapshotField(String),

    /// Core validation rejected the loaded parameters
    #[error("Model validation failed: {0}")]
    Model(actigram_core::ModelError),
}

impl From<actigram_core::ModelError> for StorageError {
    fn from(err: actigram_core::ModelError) -> Self {
        StorageError::Model(err)
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
