//! Error Types for Training and Decoding Failures
//!
//! ## Design
//!
//! Errors follow three rules:
//!
//! 1. **Small and Copy**: every variant carries inline payloads only
//!    (`usize`, `u64`, `&'static str`), so results can be returned and
//!    matched without allocation even in `no_std` builds.
//!
//! 2. **Fatal vs. recovered**: schema mismatches and missing training data
//!    are fatal and surface here. Singular covariances are *not* errors;
//!    they are recovered in place by regularization (see
//!    [`crate::gaussian`]) and reported through the degraded-fit flag and a
//!    warning log.
//!
//! 3. **Errors carry the comparison**: a caller receiving
//!    `SchemaMismatch { expected: 25, actual: 18 }` can log or act on the
//!    numbers without re-deriving them.
//!
//! ## Handling Strategy
//!
//! ```rust,no_run
//! use actigram_core::{ModelError, ActivityHmm};
//!
//! fn decode_or_drop(model: &ActivityHmm, obs: &[Vec<f64>]) {
//!     match model.decode(obs) {
//!         Ok(decoding) => {
//!             // Use decoding.states
//!         }
//!         Err(ModelError::SchemaMismatch { .. }) => {
//!             // Wrong feature pipeline wired up; abort the run
//!         }
//!         Err(_) => {
//!             // Remaining errors indicate malformed input sequences
//!         }
//!     }
//! }
//! ```

use thiserror_no_std::Error;

use crate::activity::Activity;

/// Result type for model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// Training and decoding errors - kept small and Copy
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ModelError {
    /// Window does not contain the configured number of samples
    #[error("Window has {actual} samples, expected {expected}")]
    WindowSize {
        /// Configured window length
        expected: usize,
        /// Samples actually present
        actual: usize,
    },

    /// Window timestamps are not strictly increasing
    #[error("Timestamps not strictly increasing at sample {index}")]
    TimestampOrder {
        /// Index of the first out-of-order sample
        index: usize,
    },

    /// Feature dimensionality differs between training and inference
    #[error("Feature dimension {actual} does not match trained dimension {expected}")]
    SchemaMismatch {
        /// Dimension the model was trained with
        expected: usize,
        /// Dimension of the offending vector
        actual: usize,
    },

    /// Feature schemas have equal length but different kinds or order
    #[error("Feature schema fingerprint {actual:#018x} does not match trained {expected:#018x}")]
    SchemaFingerprint {
        /// Fingerprint the model was trained with
        expected: u64,
        /// Fingerprint of the offending schema
        actual: u64,
    },

    /// A state has too few feature vectors to fit its emission Gaussian
    #[error("State {state} has {available} training vectors, need {required}")]
    InsufficientTrainingData {
        /// State whose fit failed
        state: Activity,
        /// Minimum vectors required
        required: usize,
        /// Vectors actually assigned
        available: usize,
    },

    /// A state never occurs as a transition source and the fallback is disabled
    #[error("State {state} never observed as a transition source")]
    UnreachableState {
        /// State with no outgoing transitions
        state: Activity,
    },

    /// Operation requires a non-empty sequence
    #[error("Input sequence is empty")]
    EmptySequence,

    /// Decoded and ground-truth sequences differ in length
    #[error("Sequence length {actual} does not match {expected}")]
    LengthMismatch {
        /// Length of the reference sequence
        expected: usize,
        /// Length of the sequence being compared
        actual: usize,
    },

    /// A transition-matrix row does not sum to 1 within tolerance
    #[error("Transition row {row} is not stochastic")]
    NotRowStochastic {
        /// Offending row index
        row: usize,
    },

    /// The initial state distribution does not sum to 1 within tolerance
    #[error("Initial distribution is not a probability vector")]
    InvalidInitialDistribution,

    /// Factorization failed and regularization could not recover it
    #[error("Numerical instability: {reason}")]
    NumericalInstability {
        /// Short description of the failing computation
        reason: &'static str,
    },

    /// A configuration value rules out any valid computation
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// Which parameter is unusable
        reason: &'static str,
    },
}

#[cfg(feature = "defmt")]
impl defmt::Format for ModelError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::WindowSize { expected, actual } =>
                defmt::write!(fmt, "Window has {} samples, expected {}", actual, expected),
            Self::TimestampOrder { index } =>
                defmt::write!(fmt, "Timestamps out of order at {}", index),
            Self::SchemaMismatch { expected, actual } =>
                defmt::write!(fmt, "Feature dim {} != trained {}", actual, expected),
            Self::SchemaFingerprint { .. } =>
                defmt::write!(fmt, "Feature schema fingerprint mismatch"),
            Self::InsufficientTrainingData { state, required, available } =>
                defmt::write!(
                    fmt,
                    "State {} has {} vectors, need {}",
                    state.index(),
                    available,
                    required
                ),
            Self::UnreachableState { state } =>
                defmt::write!(fmt, "State {} unreachable as source", state.index()),
            Self::EmptySequence =>
                defmt::write!(fmt, "Empty input sequence"),
            Self::LengthMismatch { expected, actual } =>
                defmt::write!(fmt, "Length {} != {}", actual, expected),
            Self::NotRowStochastic { row } =>
                defmt::write!(fmt, "Row {} not stochastic", row),
            Self::InvalidInitialDistribution =>
                defmt::write!(fmt, "Initial distribution not a probability vector"),
            Self::NumericalInstability { reason } =>
                defmt::write!(fmt, "Numerical instability: {}", reason),
            Self::InvalidConfig { reason } =>
                defmt::write!(fmt, "Invalid configuration: {}", reason),
        }
    }
}
