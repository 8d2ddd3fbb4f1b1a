//! HMM activity classification engine for actigram
//!
//! Turns 6-axis inertial recordings (accelerometer + gyroscope) into
//! per-window activity labels with a four-state Hidden Markov Model:
//! overlapping windows, time- and frequency-domain features, per-state
//! multivariate Gaussian emissions, and log-space Viterbi decoding.
//!
//! Key constraints:
//! - All probability math in log space (f64); no density is ever
//!   exponentiated, so long sequences cannot underflow
//! - Deterministic end to end, including documented tie-breaks
//! - `no_std` + `alloc` compatible; all transcendentals via `libm`
//!
//! ```no_run
//! use actigram_core::{ActivityHmm, TrainingConfig, pipeline};
//! use actigram_core::sample::ImuSample;
//!
//! fn run(training: &[&[ImuSample]], fresh: &[ImuSample]) {
//!     let config = TrainingConfig::default();
//!     let model = ActivityHmm::fit(&config, training).unwrap();
//!
//!     // One predicted activity per surviving two-second window
//!     let decoding = pipeline::classify(&model, fresh).unwrap();
//!     for activity in &decoding.states {
//!         let _ = activity;
//!     }
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[cfg(not(feature = "std"))]
extern crate alloc;

// Macro for optional logging
#[cfg(feature = "log")]
macro_rules! log_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {};
}

pub mod activity;
pub mod constants;
pub mod errors;
pub mod evaluation;
pub mod features;
pub mod gaussian;
pub mod linalg;
pub mod model;
pub mod pipeline;
pub mod sample;
pub mod transition;
pub mod viterbi;
pub mod window;

// Public API
pub use activity::Activity;
pub use errors::{ModelError, ModelResult};
pub use evaluation::ConfusionMatrix;
pub use features::{FeatureKind, FeatureSchema, FeatureVector, SpectralSource};
pub use gaussian::{EmissionModel, GaussianParams};
pub use model::{ActivityHmm, TrainingConfig};
pub use pipeline::{classify, ExtractionStats, FeaturePipeline};
pub use sample::{Axis, ImuSample, Sensor};
pub use transition::{InitialEstimate, StateMatrix, StateVector, UnseenStatePolicy};
pub use viterbi::Decoding;
pub use window::{TieBreak, WindowConfig};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_exists() {
        assert!(!VERSION.is_empty());
    }
}
