//! Documented Defaults for the Activity Model
//!
//! Every tunable default lives here with its unit and provenance. Use these
//! constants instead of repeating magic numbers; configuration structs pick
//! them up in their `Default` impls.

/// Samples per analysis window.
///
/// Two seconds of data at the nominal 100 Hz recording rate. Long enough to
/// hold several gait cycles for walking, short enough that most windows fall
/// inside a single activity.
pub const DEFAULT_WINDOW_LEN: usize = 200;

/// Stride between consecutive window starts, in samples.
///
/// Half the window length, giving 50% overlap. Overlap doubles the number of
/// training vectors and smooths decoded boundaries at the cost of correlated
/// adjacent observations.
pub const DEFAULT_WINDOW_STRIDE: usize = 100;

/// Nominal recording rate (Hz) of the merged sensor files.
///
/// Used only to map DFT bins to physical frequencies. The rate is not
/// enforced per sample; recordings are treated as uniformly sampled.
pub const DEFAULT_SAMPLE_RATE_HZ: f64 = 100.0;

/// Relative diagonal jitter applied when a covariance fit is singular.
///
/// Scaled by the mean diagonal variance before being added, so the jitter is
/// proportionate to the feature magnitudes involved.
pub const DEFAULT_REGULARIZATION: f64 = 1e-6;

/// Tolerance for transition-matrix row sums.
///
/// Rows of an estimated transition matrix must sum to 1 within this bound.
pub const ROW_SUM_TOLERANCE: f64 = 1e-9;

/// Minimum feature vectors per state for a full-rank covariance.
///
/// With fewer than dimension + 1 vectors the sample covariance is singular
/// and the fit proceeds only under regularization, flagged as degraded.
pub const fn full_rank_sample_floor(dim: usize) -> usize {
    dim + 1
}
