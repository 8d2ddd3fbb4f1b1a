//! Sample-to-Feature Pipeline
//!
//! ## Overview
//!
//! Glue between raw recordings and the statistical model: segment one
//! recording into windows, validate each window, and extract feature
//! vectors, keeping count of what was dropped along the way.
//!
//! ```text
//! samples ──▶ windows ──▶ validate ──▶ extract ──▶ Vec<FeatureVector>
//!                             │
//!                             └──▶ ExtractionStats (drop counters)
//! ```
//!
//! Validation is strict here even though the segmentation iterator is
//! lenient: a window with the wrong sample count or out-of-order
//! timestamps is dropped and counted, never extracted or decoded.
//!
//! ## Segment semantics
//!
//! For training, a dropped or unlabeled window also *breaks the label
//! chain*: [`FeaturePipeline::extract_labeled`] returns contiguous
//! segments, and transition counting never pairs windows that sit on
//! opposite sides of a gap. A recording with no gaps comes back as one
//! segment.

extern crate alloc;

use alloc::vec::Vec;

use crate::{
    activity::Activity,
    errors::ModelResult,
    features::{FeatureSchema, FeatureVector},
    model::ActivityHmm,
    sample::ImuSample,
    viterbi::Decoding,
    window::{labeled_windows, validate_window, windows, WindowConfig},
};

/// Counters accumulated across pipeline calls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    /// Full-length windows produced by segmentation
    pub windows_seen: usize,
    /// Windows that passed validation and were extracted
    pub features_extracted: usize,
    /// Windows rejected by validation (sample count or timestamp order)
    pub dropped_invalid: usize,
    /// Windows with no majority label, skipped during training extraction
    pub dropped_unlabeled: usize,
}

impl ExtractionStats {
    /// Total windows dropped for any reason
    pub fn dropped(&self) -> usize {
        self.dropped_invalid + self.dropped_unlabeled
    }
}

/// Windowing and feature extraction with accumulated statistics
#[derive(Debug, Clone)]
pub struct FeaturePipeline {
    window: WindowConfig,
    schema: FeatureSchema,
    stats: ExtractionStats,
}

impl FeaturePipeline {
    /// Build a pipeline from a validated window config and a schema
    pub fn new(window: WindowConfig, schema: FeatureSchema) -> ModelResult<Self> {
        window.validate()?;
        Ok(Self {
            window,
            schema,
            stats: ExtractionStats::default(),
        })
    }

    /// Window configuration in use
    pub fn window(&self) -> WindowConfig {
        self.window
    }

    /// Feature schema in use
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Counters accumulated since construction or the last reset
    pub fn stats(&self) -> ExtractionStats {
        self.stats
    }

    /// Zero the accumulated counters
    pub fn reset_stats(&mut self) {
        self.stats = ExtractionStats::default();
    }

    /// Extract one recording's feature sequence for decoding
    ///
    /// Invalid windows are dropped and counted; the output holds one
    /// vector per *surviving* window, in order. Pair decoded states with
    /// ground truth derived from the same pipeline so the two sequences
    /// stay aligned.
    pub fn extract(&mut self, samples: &[ImuSample]) -> ModelResult<Vec<FeatureVector>> {
        let mut out = Vec::new();
        for window in windows(samples, &self.window) {
            self.stats.windows_seen += 1;
            if validate_window(window, self.window.len).is_err() {
                self.stats.dropped_invalid += 1;
                continue;
            }
            out.push(self.schema.extract(window)?);
            self.stats.features_extracted += 1;
        }
        Ok(out)
    }

    /// Extract labeled training segments from one recording
    ///
    /// Each segment is a run of consecutive valid, labeled windows.
    /// Dropped and unlabeled windows end the current segment, so label
    /// transitions are only ever counted between windows that were truly
    /// adjacent.
    pub fn extract_labeled(
        &mut self,
        samples: &[ImuSample],
    ) -> ModelResult<Vec<Vec<(FeatureVector, Activity)>>> {
        let mut segments = Vec::new();
        let mut current: Vec<(FeatureVector, Activity)> = Vec::new();

        for (window, label) in labeled_windows(samples, &self.window) {
            self.stats.windows_seen += 1;
            if validate_window(window, self.window.len).is_err() {
                self.stats.dropped_invalid += 1;
                flush(&mut segments, &mut current);
                continue;
            }
            match label {
                Some(activity) => {
                    current.push((self.schema.extract(window)?, activity));
                    self.stats.features_extracted += 1;
                }
                None => {
                    self.stats.dropped_unlabeled += 1;
                    flush(&mut segments, &mut current);
                }
            }
        }
        flush(&mut segments, &mut current);
        Ok(segments)
    }
}

fn flush(
    segments: &mut Vec<Vec<(FeatureVector, Activity)>>,
    current: &mut Vec<(FeatureVector, Activity)>,
) {
    if !current.is_empty() {
        segments.push(core::mem::take(current));
    }
}

/// Window, extract, and decode one recording against a trained model
///
/// Convenience wrapper for the full inference path. Malformed windows
/// are dropped before decoding (and warned about), so the decoded
/// sequence covers surviving windows only.
pub fn classify(model: &ActivityHmm, samples: &[ImuSample]) -> ModelResult<Decoding> {
    let mut pipeline = FeaturePipeline::new(model.window(), model.schema().clone())?;
    let features = pipeline.extract(samples)?;
    let stats = pipeline.stats();
    if stats.dropped_invalid > 0 {
        log_warn!(
            "dropped {} of {} windows before decoding",
            stats.dropped_invalid,
            stats.windows_seen
        );
    }
    model.decode(&features)
}
