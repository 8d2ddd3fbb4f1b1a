//! Decoder Evaluation Against Ground Truth
//!
//! ## Overview
//!
//! Compares a decoded state sequence with the ground-truth majority
//! labels of the same windows. All counts live in one K×K confusion
//! matrix with rows indexed by the actual state and columns by the
//! predicted state, so every derived metric is a pure function of the
//! matrix:
//!
//! ```text
//! sensitivity(s) = TP / (TP + FN)     (row s)
//! specificity(s) = TN / (TN + FP)     (everything off row/column s)
//! accuracy       = trace / total
//! ```
//!
//! Per-state metrics whose denominator is zero (a state absent from the
//! ground truth, or predicted for every single window) have no defined
//! value and return `None` rather than an arbitrary 0 or 1. Overall
//! accuracy of an empty evaluation is defined as 0.0.

use crate::{
    activity::Activity,
    errors::{ModelError, ModelResult},
};

/// K×K confusion counts; `[actual][predicted]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConfusionMatrix {
    counts: [[u32; Activity::COUNT]; Activity::COUNT],
}

impl ConfusionMatrix {
    /// Empty matrix
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from aligned actual/predicted sequences
    ///
    /// The sequences must describe the same windows in the same order;
    /// differing lengths mean the caller paired up the wrong recordings
    /// and are a hard error.
    pub fn from_pairs(actual: &[Activity], predicted: &[Activity]) -> ModelResult<Self> {
        if actual.len() != predicted.len() {
            return Err(ModelError::LengthMismatch {
                expected: actual.len(),
                actual: predicted.len(),
            });
        }
        let mut matrix = Self::new();
        for (&truth, &guess) in actual.iter().zip(predicted.iter()) {
            matrix.record(truth, guess);
        }
        Ok(matrix)
    }

    /// Count one (actual, predicted) pair
    pub fn record(&mut self, actual: Activity, predicted: Activity) {
        self.counts[actual.index()][predicted.index()] += 1;
    }

    /// Fold another matrix's counts into this one
    pub fn merge(&mut self, other: &ConfusionMatrix) {
        for i in 0..Activity::COUNT {
            for j in 0..Activity::COUNT {
                self.counts[i][j] += other.counts[i][j];
            }
        }
    }

    /// Count for one (actual, predicted) cell
    pub fn count(&self, actual: Activity, predicted: Activity) -> u32 {
        self.counts[actual.index()][predicted.index()]
    }

    /// Raw counts, `[actual][predicted]`
    pub fn counts(&self) -> &[[u32; Activity::COUNT]; Activity::COUNT] {
        &self.counts
    }

    /// Windows evaluated in total
    pub fn total(&self) -> u64 {
        self.counts
            .iter()
            .flat_map(|row| row.iter())
            .map(|&c| c as u64)
            .sum()
    }

    /// Correctly decoded windows (the diagonal)
    pub fn correct(&self) -> u64 {
        (0..Activity::COUNT)
            .map(|i| self.counts[i][i] as u64)
            .sum()
    }

    /// Ground-truth occurrences of one state
    pub fn support(&self, state: Activity) -> u32 {
        self.counts[state.index()].iter().sum()
    }

    /// Times one state was predicted, regardless of truth
    pub fn predicted_total(&self, state: Activity) -> u32 {
        self.counts.iter().map(|row| row[state.index()]).sum()
    }

    /// Overall fraction of correctly decoded windows; 0.0 when empty
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.correct() as f64 / total as f64
    }

    /// TP / (TP + FN) for one state; `None` when the state never occurs
    pub fn sensitivity(&self, state: Activity) -> Option<f64> {
        let support = self.support(state);
        if support == 0 {
            return None;
        }
        let tp = self.count(state, state);
        Some(tp as f64 / support as f64)
    }

    /// TN / (TN + FP) for one state; `None` when no negatives exist
    pub fn specificity(&self, state: Activity) -> Option<f64> {
        let tp = self.count(state, state) as u64;
        let fn_ = (self.support(state) as u64) - tp;
        let fp = (self.predicted_total(state) as u64) - tp;
        let tn = self.total() - tp - fn_ - fp;
        if tn + fp == 0 {
            return None;
        }
        Some(tn as f64 / (tn + fp) as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Activity::{Jumping, Standing, Still, Walking};

    const TOL: f64 = 1e-12;

    fn sample_matrix() -> ConfusionMatrix {
        let actual = [Standing, Standing, Walking, Walking, Jumping];
        let predicted = [Standing, Walking, Walking, Walking, Jumping];
        ConfusionMatrix::from_pairs(&actual, &predicted).unwrap()
    }

    #[test]
    fn counts_land_in_the_right_cells() {
        let m = sample_matrix();
        assert_eq!(m.count(Standing, Standing), 1);
        assert_eq!(m.count(Standing, Walking), 1);
        assert_eq!(m.count(Walking, Walking), 2);
        assert_eq!(m.count(Jumping, Jumping), 1);
        assert_eq!(m.count(Still, Still), 0);
        assert_eq!(m.total(), 5);
        assert_eq!(m.correct(), 4);
    }

    #[test]
    fn accuracy_is_trace_over_total() {
        let m = sample_matrix();
        assert!((m.accuracy() - 0.8).abs() < TOL);
    }

    #[test]
    fn sensitivity_per_state() {
        let m = sample_matrix();
        assert!((m.sensitivity(Standing).unwrap() - 0.5).abs() < TOL);
        assert!((m.sensitivity(Walking).unwrap() - 1.0).abs() < TOL);
        assert!((m.sensitivity(Jumping).unwrap() - 1.0).abs() < TOL);
        // Still never occurs in the ground truth.
        assert_eq!(m.sensitivity(Still), None);
    }

    #[test]
    fn specificity_per_state() {
        let m = sample_matrix();
        // Standing: no false positives among 4 negatives.
        assert!((m.specificity(Standing).unwrap() - 1.0).abs() < TOL);
        // Walking: one false positive among 3 negatives.
        assert!((m.specificity(Walking).unwrap() - 2.0 / 3.0).abs() < TOL);
        assert!((m.specificity(Still).unwrap() - 1.0).abs() < TOL);
    }

    #[test]
    fn empty_evaluation_defaults() {
        let m = ConfusionMatrix::new();
        assert_eq!(m.accuracy(), 0.0);
        assert_eq!(m.sensitivity(Walking), None);
        // No windows at all: no negatives either.
        assert_eq!(m.specificity(Walking), None);
    }

    #[test]
    fn length_mismatch_rejected() {
        let err =
            ConfusionMatrix::from_pairs(&[Standing, Walking], &[Standing]).unwrap_err();
        assert_eq!(err, ModelError::LengthMismatch { expected: 2, actual: 1 });
    }

    #[test]
    fn perfect_prediction() {
        let labels = [Standing, Walking, Jumping, Still, Walking, Still];
        let m = ConfusionMatrix::from_pairs(&labels, &labels).unwrap();
        assert!((m.accuracy() - 1.0).abs() < TOL);
        for state in Activity::ALL {
            assert_eq!(m.sensitivity(state), Some(1.0));
            assert_eq!(m.specificity(state), Some(1.0));
        }
    }

    #[test]
    fn merge_accumulates() {
        let mut left = sample_matrix();
        let right = sample_matrix();
        left.merge(&right);
        assert_eq!(left.total(), 10);
        assert_eq!(left.count(Walking, Walking), 4);
        assert!((left.accuracy() - 0.8).abs() < TOL);
    }

    #[test]
    fn record_matches_from_pairs() {
        let mut m = ConfusionMatrix::new();
        m.record(Standing, Standing);
        m.record(Standing, Walking);
        m.record(Walking, Walking);
        m.record(Walking, Walking);
        m.record(Jumping, Jumping);
        assert_eq!(m, sample_matrix());
    }
}
