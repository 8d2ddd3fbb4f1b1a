//! Randomized invariant checks
//!
//! Complements the example-driven tests with properties that must hold
//! for arbitrary inputs: estimation always produces probability
//! distributions, extraction and decoding are total on finite data, and
//! segmentation arithmetic matches its closed form.

#![cfg(test)]

mod common;

use proptest::prelude::*;

use actigram_core::{
    transition::{self, ensure_distribution, ensure_row_stochastic},
    window::{windows, WindowConfig},
    Activity, FeatureSchema, FeatureVector, ImuSample, InitialEstimate, UnseenStatePolicy,
};
use common::generators::synthetic_model;

fn label_sequences() -> impl Strategy<Value = Vec<Vec<Activity>>> {
    prop::collection::vec(
        prop::collection::vec(
            (0usize..Activity::COUNT).prop_map(|i| Activity::ALL[i]),
            1..40,
        ),
        1..6,
    )
}

fn sample_rows() -> impl Strategy<Value = Vec<[f64; 6]>> {
    let row = (
        -50.0..50.0f64,
        -50.0..50.0f64,
        -50.0..50.0f64,
        -20.0..20.0f64,
        -20.0..20.0f64,
        -20.0..20.0f64,
    )
        .prop_map(|(ax, ay, az, gx, gy, gz)| [ax, ay, az, gx, gy, gz]);
    prop::collection::vec(row, 8..64)
}

fn recording(rows: &[[f64; 6]]) -> Vec<ImuSample> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            ImuSample::new(
                i as i64 * 10_000_000,
                [row[0], row[1], row[2]],
                [row[3], row[4], row[5]],
            )
        })
        .collect()
}

proptest! {
    #[test]
    fn test_fitted_rows_are_stochastic(sequences in label_sequences()) {
        let borrowed: Vec<&[Activity]> = sequences.iter().map(|s| s.as_slice()).collect();
        for initial in [
            InitialEstimate::StartFractions,
            InitialEstimate::StateFrequency,
            InitialEstimate::Uniform,
        ] {
            let est = transition::fit(&borrowed, UnseenStatePolicy::UniformRow, initial).unwrap();
            prop_assert!(ensure_row_stochastic(&est.matrix).is_ok());
            prop_assert!(ensure_distribution(&est.initial).is_ok());
        }
    }

    #[test]
    fn test_standard_extraction_is_total_and_deterministic(rows in sample_rows()) {
        let window = recording(&rows);
        let schema = FeatureSchema::standard();

        let features = schema.extract(&window).unwrap();
        prop_assert_eq!(features.len(), schema.len());
        prop_assert!(features.iter().all(|v| v.is_finite()));

        let again = schema.extract(&window).unwrap();
        prop_assert_eq!(features, again);
    }

    #[test]
    fn test_decode_is_total_on_finite_input(values in prop::collection::vec(-1000.0..1000.0f64, 0..80)) {
        let model = synthetic_model([0.25; 4], [-5.0, 0.0, 5.0, 10.0], 1.0, 0.7);
        let observations: Vec<FeatureVector> = values.iter().map(|&x| vec![x]).collect();

        let decoding = model.decode(&observations).unwrap();
        prop_assert_eq!(decoding.states.len(), observations.len());
        prop_assert!(decoding.log_likelihood.is_finite());
        prop_assert!(decoding.log_likelihood <= 0.0);
    }

    #[test]
    fn test_window_count_matches_arithmetic(
        n in 0usize..200,
        len in 1usize..50,
        stride in 1usize..50,
    ) {
        let samples: Vec<ImuSample> = (0..n)
            .map(|i| ImuSample::new(i as i64, [0.0; 3], [0.0; 3]))
            .collect();
        let config = WindowConfig::default().with_len(len).with_stride(stride);

        let expected = if n >= len { (n - len) / stride + 1 } else { 0 };
        let produced: Vec<_> = windows(&samples, &config).collect();
        prop_assert_eq!(produced.len(), expected);
        prop_assert!(produced.iter().all(|w| w.len() == len));
    }
}
