//! End-to-end training tests on synthetic labeled recordings
//!
//! Each test builds raw 100 Hz sessions with the shared generators,
//! fits a model from them, and checks the fitted parameters or the
//! classification of a fresh recording.

#![cfg(test)]

mod common;

use actigram_core::{
    classify, window::labeled_windows, Activity, ActivityHmm, ConfusionMatrix, InitialEstimate,
    ModelError, TrainingConfig, UnseenStatePolicy, WindowConfig,
};
use common::generators::{labeled_session, TestRng};

const FULL_CYCLE: [(Activity, usize); 4] = [
    (Activity::Standing, 2000),
    (Activity::Walking, 2000),
    (Activity::Jumping, 2000),
    (Activity::Still, 2000),
];

fn training_sessions(seed_base: u32, count: usize) -> Vec<Vec<actigram_core::ImuSample>> {
    (0..count)
        .map(|i| {
            let mut rng = TestRng::new(seed_base + i as u32);
            labeled_session(&mut rng, &FULL_CYCLE)
        })
        .collect()
}

/// Majority label of each analysis window, for ground truth.
fn window_labels(samples: &[actigram_core::ImuSample], config: WindowConfig) -> Vec<Activity> {
    labeled_windows(samples, &config)
        .filter_map(|(_, label)| label)
        .collect()
}

#[test]
fn test_fit_produces_stochastic_parameters() {
    let sessions = training_sessions(1000, 3);
    let borrowed: Vec<&[actigram_core::ImuSample]> =
        sessions.iter().map(|s| s.as_slice()).collect();

    let config = TrainingConfig::default().with_initial_estimate(InitialEstimate::Uniform);
    let model = ActivityHmm::fit(&config, &borrowed).unwrap();

    let mut initial_sum = 0.0;
    for &p in model.initial() {
        assert!((0.0..=1.0).contains(&p));
        initial_sum += p;
    }
    assert!((initial_sum - 1.0).abs() < 1e-9);

    for row in model.transitions() {
        let sum: f64 = row.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9, "row sums to {sum}");
        for &p in row {
            assert!((0.0..=1.0).contains(&p));
        }
    }

    // Activities run in long 2000-sample blocks, so self-transitions
    // dominate every row.
    for (i, row) in model.transitions().iter().enumerate() {
        assert!(row[i] > 0.5, "state {i} self-transition {} too weak", row[i]);
    }
}

#[test]
fn test_trained_model_classifies_fresh_session() {
    let sessions = training_sessions(2000, 3);
    let borrowed: Vec<&[actigram_core::ImuSample]> =
        sessions.iter().map(|s| s.as_slice()).collect();

    let config = TrainingConfig::default().with_initial_estimate(InitialEstimate::Uniform);
    let model = ActivityHmm::fit(&config, &borrowed).unwrap();

    let mut rng = TestRng::new(99);
    let fresh = labeled_session(
        &mut rng,
        &[(Activity::Walking, 1500), (Activity::Still, 1500)],
    );
    let truth = window_labels(&fresh, model.window());

    let decoding = classify(&model, &fresh).unwrap();
    assert_eq!(decoding.states.len(), truth.len());

    let matrix = ConfusionMatrix::from_pairs(&truth, &decoding.states).unwrap();
    assert!(
        matrix.accuracy() >= 0.9,
        "held-out accuracy {:.3} below floor",
        matrix.accuracy()
    );
}

#[test]
fn test_missing_activity_is_reported() {
    let mut rng = TestRng::new(3000);
    let session = labeled_session(
        &mut rng,
        &[
            (Activity::Standing, 2000),
            (Activity::Walking, 2000),
            (Activity::Still, 2000),
        ],
    );

    let config = TrainingConfig::default().with_initial_estimate(InitialEstimate::Uniform);
    let err = ActivityHmm::fit(&config, &[&session]).unwrap_err();
    assert_eq!(
        err,
        ModelError::InsufficientTrainingData {
            state: Activity::Jumping,
            required: 1,
            available: 0,
        }
    );
}

#[test]
fn test_unseen_policy_fail_rejects_sparse_labels() {
    let mut rng = TestRng::new(4000);
    let session = labeled_session(
        &mut rng,
        &[(Activity::Walking, 3000), (Activity::Still, 3000)],
    );

    let config = TrainingConfig::default().with_unseen_policy(UnseenStatePolicy::Fail);
    let err = ActivityHmm::fit(&config, &[&session]).unwrap_err();
    assert_eq!(
        err,
        ModelError::UnreachableState {
            state: Activity::Standing
        }
    );
}

#[test]
fn test_tiny_training_set_degrades_gracefully() {
    // 400 samples per activity yields 3 windows each, far below the
    // full-rank floor for 25 features, so every state gets the jitter
    // path. The model must still fit and decode.
    let mut rng = TestRng::new(5000);
    let session = labeled_session(
        &mut rng,
        &[
            (Activity::Standing, 400),
            (Activity::Walking, 400),
            (Activity::Jumping, 400),
            (Activity::Still, 400),
        ],
    );

    let config = TrainingConfig::default().with_initial_estimate(InitialEstimate::Uniform);
    let model = ActivityHmm::fit(&config, &[&session]).unwrap();
    assert!(model.emissions().any_regularized());

    let decoding = classify(&model, &session).unwrap();
    assert!(!decoding.states.is_empty());
    assert!(decoding.log_likelihood.is_finite());
}
