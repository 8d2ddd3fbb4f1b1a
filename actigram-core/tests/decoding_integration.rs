//! Integration tests for Viterbi decoding on simulated models
//!
//! Covers:
//! - Exact path recovery on well-separated synthetic models across seeds
//! - Byte-identical determinism of repeated decodes
//! - Deterministic lowest-index tie-breaking
//! - Structural zeros in the transition matrix
//! - Log-space stability over long sequences

#![cfg(test)]

mod common;

use actigram_core::{Activity, ConfusionMatrix};
use common::generators::{emit, simulate_path, synthetic_model, TestRng};

const UNIFORM: [f64; 4] = [0.25; 4];

#[test]
fn test_decode_recovers_simulated_paths_across_seeds() {
    let means = [0.0, 10.0, 20.0, 30.0];
    let model = synthetic_model(UNIFORM, means, 1.0, 0.85);

    let seeds = 40usize;
    let mut exact = 0usize;
    for seed in 1..=seeds {
        let mut rng = TestRng::new(seed as u32 * 7919);
        let path = simulate_path(&mut rng, model.initial(), model.transitions(), 60);
        let observations = emit(&mut rng, &path, &means, 1.0);

        let decoding = model.decode(&observations).unwrap();
        if decoding.states == path {
            exact += 1;
        }
    }
    // Means sit 10 sigma apart; recovery should be essentially certain.
    assert!(
        exact * 100 >= seeds * 95,
        "exact recovery on only {exact}/{seeds} seeds"
    );
}

#[test]
fn test_decode_is_byte_identical_across_calls() {
    let means = [0.0, 4.0, 8.0, 12.0];
    let model = synthetic_model(UNIFORM, means, 1.0, 0.8);

    let mut rng = TestRng::new(271828);
    let path = simulate_path(&mut rng, model.initial(), model.transitions(), 200);
    let observations = emit(&mut rng, &path, &means, 1.0);

    let first = model.decode(&observations).unwrap();
    let second = model.decode(&observations).unwrap();
    assert_eq!(first.states, second.states);
    assert_eq!(
        first.log_likelihood.to_bits(),
        second.log_likelihood.to_bits()
    );
}

#[test]
fn test_identical_states_always_tie_break_low() {
    // Every state has the same emission and the matrix is uniform, so
    // every step of the trellis is a four-way tie.
    let model = synthetic_model(UNIFORM, [5.0; 4], 1.0, 0.25);

    let mut rng = TestRng::new(31);
    let observations = emit(&mut rng, &[Activity::Walking; 25], &[5.0; 4], 1.0);
    let decoding = model.decode(&observations).unwrap();
    assert_eq!(decoding.states, vec![Activity::Standing; 25]);
}

#[test]
fn test_structural_zeros_are_never_crossed() {
    // Forward chain: each state may stay or advance to the next; Still
    // is absorbing. Backward moves have probability zero.
    let means = [0.0, 6.0, 12.0, 18.0];
    let transitions = [
        [0.9, 0.1, 0.0, 0.0],
        [0.0, 0.9, 0.1, 0.0],
        [0.0, 0.0, 0.9, 0.1],
        [0.0, 0.0, 0.0, 1.0],
    ];
    let initial = [1.0, 0.0, 0.0, 0.0];
    let chain = synthetic_model(initial, means, 1.0, 0.5);
    let model = actigram_core::ActivityHmm::from_parts(
        initial,
        transitions,
        chain.emissions().clone(),
        chain.schema().clone(),
        chain.window(),
    )
    .unwrap();

    for seed in [7u32, 77, 777] {
        let mut rng = TestRng::new(seed);
        let path = simulate_path(&mut rng, model.initial(), model.transitions(), 120);
        let observations = emit(&mut rng, &path, &means, 1.5);

        let decoding = model.decode(&observations).unwrap();
        for pair in decoding.states.windows(2) {
            assert!(
                pair[1].index() >= pair[0].index(),
                "decoded a zero-probability backward move {:?} -> {:?}",
                pair[0],
                pair[1]
            );
        }
    }
}

#[test]
fn test_long_sequences_stay_in_log_range() {
    // Two thousand windows: the linear-space path probability is far
    // below f64's smallest subnormal, but log space never underflows.
    let means = [0.0, 3.0, 6.0, 9.0];
    let model = synthetic_model(UNIFORM, means, 1.0, 0.9);

    let mut rng = TestRng::new(424242);
    let path = simulate_path(&mut rng, model.initial(), model.transitions(), 2000);
    let observations = emit(&mut rng, &path, &means, 1.0);

    let decoding = model.decode(&observations).unwrap();
    assert_eq!(decoding.states.len(), 2000);
    assert!(decoding.log_likelihood.is_finite());
    assert!(decoding.log_likelihood < -1000.0);
}

#[test]
fn test_noisy_overlap_still_scores_well() {
    // Means 2 sigma apart: raw nearest-mean assignment would err often,
    // but sticky transitions pull the path back to the truth.
    let means = [0.0, 2.0, 4.0, 6.0];
    let model = synthetic_model(UNIFORM, means, 1.0, 0.9);

    let mut rng = TestRng::new(5150);
    let path = simulate_path(&mut rng, model.initial(), model.transitions(), 400);
    let observations = emit(&mut rng, &path, &means, 1.0);

    let decoding = model.decode(&observations).unwrap();
    let matrix = ConfusionMatrix::from_pairs(&path, &decoding.states).unwrap();
    assert!(
        matrix.accuracy() >= 0.85,
        "decode accuracy {:.3} below floor",
        matrix.accuracy()
    );
}
