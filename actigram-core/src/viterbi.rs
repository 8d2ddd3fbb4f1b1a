//! Log-Space Viterbi Decoding
//!
//! ## Overview
//!
//! Classic dynamic program over the trellis of (window, state) pairs,
//! entirely in log space:
//!
//! ```text
//! δ[0][i] = ln π[i] + ln p(obs[0] | i)
//! δ[t][j] = max_i( δ[t-1][i] + ln A[i][j] ) + ln p(obs[t] | j)
//! ```
//!
//! with ψ recording each arg-max for the backtrace. Probabilities of
//! whole paths over hundreds of windows underflow f64 catastrophically in
//! linear space, so log space is a correctness requirement here, not a
//! preference.
//!
//! Runs in O(T·K²) time and O(T·K) space for T observations and K
//! states: one rolling pair of score rows plus the full backpointer
//! table.
//!
//! ## Determinism
//!
//! Ties in any max are broken toward the lowest state index: candidates
//! are scanned in index order and replaced only on a strictly greater
//! score. Forbidden moves (`A[i][j] = 0`) enter the recurrence as
//! negative infinity and lose every comparison without ever producing
//! NaN; if *every* path to a state is forbidden, its score is negative
//! infinity and the tie-break still yields a well-defined path.

extern crate alloc;

use alloc::vec::Vec;

use crate::{
    activity::Activity,
    errors::ModelResult,
    features::FeatureVector,
    gaussian::EmissionModel,
    transition::{StateMatrix, StateVector},
};

/// Result of one decode pass
#[derive(Debug, Clone, PartialEq)]
pub struct Decoding {
    /// Most likely state per observation, in observation order
    pub states: Vec<Activity>,
    /// Joint log-likelihood of the decoded path and the observations
    pub log_likelihood: f64,
}

/// ln(p) with ln(0) mapped to negative infinity
#[inline]
fn safe_ln(p: f64) -> f64 {
    if p > 0.0 {
        libm::log(p)
    } else {
        f64::NEG_INFINITY
    }
}

/// Decode the most likely state sequence for one observation sequence
///
/// Pure function of its inputs: the model parts are read-only and decode
/// calls may run concurrently against the same trained model. Feature
/// vectors that the emission model cannot score (wrong dimension,
/// non-finite values) contribute negative infinity and the decode still
/// returns a well-formed path. An empty observation sequence decodes to
/// an empty path with log-likelihood zero.
pub fn decode(
    initial: &StateVector,
    transitions: &StateMatrix,
    emissions: &EmissionModel,
    observations: &[FeatureVector],
) -> ModelResult<Decoding> {
    const K: usize = Activity::COUNT;

    let t_len = observations.len();
    if t_len == 0 {
        return Ok(Decoding {
            states: Vec::new(),
            log_likelihood: 0.0,
        });
    }

    let mut log_a = [[0.0; K]; K];
    for i in 0..K {
        for j in 0..K {
            log_a[i][j] = safe_ln(transitions[i][j]);
        }
    }

    let mut prev = [0.0; K];
    for (i, slot) in prev.iter_mut().enumerate() {
        *slot = safe_ln(initial[i])
            + emissions.log_likelihood(Activity::ALL[i], &observations[0]);
    }

    let mut backpointers: Vec<[u8; K]> = Vec::with_capacity(t_len);
    backpointers.push([0; K]);

    for obs in observations.iter().skip(1) {
        let mut curr = [f64::NEG_INFINITY; K];
        let mut from = [0u8; K];
        for j in 0..K {
            // Scan sources in index order; strict > keeps the lowest
            // index on ties.
            let mut best = prev[0] + log_a[0][j];
            let mut best_i = 0u8;
            for i in 1..K {
                let score = prev[i] + log_a[i][j];
                if score > best {
                    best = score;
                    best_i = i as u8;
                }
            }
            curr[j] = best + emissions.log_likelihood(Activity::ALL[j], obs);
            from[j] = best_i;
        }
        backpointers.push(from);
        prev = curr;
    }

    let mut last = 0usize;
    for i in 1..K {
        if prev[i] > prev[last] {
            last = i;
        }
    }
    let log_likelihood = prev[last];

    let mut indices = alloc::vec![0u8; t_len];
    indices[t_len - 1] = last as u8;
    for t in (1..t_len).rev() {
        indices[t - 1] = backpointers[t][indices[t] as usize];
    }

    let states = indices
        .iter()
        .map(|&i| Activity::ALL[i as usize])
        .collect();

    Ok(Decoding {
        states,
        log_likelihood,
    })
}
