//! Transition-Matrix and Initial-Distribution Estimation
//!
//! ## Overview
//!
//! The transition matrix is estimated by counting label transitions in
//! the training window sequences and normalizing each source row:
//!
//! ```text
//! A[i][j] = count(i → j) / count(i → *)
//! ```
//!
//! Counting never crosses a sequence boundary: the last window of one
//! recording and the first of the next are not adjacent in time. Because
//! activities persist across many two-second windows, self-transitions
//! dominate the fitted rows. No smoothing is applied beyond the unseen-row
//! fallback; the counts speak for themselves.
//!
//! ## Policies
//!
//! Two estimation choices are explicit configuration rather than baked-in
//! behavior:
//!
//! - [`UnseenStatePolicy`]: what to do with a state that never appears as
//!   a transition source. A zero row would make the state permanently
//!   unreachable mid-sequence, so the default substitutes a uniform row;
//!   `Fail` turns the condition into a hard error instead.
//! - [`InitialEstimate`]: how to build the initial distribution. Start
//!   fractions need several sequences to mean anything; a single training
//!   sequence degrades to label frequencies rather than a one-hot vector.

use crate::{
    activity::Activity,
    constants::ROW_SUM_TOLERANCE,
    errors::{ModelError, ModelResult},
};

/// Probability vector over all activities, in index order
pub type StateVector = [f64; Activity::COUNT];

/// Row-stochastic transition matrix; `[i][j]` is P(next = j | current = i)
pub type StateMatrix = [[f64; Activity::COUNT]; Activity::COUNT];

/// Fallback for states never observed as a transition source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnseenStatePolicy {
    /// Substitute a uniform row, keeping the state reachable
    #[default]
    UniformRow,
    /// Treat an unseen source state as a training error
    Fail,
}

/// How the initial state distribution is estimated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitialEstimate {
    /// Fraction of training sequences starting in each state; degrades
    /// to `StateFrequency` when only one sequence is available
    #[default]
    StartFractions,
    /// Overall label frequency across all training windows
    StateFrequency,
    /// Uniform 1/K prior
    Uniform,
}

/// Fitted initial distribution and transition matrix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionEstimate {
    /// Initial state distribution
    pub initial: StateVector,
    /// Row-stochastic transition matrix
    pub matrix: StateMatrix,
}

/// Estimate transitions and the initial distribution from label sequences
///
/// Each element of `sequences` is the window-label sequence of one
/// recording. Empty sequences contribute nothing; if every sequence is
/// empty the estimate is an error.
pub fn fit(
    sequences: &[&[Activity]],
    unseen: UnseenStatePolicy,
    initial: InitialEstimate,
) -> ModelResult<TransitionEstimate> {
    const K: usize = Activity::COUNT;

    let mut counts = [[0u32; K]; K];
    let mut firsts = [0u32; K];
    let mut totals = [0u32; K];
    let mut observed = false;

    for seq in sequences {
        if seq.is_empty() {
            continue;
        }
        observed = true;
        firsts[seq[0].index()] += 1;
        for label in seq.iter() {
            totals[label.index()] += 1;
        }
        for pair in seq.windows(2) {
            counts[pair[0].index()][pair[1].index()] += 1;
        }
    }
    if !observed {
        return Err(ModelError::EmptySequence);
    }

    let mut matrix = [[0.0; K]; K];
    for (i, row) in matrix.iter_mut().enumerate() {
        let out: u32 = counts[i].iter().sum();
        if out == 0 {
            match unseen {
                UnseenStatePolicy::UniformRow => {
                    log_warn!(
                        "state {} never observed as a transition source; using uniform row",
                        Activity::ALL[i]
                    );
                    *row = [1.0 / K as f64; K];
                }
                UnseenStatePolicy::Fail => {
                    return Err(ModelError::UnreachableState { state: Activity::ALL[i] });
                }
            }
        } else {
            for j in 0..K {
                row[j] = counts[i][j] as f64 / out as f64;
            }
        }
    }

    let initial = match initial {
        InitialEstimate::Uniform => [1.0 / K as f64; K],
        InitialEstimate::StateFrequency => normalize(&totals),
        InitialEstimate::StartFractions => {
            let n_sequences: u32 = firsts.iter().sum();
            if n_sequences <= 1 {
                log_warn!(
                    "single training sequence; using label frequencies for the initial distribution"
                );
                normalize(&totals)
            } else {
                normalize(&firsts)
            }
        }
    };

    Ok(TransitionEstimate { initial, matrix })
}

fn normalize(counts: &[u32; Activity::COUNT]) -> StateVector {
    let total: u32 = counts.iter().sum();
    let mut p = [0.0; Activity::COUNT];
    // Callers guarantee at least one observed label.
    for (slot, count) in p.iter_mut().zip(counts.iter()) {
        *slot = *count as f64 / total as f64;
    }
    p
}

/// Verify every matrix row is a probability vector
pub fn ensure_row_stochastic(matrix: &StateMatrix) -> ModelResult<()> {
    for (i, row) in matrix.iter().enumerate() {
        if !is_distribution(row) {
            return Err(ModelError::NotRowStochastic { row: i });
        }
    }
    Ok(())
}

/// Verify the initial vector is a probability distribution
pub fn ensure_distribution(p: &StateVector) -> ModelResult<()> {
    if is_distribution(p) {
        Ok(())
    } else {
        Err(ModelError::InvalidInitialDistribution)
    }
}

fn is_distribution(p: &[f64]) -> bool {
    let mut sum = 0.0;
    for &value in p {
        if !value.is_finite() || value < 0.0 || value > 1.0 {
            return false;
        }
        sum += value;
    }
    libm::fabs(sum - 1.0) <= ROW_SUM_TOLERANCE
}
