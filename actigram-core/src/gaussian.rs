//! Per-State Multivariate Gaussian Emission Model
//!
//! ## Overview
//!
//! Each hidden activity gets one multivariate Gaussian over feature
//! vectors: the mean is the arithmetic mean of the windows assigned to
//! that activity, the covariance is the unbiased (n-1) sample covariance.
//! Decoding only ever consumes log-densities, so the density is evaluated
//! entirely in log space against the cached Cholesky factor:
//!
//! ```text
//! ln p(x | state) = -0.5 * (D ln(2π) + ln|Σ| + (x-μ)ᵀ Σ⁻¹ (x-μ))
//! ```
//!
//! with `ln|Σ|` read off the factor diagonal and the quadratic form done
//! by forward substitution. No matrix is inverted and no raw density is
//! ever exponentiated, so well-separated states cannot underflow to a
//! zero probability.
//!
//! ## Degenerate fits
//!
//! A state trained on fewer windows than `D + 1` (or on constant ones)
//! yields a singular covariance. The fit still succeeds: a jitter of
//! `ε × mean diagonal variance` is added to the diagonal, escalating
//! tenfold until the factorization goes through. The result is flagged
//! via [`GaussianParams::regularized`] and logged as a degraded fit. Only
//! a state with *zero* assigned windows is a hard error; there is nothing
//! to estimate from.

extern crate alloc;

use alloc::vec;
use alloc::vec::Vec;

use crate::{
    activity::Activity,
    errors::{ModelError, ModelResult},
    features::FeatureVector,
    linalg::{CholeskyFactor, SquareMatrix},
};

/// ln(2π), the multivariate Gaussian normalization constant
const LN_TAU: f64 = 1.837_877_066_409_345_5;

/// Tenfold jitter escalations tried before giving up on a covariance
const MAX_REGULARIZATION_ATTEMPTS: usize = 8;

/// One state's fitted Gaussian: moments plus the cached factorization
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianParams {
    mean: Vec<f64>,
    covariance: SquareMatrix,
    factor: CholeskyFactor,
    log_det: f64,
    norm: f64,
    regularized: bool,
}

impl GaussianParams {
    /// Fit mean and unbiased covariance from a state's feature vectors
    ///
    /// `regularization` is the base jitter scale ε applied when the
    /// sample covariance is singular. A single vector fits to a zero
    /// covariance and comes back regularized to a scaled identity.
    pub fn fit(
        state: Activity,
        vectors: &[FeatureVector],
        regularization: f64,
    ) -> ModelResult<Self> {
        let n = vectors.len();
        if n == 0 {
            return Err(ModelError::InsufficientTrainingData {
                state,
                required: 1,
                available: 0,
            });
        }
        let dim = vectors[0].len();
        for v in vectors {
            if v.len() != dim {
                return Err(ModelError::SchemaMismatch {
                    expected: dim,
                    actual: v.len(),
                });
            }
        }

        let mut mean = vec![0.0; dim];
        for v in vectors {
            for (acc, x) in mean.iter_mut().zip(v.iter()) {
                *acc += x;
            }
        }
        for acc in &mut mean {
            *acc /= n as f64;
        }

        // n == 1 leaves the covariance all zero; regularization below
        // turns it into a scaled identity.
        let mut covariance = SquareMatrix::zeros(dim);
        if n >= 2 {
            for v in vectors {
                for i in 0..dim {
                    let di = v[i] - mean[i];
                    for j in i..dim {
                        covariance.add_assign(i, j, di * (v[j] - mean[j]));
                    }
                }
            }
            let denom = (n - 1) as f64;
            for i in 0..dim {
                for j in i..dim {
                    let value = covariance.get(i, j) / denom;
                    covariance.set(i, j, value);
                    covariance.set(j, i, value);
                }
            }
        }

        let params = Self::from_moments(mean, covariance, regularization)?;
        if params.regularized {
            log_warn!(
                "degraded emission fit for {}: covariance regularized \
                 ({} windows, full-rank floor {})",
                state,
                n,
                crate::constants::full_rank_sample_floor(dim)
            );
        }
        Ok(params)
    }

    /// Build from explicit moments, factoring (and if needed
    /// regularizing) the covariance
    ///
    /// This is the re-validation path for parameters loaded from storage:
    /// whatever claims to be a covariance must factor here before it can
    /// be decoded against.
    pub fn from_moments(
        mean: Vec<f64>,
        covariance: SquareMatrix,
        regularization: f64,
    ) -> ModelResult<Self> {
        let dim = mean.len();
        if dim == 0 {
            return Err(ModelError::InvalidConfig {
                reason: "gaussian dimension is zero",
            });
        }
        if covariance.dim() != dim {
            return Err(ModelError::SchemaMismatch {
                expected: dim,
                actual: covariance.dim(),
            });
        }
        if !(regularization > 0.0) || !regularization.is_finite() {
            return Err(ModelError::InvalidConfig {
                reason: "regularization must be positive and finite",
            });
        }

        let mut working = covariance;
        working.symmetrize();

        let mut regularized = false;
        let mut factor = working.cholesky();
        if factor.is_none() {
            regularized = true;
            let diag = working.diagonal_mean();
            let scale = if diag > 0.0 && diag.is_finite() { diag } else { 1.0 };
            let mut jitter = regularization * scale;
            for _ in 0..MAX_REGULARIZATION_ATTEMPTS {
                working.add_diagonal(jitter);
                factor = working.cholesky();
                if factor.is_some() {
                    break;
                }
                jitter *= 10.0;
            }
        }
        let factor = factor.ok_or(ModelError::NumericalInstability {
            reason: "covariance not positive definite after regularization",
        })?;

        let log_det = factor.log_det();
        let norm = -0.5 * (dim as f64 * LN_TAU + log_det);
        Ok(Self {
            mean,
            covariance: working,
            factor,
            log_det,
            norm,
            regularized,
        })
    }

    /// Log-density of one feature vector under this Gaussian
    ///
    /// Total over its domain: a dimension mismatch or any non-finite
    /// component evaluates to negative infinity, which flows through the
    /// decoder's max comparisons without producing NaN.
    pub fn log_likelihood(&self, x: &[f64]) -> f64 {
        if x.len() != self.mean.len() {
            return f64::NEG_INFINITY;
        }
        if x.iter().any(|v| !v.is_finite()) {
            return f64::NEG_INFINITY;
        }

        let diff: Vec<f64> = x.iter().zip(self.mean.iter()).map(|(a, m)| a - m).collect();
        let quad = self.factor.quadratic_form(&diff);
        if !quad.is_finite() {
            return f64::NEG_INFINITY;
        }
        self.norm - 0.5 * quad
    }

    /// Feature dimensionality
    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    /// Fitted mean vector
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// Effective covariance, including any regularization applied
    pub fn covariance(&self) -> &SquareMatrix {
        &self.covariance
    }

    /// Cached log-determinant of the effective covariance
    pub fn log_det(&self) -> f64 {
        self.log_det
    }

    /// True when the covariance needed diagonal jitter to factor
    pub fn regularized(&self) -> bool {
        self.regularized
    }
}

/// The full emission model: one Gaussian per activity, in index order
#[derive(Debug, Clone, PartialEq)]
pub struct EmissionModel {
    states: Vec<GaussianParams>,
    dim: usize,
}

impl EmissionModel {
    /// Fit every state's Gaussian from feature vectors grouped by state
    ///
    /// `by_state[i]` holds the vectors assigned to `Activity::from_index(i)`.
    /// Every state needs at least one vector, and all vectors must share
    /// one dimensionality.
    pub fn fit(
        by_state: &[Vec<FeatureVector>; Activity::COUNT],
        regularization: f64,
    ) -> ModelResult<Self> {
        let mut states = Vec::with_capacity(Activity::COUNT);
        for activity in Activity::ALL {
            states.push(GaussianParams::fit(
                activity,
                &by_state[activity.index()],
                regularization,
            )?);
        }
        Self::from_states(states)
    }

    /// Assemble from per-state Gaussians, one per activity in index order
    pub fn from_states(states: Vec<GaussianParams>) -> ModelResult<Self> {
        if states.len() != Activity::COUNT {
            return Err(ModelError::InvalidConfig {
                reason: "emission model needs one gaussian per activity",
            });
        }
        let dim = states[0].dim();
        for params in &states {
            if params.dim() != dim {
                return Err(ModelError::SchemaMismatch {
                    expected: dim,
                    actual: params.dim(),
                });
            }
        }
        Ok(Self { states, dim })
    }

    /// Log-density of a feature vector under one state
    #[inline]
    pub fn log_likelihood(&self, state: Activity, x: &[f64]) -> f64 {
        self.states[state.index()].log_likelihood(x)
    }

    /// Fitted parameters of one state
    pub fn params(&self, state: Activity) -> &GaussianParams {
        &self.states[state.index()]
    }

    /// Per-state parameters in activity index order
    pub fn states(&self) -> &[GaussianParams] {
        &self.states
    }

    /// Feature dimensionality shared by all states
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// True when any state's fit needed regularization
    pub fn any_regularized(&self) -> bool {
        self.states.iter().any(|s| s.regularized())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    fn univariate(mean: f64, var: f64) -> GaussianParams {
        GaussianParams::from_moments(
            vec![mean],
            SquareMatrix::from_row_major(1, &[var]).unwrap(),
            1e-6,
        )
        .unwrap()
    }

    #[test]
    fn fit_recovers_sample_moments() {
        let vectors = vec![vec![1.0], vec![2.0], vec![3.0], vec![4.0]];
        let g = GaussianParams::fit(Activity::Walking, &vectors, 1e-6).unwrap();
        assert!((g.mean()[0] - 2.5).abs() < TOL);
        // Unbiased variance of 1..4 is 5/3.
        assert!((g.covariance().get(0, 0) - 5.0 / 3.0).abs() < TOL);
        assert!(!g.regularized());
    }

    #[test]
    fn standard_normal_log_density() {
        let g = univariate(0.0, 1.0);
        // ln N(0; 0, 1) = -0.5 ln(2π)
        assert!((g.log_likelihood(&[0.0]) + 0.918_938_533_204_672_7).abs() < TOL);
        assert!((g.log_likelihood(&[1.0]) + 1.418_938_533_204_672_7).abs() < TOL);
    }

    #[test]
    fn likelihood_peaks_at_mean() {
        let g = univariate(3.0, 2.0);
        let at_mean = g.log_likelihood(&[3.0]);
        assert!(at_mean > g.log_likelihood(&[2.0]));
        assert!(at_mean > g.log_likelihood(&[4.5]));
    }

    #[test]
    fn independent_axes_factorize() {
        let joint = GaussianParams::from_moments(
            vec![0.0, 0.0],
            SquareMatrix::from_row_major(2, &[1.0, 0.0, 0.0, 4.0]).unwrap(),
            1e-6,
        )
        .unwrap();
        let x = [0.7, -1.3];
        let expected = univariate(0.0, 1.0).log_likelihood(&[x[0]])
            + univariate(0.0, 4.0).log_likelihood(&[x[1]]);
        assert!((joint.log_likelihood(&x) - expected).abs() < 1e-10);
    }

    #[test]
    fn empty_state_is_an_error() {
        let err = GaussianParams::fit(Activity::Still, &[], 1e-6).unwrap_err();
        assert_eq!(
            err,
            ModelError::InsufficientTrainingData {
                state: Activity::Still,
                required: 1,
                available: 0,
            }
        );
    }

    #[test]
    fn single_vector_fit_is_regularized() {
        let g = GaussianParams::fit(Activity::Standing, &[vec![1.0, 2.0]], 1e-6).unwrap();
        assert!(g.regularized());
        // Zero diagonal falls back to unit jitter scale.
        assert!((g.covariance().get(0, 0) - 1e-6).abs() < TOL);
        assert!(g.log_likelihood(&[1.0, 2.0]).is_finite());
    }

    #[test]
    fn collinear_vectors_are_regularized() {
        // Second component is exactly twice the first: rank-1 covariance.
        let vectors = vec![vec![1.0, 2.0], vec![2.0, 4.0], vec![3.0, 6.0]];
        let g = GaussianParams::fit(Activity::Jumping, &vectors, 1e-6).unwrap();
        assert!(g.regularized());
        assert!(g.log_likelihood(&[2.0, 4.0]).is_finite());
    }

    #[test]
    fn non_finite_observation_never_nan() {
        let g = univariate(0.0, 1.0);
        assert_eq!(g.log_likelihood(&[f64::NAN]), f64::NEG_INFINITY);
        assert_eq!(g.log_likelihood(&[f64::INFINITY]), f64::NEG_INFINITY);
        assert_eq!(g.log_likelihood(&[0.0, 1.0]), f64::NEG_INFINITY);
    }

    #[test]
    fn mixed_dimensions_rejected() {
        let vectors = vec![vec![1.0, 2.0], vec![3.0]];
        assert_eq!(
            GaussianParams::fit(Activity::Walking, &vectors, 1e-6).unwrap_err(),
            ModelError::SchemaMismatch { expected: 2, actual: 1 }
        );
    }

    #[test]
    fn indefinite_covariance_regularized_eventually() {
        let g = GaussianParams::from_moments(
            vec![0.0, 0.0],
            SquareMatrix::from_row_major(2, &[1.0, 2.0, 2.0, 1.0]).unwrap(),
            1e-6,
        )
        .unwrap();
        assert!(g.regularized());
    }

    #[test]
    fn hopeless_covariance_fails() {
        let err = GaussianParams::from_moments(
            vec![0.0, 0.0],
            SquareMatrix::from_row_major(2, &[1.0, 1e12, 1e12, 1.0]).unwrap(),
            1e-6,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ModelError::NumericalInstability {
                reason: "covariance not positive definite after regularization",
            }
        );
    }

    #[test]
    fn emission_model_routes_by_state() {
        let mut by_state: [Vec<FeatureVector>; Activity::COUNT] = Default::default();
        for (i, group) in by_state.iter_mut().enumerate() {
            let center = i as f64 * 10.0;
            group.push(vec![center - 0.5]);
            group.push(vec![center + 0.5]);
        }
        let model = EmissionModel::fit(&by_state, 1e-6).unwrap();
        assert_eq!(model.dim(), 1);

        for activity in Activity::ALL {
            let center = activity.index() as f64 * 10.0;
            let own = model.log_likelihood(activity, &[center]);
            for other in Activity::ALL {
                if other != activity {
                    assert!(own > model.log_likelihood(other, &[center]));
                }
            }
        }
    }

    #[test]
    fn emission_model_requires_every_state() {
        let mut by_state: [Vec<FeatureVector>; Activity::COUNT] = Default::default();
        by_state[0].push(vec![1.0]);
        by_state[1].push(vec![2.0]);
        by_state[2].push(vec![3.0]);
        // Still has no windows.
        let err = EmissionModel::fit(&by_state, 1e-6).unwrap_err();
        assert!(matches!(
            err,
            ModelError::InsufficientTrainingData { state: Activity::Still, .. }
        ));
    }

    #[test]
    fn emission_model_rejects_uneven_dims() {
        let a = GaussianParams::fit(Activity::Standing, &[vec![1.0], vec![2.0]], 1e-6).unwrap();
        let b = GaussianParams::fit(
            Activity::Walking,
            &[vec![1.0, 1.0], vec![2.0, 2.0]],
            1e-6,
        )
        .unwrap();
        let states = vec![a.clone(), b, a.clone(), a];
        assert!(matches!(
            EmissionModel::from_states(states),
            Err(ModelError::SchemaMismatch { .. })
        ));
    }
}
