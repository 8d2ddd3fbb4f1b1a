//! Dense Symmetric Matrix Support for Gaussian Emissions
//!
//! Covariance matrices are square, symmetric, and sized by the feature
//! schema at runtime, so storage is a row-major `Vec<f64>` rather than a
//! const-generic array. Everything a Gaussian needs from its covariance
//! goes through the Cholesky factor: the log-determinant falls out of the
//! factor diagonal and quadratic forms reduce to one forward substitution,
//! so the matrix is never inverted explicitly.
//!
//! ```text
//! Σ = L Lᵀ          (L lower triangular, positive diagonal)
//! ln|Σ| = 2 Σᵢ ln L[i][i]
//! (x-μ)ᵀ Σ⁻¹ (x-μ) = ‖y‖²  where  L y = (x-μ)
//! ```
//!
//! Factorization fails (returns `None`) when the matrix is not positive
//! definite or contains non-finite entries; callers regularize and retry.

extern crate alloc;

use alloc::vec;
use alloc::vec::Vec;

/// Square matrix with runtime dimension, row-major storage
#[derive(Debug, Clone, PartialEq)]
pub struct SquareMatrix {
    dim: usize,
    data: Vec<f64>,
}

impl SquareMatrix {
    /// All-zero matrix of the given dimension
    pub fn zeros(dim: usize) -> Self {
        Self {
            dim,
            data: vec![0.0; dim * dim],
        }
    }

    /// Identity matrix of the given dimension
    pub fn identity(dim: usize) -> Self {
        let mut m = Self::zeros(dim);
        for i in 0..dim {
            m.set(i, i, 1.0);
        }
        m
    }

    /// Build from a row-major slice; `data.len()` must equal `dim * dim`
    pub fn from_row_major(dim: usize, data: &[f64]) -> Option<Self> {
        if data.len() != dim * dim {
            return None;
        }
        Some(Self {
            dim,
            data: data.to_vec(),
        })
    }

    /// Matrix dimension
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Row-major backing slice
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Element at (row, col)
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.dim + col]
    }

    /// Set element at (row, col)
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.dim + col] = value;
    }

    /// Add to element at (row, col)
    #[inline]
    pub fn add_assign(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.dim + col] += value;
    }

    /// Force exact symmetry by averaging mirrored elements
    ///
    /// Accumulated rounding can leave `a[i][j]` and `a[j][i]` a few ulps
    /// apart, which the factorization would bake in asymmetrically.
    pub fn symmetrize(&mut self) {
        for i in 0..self.dim {
            for j in (i + 1)..self.dim {
                let avg = 0.5 * (self.get(i, j) + self.get(j, i));
                self.set(i, j, avg);
                self.set(j, i, avg);
            }
        }
    }

    /// Add a constant to every diagonal element
    pub fn add_diagonal(&mut self, value: f64) {
        for i in 0..self.dim {
            self.add_assign(i, i, value);
        }
    }

    /// Mean of the diagonal elements, 0.0 for an empty matrix
    pub fn diagonal_mean(&self) -> f64 {
        if self.dim == 0 {
            return 0.0;
        }
        let mut sum = 0.0;
        for i in 0..self.dim {
            sum += self.get(i, i);
        }
        sum / self.dim as f64
    }

    /// Cholesky factorization `Σ = L Lᵀ`
    ///
    /// Returns `None` when the matrix is not positive definite, including
    /// any non-finite intermediate. The input is read as symmetric; only
    /// the lower triangle is consulted.
    pub fn cholesky(&self) -> Option<CholeskyFactor> {
        let n = self.dim;
        let mut l = vec![0.0; n * n];

        for i in 0..n {
            for j in 0..=i {
                let mut sum = self.get(i, j);
                for k in 0..j {
                    sum -= l[i * n + k] * l[j * n + k];
                }

                if i == j {
                    if !(sum > 0.0) || !sum.is_finite() {
                        return None;
                    }
                    l[i * n + j] = libm::sqrt(sum);
                } else {
                    l[i * n + j] = sum / l[j * n + j];
                    if !l[i * n + j].is_finite() {
                        return None;
                    }
                }
            }
        }

        Some(CholeskyFactor { dim: n, data: l })
    }
}

/// Lower-triangular Cholesky factor of a positive definite matrix
#[derive(Debug, Clone, PartialEq)]
pub struct CholeskyFactor {
    dim: usize,
    data: Vec<f64>,
}

impl CholeskyFactor {
    /// Factor dimension
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Element at (row, col); zero above the diagonal
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.dim + col]
    }

    /// Log-determinant of the factored matrix: `2 Σ ln L[i][i]`
    ///
    /// The factor diagonal is strictly positive by construction, so each
    /// logarithm is finite.
    pub fn log_det(&self) -> f64 {
        let mut sum = 0.0;
        for i in 0..self.dim {
            sum += libm::log(self.get(i, i));
        }
        2.0 * sum
    }

    /// Solve `L y = b` by forward substitution
    pub fn solve_lower(&self, b: &[f64]) -> Vec<f64> {
        debug_assert_eq!(b.len(), self.dim);
        let mut y = vec![0.0; self.dim];
        for i in 0..self.dim {
            let mut sum = b[i];
            for k in 0..i {
                sum -= self.get(i, k) * y[k];
            }
            y[i] = sum / self.get(i, i);
        }
        y
    }

    /// Quadratic form `bᵀ Σ⁻¹ b` of the factored matrix
    pub fn quadratic_form(&self, b: &[f64]) -> f64 {
        let y = self.solve_lower(b);
        y.iter().map(|v| v * v).sum()
    }
}
