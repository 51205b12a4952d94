//! Eigenvalue diagnostics for covariance matrices
//!
//! The optimizer has no guarantees on a singular or near-singular
//! covariance matrix (fewer observations than assets, collinear assets).
//! These helpers quantify how degenerate a matrix is so callers can warn
//! before solving.

use super::CovarianceError;
use ndarray::{Array1, Array2};

/// Eigenvalues at or below this magnitude count as zero
const ZERO_EIGENVALUE: f64 = 1e-14;

/// Maximum number of full Jacobi sweeps
const MAX_SWEEPS: usize = 64;

/// Result of eigenvalue decomposition
#[derive(Debug, Clone)]
pub struct EigenDecomposition {
    /// Eigenvalues (sorted in descending order)
    pub eigenvalues: Array1<f64>,
    /// Eigenvectors (columns are eigenvectors)
    pub eigenvectors: Array2<f64>,
}

/// Summary of how well-conditioned a covariance matrix is
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CovarianceDiagnostics {
    /// Largest eigenvalue
    pub max_eigenvalue: f64,
    /// Smallest eigenvalue
    pub min_eigenvalue: f64,
    /// Ratio of largest to smallest eigenvalue (infinite when singular)
    pub condition_number: f64,
    /// Number of eigenvalues indistinguishable from zero
    pub null_dimensions: usize,
    /// No eigenvalue is negative beyond rounding
    pub positive_semidefinite: bool,
}

impl CovarianceDiagnostics {
    /// Compute diagnostics for a symmetric matrix
    pub fn compute(cov: &Array2<f64>) -> Result<Self, CovarianceError> {
        let decomp = jacobi_eigendecomp(cov, 1e-15)?;
        let n = decomp.eigenvalues.len();
        let max_eigenvalue = decomp.eigenvalues.first().copied().unwrap_or(0.0);
        let min_eigenvalue = decomp.eigenvalues.last().copied().unwrap_or(0.0);
        let scale = max_eigenvalue.abs().max(1.0);
        let null_dimensions = decomp
            .eigenvalues
            .iter()
            .filter(|v| v.abs() <= ZERO_EIGENVALUE * scale)
            .count();

        Ok(Self {
            max_eigenvalue,
            min_eigenvalue,
            condition_number: ratio(max_eigenvalue, min_eigenvalue, n),
            null_dimensions,
            positive_semidefinite: is_positive_semidefinite(&decomp.eigenvalues),
        })
    }

    /// Whether the matrix is singular, indefinite or too ill-conditioned to
    /// trust
    pub fn is_degenerate(&self) -> bool {
        !self.positive_semidefinite || self.null_dimensions > 0 || self.condition_number > 1e12
    }
}

fn ratio(max: f64, min: f64, n: usize) -> f64 {
    if n == 0 {
        return 1.0;
    }
    if min.abs() <= ZERO_EIGENVALUE * max.abs().max(1.0) {
        f64::INFINITY
    } else {
        max / min
    }
}

/// Whether every eigenvalue is non-negative
///
/// Small negative eigenvalues from rounding are tolerated relative to the
/// largest eigenvalue.
fn is_positive_semidefinite(eigenvalues: &Array1<f64>) -> bool {
    let scale = eigenvalues
        .iter()
        .fold(0.0_f64, |acc, v| acc.max(v.abs()))
        .max(1.0);
    eigenvalues.iter().all(|&v| v >= -1e-12 * scale)
}

/// Cyclic Jacobi eigenvalue decomposition for symmetric matrices
///
/// Sweeps every off-diagonal pair, annihilating each with a plane rotation,
/// until the off-diagonal Frobenius norm falls below `tolerance` relative to
/// the matrix norm.
///
/// # Arguments
/// * `matrix` - Symmetric matrix to decompose
/// * `tolerance` - Relative convergence tolerance for off-diagonal mass
pub fn jacobi_eigendecomp(
    matrix: &Array2<f64>,
    tolerance: f64,
) -> Result<EigenDecomposition, CovarianceError> {
    let n = matrix.nrows();
    if n != matrix.ncols() {
        return Err(CovarianceError::DimensionMismatch {
            expected: n,
            actual: matrix.ncols(),
        });
    }

    let mut a = matrix.clone();
    let mut v = Array2::<f64>::eye(n);
    let norm = a.iter().map(|x| x * x).sum::<f64>().sqrt();

    for _sweep in 0..MAX_SWEEPS {
        if off_diagonal_norm(&a) <= tolerance * norm.max(f64::MIN_POSITIVE) {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                if a[[p, q]] != 0.0 {
                    rotate(&mut a, &mut v, p, q);
                }
            }
        }
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| a[[j, j]].total_cmp(&a[[i, i]]));

    let eigenvalues = order.iter().map(|&i| a[[i, i]]).collect();
    let mut eigenvectors = Array2::<f64>::zeros((n, n));
    for (col, &i) in order.iter().enumerate() {
        eigenvectors.column_mut(col).assign(&v.column(i));
    }

    Ok(EigenDecomposition {
        eigenvalues,
        eigenvectors,
    })
}

fn off_diagonal_norm(a: &Array2<f64>) -> f64 {
    let n = a.nrows();
    let mut sum = 0.0;
    for i in 0..n {
        for j in 0..n {
            if i != j {
                sum += a[[i, j]] * a[[i, j]];
            }
        }
    }
    sum.sqrt()
}

/// Zero `a[p, q]` with a Jacobi rotation, accumulating it into `v`
fn rotate(a: &mut Array2<f64>, v: &mut Array2<f64>, p: usize, q: usize) {
    let n = a.nrows();
    let apq = a[[p, q]];
    let theta = (a[[q, q]] - a[[p, p]]) / (2.0 * apq);
    let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
    let c = 1.0 / (t * t + 1.0).sqrt();
    let s = t * c;

    for k in 0..n {
        let akp = a[[k, p]];
        let akq = a[[k, q]];
        a[[k, p]] = c * akp - s * akq;
        a[[k, q]] = s * akp + c * akq;
    }
    for k in 0..n {
        let apk = a[[p, k]];
        let aqk = a[[q, k]];
        a[[p, k]] = c * apk - s * aqk;
        a[[q, k]] = s * apk + c * aqk;
    }
    for k in 0..n {
        let vkp = v[[k, p]];
        let vkq = v[[k, q]];
        v[[k, p]] = c * vkp - s * vkq;
        v[[k, q]] = s * vkp + c * vkq;
    }
}
