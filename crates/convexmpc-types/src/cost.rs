use nalgebra::DMatrix;

use crate::error::{MpcError, Result};
use crate::matrix_utils::{validate_pd, validate_psd};

/// Tolerance for symmetry and definiteness checks on cost weights
pub const COST_TOLERANCE: f64 = 1e-9;

/// Quadratic stage and terminal weights
///
/// Stage cost is `0.5 xᵀQx + 0.5 uᵀRu`, terminal cost `0.5 x_Nᵀ P x_N`.
#[derive(Debug, Clone, PartialEq)]
pub struct CostWeights {
    q: DMatrix<f64>,
    r: DMatrix<f64>,
    p: DMatrix<f64>,
}

impl CostWeights {
    /// Create cost weights. Q and P must be symmetric PSD, R symmetric PD.
    pub fn new(q: DMatrix<f64>, r: DMatrix<f64>, p: DMatrix<f64>) -> Result<Self> {
        for (name, m) in [("Q", &q), ("R", &r), ("P", &p)] {
            if !m.is_square() {
                return Err(MpcError::DimensionMismatch(format!(
                    "{} must be square, got {}x{}",
                    name,
                    m.nrows(),
                    m.ncols()
                )));
            }
        }

        if q.shape() != p.shape() {
            return Err(MpcError::DimensionMismatch(format!(
                "Q and P must share a shape, got {}x{} and {}x{}",
                q.nrows(),
                q.ncols(),
                p.nrows(),
                p.ncols()
            )));
        }

        if !validate_psd(&q, COST_TOLERANCE) {
            return Err(MpcError::IllPosedCost(
                "Q must be symmetric positive semi-definite".to_string(),
            ));
        }

        if !validate_psd(&p, COST_TOLERANCE) {
            return Err(MpcError::IllPosedCost(
                "P must be symmetric positive semi-definite".to_string(),
            ));
        }

        if !validate_pd(&r, COST_TOLERANCE) {
            return Err(MpcError::IllPosedCost(
                "R must be symmetric positive definite".to_string(),
            ));
        }

        Ok(CostWeights { q, r, p })
    }

    /// Identity weights for a system with `nx` states and `nu` inputs
    pub fn identity(nx: usize, nu: usize) -> Self {
        CostWeights {
            q: DMatrix::identity(nx, nx),
            r: DMatrix::identity(nu, nu),
            p: DMatrix::identity(nx, nx),
        }
    }

    /// Stage state weight Q
    pub fn q(&self) -> &DMatrix<f64> {
        &self.q
    }

    /// Stage input weight R
    pub fn r(&self) -> &DMatrix<f64> {
        &self.r
    }

    /// Terminal state weight P
    pub fn p(&self) -> &DMatrix<f64> {
        &self.p
    }
}
