use nalgebra::{DMatrix, DVector};

use crate::error::{MpcError, Result};

/// Discrete-time linear state-space model `x[t+1] = A x[t] + B u[t]`
#[derive(Debug, Clone, PartialEq)]
pub struct LinearSystem {
    a: DMatrix<f64>,
    b: DMatrix<f64>,
}

impl LinearSystem {
    /// Create a system, checking that A is square, B shares its row count and
    /// every entry is finite
    pub fn new(a: DMatrix<f64>, b: DMatrix<f64>) -> Result<Self> {
        if !a.is_square() {
            return Err(MpcError::DimensionMismatch(format!(
                "A must be square, got {}x{}",
                a.nrows(),
                a.ncols()
            )));
        }

        if a.nrows() == 0 || b.ncols() == 0 {
            return Err(MpcError::DimensionMismatch(
                "system needs at least one state and one input".to_string(),
            ));
        }

        if b.nrows() != a.nrows() {
            return Err(MpcError::DimensionMismatch(format!(
                "B must have {} rows to match A, got {}",
                a.nrows(),
                b.nrows()
            )));
        }

        if a.iter().chain(b.iter()).any(|v| !v.is_finite()) {
            return Err(MpcError::NonFinite(
                "A and B must contain only finite entries".to_string(),
            ));
        }

        Ok(LinearSystem { a, b })
    }

    /// State transition matrix A
    pub fn a(&self) -> &DMatrix<f64> {
        &self.a
    }

    /// Input matrix B
    pub fn b(&self) -> &DMatrix<f64> {
        &self.b
    }

    /// State dimension
    pub fn nx(&self) -> usize {
        self.a.nrows()
    }

    /// Input dimension
    pub fn nu(&self) -> usize {
        self.b.ncols()
    }

    /// One step of the dynamics: `A x + B u`
    pub fn propagate(&self, x: &DVector<f64>, u: &DVector<f64>) -> DVector<f64> {
        &self.a * x + &self.b * u
    }
}
