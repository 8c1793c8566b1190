use convexmpc_types::{Result, SolveStatus};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::qp_spec::QpSpec;

/// Solution from QP solver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QpSolution {
    /// Minimiser `z*`; empty unless `status` is `Optimal`
    pub x: Vec<f64>,
    pub status: SolveStatus,
    /// Objective at `x` (NaN when not optimal)
    pub objective: f64,
    pub iterations: usize,
}

impl QpSolution {
    /// A solution without a usable vector
    pub fn failed(status: SolveStatus, iterations: usize) -> Self {
        QpSolution {
            x: Vec::new(),
            status,
            objective: f64::NAN,
            iterations,
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolveStatus::Optimal
    }

    pub fn to_vector(&self) -> DVector<f64> {
        DVector::from_column_slice(&self.x)
    }
}

/// Trait for QP solver backends
pub trait SolverBackend: Send + Sync {
    /// Solve a QP problem: minimize 0.5 * z^T H z + g^T z
    /// subject to G z <= h and A_eq z = b_eq
    fn solve_qp(&self, spec: &QpSpec) -> Result<QpSolution>;
}
