use convexmpc_types::{is_symmetric, min_eigenvalue, MpcError, Result};
use nalgebra::{DMatrix, DVector};

/// QP in standard form:
/// minimize 0.5 * z^T H z + g^T z
/// subject to G z <= h, A_eq z = b_eq
///
/// An absent constraint block is stored with zero rows.
#[derive(Debug, Clone, PartialEq)]
pub struct QpSpec {
    /// Hessian H (symmetric)
    pub hessian: DMatrix<f64>,
    /// Linear term g
    pub gradient: DVector<f64>,
    /// Inequality matrix G
    pub ineq_matrix: DMatrix<f64>,
    /// Inequality right-hand side h
    pub ineq_rhs: DVector<f64>,
    /// Equality matrix A_eq
    pub eq_matrix: DMatrix<f64>,
    /// Equality right-hand side b_eq
    pub eq_rhs: DVector<f64>,
}

impl QpSpec {
    /// Create an unconstrained QP
    pub fn new(hessian: DMatrix<f64>, gradient: DVector<f64>) -> Self {
        let n = gradient.len();
        QpSpec {
            hessian,
            gradient,
            ineq_matrix: DMatrix::zeros(0, n),
            ineq_rhs: DVector::zeros(0),
            eq_matrix: DMatrix::zeros(0, n),
            eq_rhs: DVector::zeros(0),
        }
    }

    /// Replace the inequality block `G z <= h`
    pub fn with_inequalities(mut self, g: DMatrix<f64>, h: DVector<f64>) -> Self {
        self.ineq_matrix = g;
        self.ineq_rhs = h;
        self
    }

    /// Replace the equality block `A_eq z = b_eq`
    pub fn with_equalities(mut self, a_eq: DMatrix<f64>, b_eq: DVector<f64>) -> Self {
        self.eq_matrix = a_eq;
        self.eq_rhs = b_eq;
        self
    }

    /// Get number of variables
    pub fn num_vars(&self) -> usize {
        self.gradient.len()
    }

    pub fn num_inequalities(&self) -> usize {
        self.ineq_rhs.len()
    }

    pub fn num_equalities(&self) -> usize {
        self.eq_rhs.len()
    }

    pub fn has_inequalities(&self) -> bool {
        self.num_inequalities() > 0
    }

    pub fn has_equalities(&self) -> bool {
        self.num_equalities() > 0
    }

    /// Validate model dimensions and entries
    pub fn validate(&self) -> Result<()> {
        let n = self.num_vars();
        let m_in = self.num_inequalities();
        let m_eq = self.num_equalities();

        if self.hessian.nrows() != n || self.hessian.ncols() != n {
            return Err(MpcError::DimensionMismatch(format!(
                "H must be {}x{}, got {}x{}",
                n,
                n,
                self.hessian.nrows(),
                self.hessian.ncols()
            )));
        }

        if self.ineq_matrix.nrows() != m_in || self.ineq_matrix.ncols() != n {
            return Err(MpcError::DimensionMismatch(format!(
                "G must be {}x{}, got {}x{}",
                m_in,
                n,
                self.ineq_matrix.nrows(),
                self.ineq_matrix.ncols()
            )));
        }

        if self.eq_matrix.nrows() != m_eq || self.eq_matrix.ncols() != n {
            return Err(MpcError::DimensionMismatch(format!(
                "A_eq must be {}x{}, got {}x{}",
                m_eq,
                n,
                self.eq_matrix.nrows(),
                self.eq_matrix.ncols()
            )));
        }

        let all_finite = self.hessian.iter().all(|v| v.is_finite())
            && self.gradient.iter().all(|v| v.is_finite())
            && self.ineq_matrix.iter().all(|v| v.is_finite())
            && self.ineq_rhs.iter().all(|v| v.is_finite())
            && self.eq_matrix.iter().all(|v| v.is_finite())
            && self.eq_rhs.iter().all(|v| v.is_finite());
        if !all_finite {
            return Err(MpcError::SolverError(
                "QP contains non-finite entries".to_string(),
            ));
        }

        let tol = 1e-9 * self.hessian.amax().max(1.0);
        if !is_symmetric(&self.hessian, tol) {
            return Err(MpcError::SolverError("H must be symmetric".to_string()));
        }

        Ok(())
    }

    /// Objective 0.5 * z^T H z + g^T z
    pub fn objective(&self, z: &DVector<f64>) -> f64 {
        0.5 * z.dot(&(&self.hessian * z)) + self.gradient.dot(z)
    }

    /// Largest constraint violation at `z` (0 when feasible)
    pub fn max_violation(&self, z: &DVector<f64>) -> f64 {
        let ineq = (&self.ineq_matrix * z - &self.ineq_rhs)
            .iter()
            .fold(0.0_f64, |acc, &v| acc.max(v));
        let eq = (&self.eq_matrix * z - &self.eq_rhs)
            .iter()
            .fold(0.0_f64, |acc, &v| acc.max(v.abs()));
        ineq.max(eq)
    }

    /// Numerical rank of `[H; A_eq]` from its singular values
    ///
    /// Singular values (not their squares) are compared against
    /// `tolerance * σ_max`, so badly scaled but well-posed dynamics keep
    /// their full rank.
    pub fn curvature_rank(&self, tolerance: f64) -> usize {
        let n = self.num_vars();
        let m_eq = self.num_equalities();

        let mut stacked = DMatrix::zeros(n + m_eq, n);
        stacked.rows_mut(0, n).copy_from(&self.hessian);
        stacked.rows_mut(n, m_eq).copy_from(&self.eq_matrix);

        let singular_values = stacked.svd(false, false).singular_values;
        let sigma_max = singular_values.amax();
        if sigma_max == 0.0 {
            return 0;
        }
        singular_values
            .iter()
            .filter(|&&sigma| sigma > tolerance * sigma_max)
            .count()
    }

    /// Whether H is numerically positive definite on `{z : A_eq z = 0}`
    ///
    /// For a PSD `H`, `zᵀHz = 0` only when `Hz = 0`, so definiteness on the
    /// null space of `A_eq` is equivalent to `[H; A_eq]` having full column
    /// rank. H itself must be PSD for the interior-point solve.
    pub fn is_positive_definite_on_feasible_subspace(&self, tolerance: f64) -> bool {
        let n = self.num_vars();
        if n == 0 {
            return false;
        }

        let scale = self.hessian.amax().max(1.0);
        if min_eigenvalue(&self.hessian) < -tolerance * scale {
            return false;
        }

        self.curvature_rank(tolerance) == n
    }
}
