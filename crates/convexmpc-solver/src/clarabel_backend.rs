use clarabel::algebra::CscMatrix;
use clarabel::solver::{
    DefaultSettings, DefaultSolver, IPSolver, SolverStatus,
    SupportedConeT::{NonnegativeConeT, ZeroConeT},
};
use convexmpc_types::{Result, SolveStatus};
use nalgebra::{Cholesky, DMatrix, DVector};

use crate::{QpSolution, QpSpec, SolverBackend, SolverConfig};

/// Clarabel-based QP solver (interior point, pure Rust)
///
/// Holds only immutable settings, so one instance can serve concurrent solves.
#[derive(Debug, Clone, Default)]
pub struct ClarabelSolver {
    config: SolverConfig,
}

impl ClarabelSolver {
    /// Create a new Clarabel solver with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create solver with custom iteration limit and gap tolerance
    pub fn with_params(max_iter: u32, tolerance: f64) -> Self {
        ClarabelSolver {
            config: SolverConfig {
                max_iter,
                tol_gap_abs: tolerance,
                tol_gap_rel: tolerance,
                ..SolverConfig::default()
            },
        }
    }

    pub fn with_config(config: SolverConfig) -> Self {
        ClarabelSolver { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    fn settings(&self) -> DefaultSettings<f64> {
        let mut settings = DefaultSettings::default();
        settings.verbose = self.config.verbose;
        settings.max_iter = self.config.max_iter;
        settings.tol_gap_abs = self.config.tol_gap_abs;
        settings.tol_gap_rel = self.config.tol_gap_rel;
        settings.tol_feas = self.config.tol_feas;
        if let Some(limit) = self.config.time_limit_secs {
            settings.time_limit = limit;
        }
        settings
    }

    /// Without constraints the minimiser is `-H⁻¹ g`
    fn solve_unconstrained(&self, spec: &QpSpec) -> QpSolution {
        let Some(chol) = Cholesky::new(spec.hessian.clone()) else {
            tracing::warn!("Cholesky factorisation of H failed");
            return QpSolution::failed(SolveStatus::NumericalFailure, 0);
        };

        let z = chol.solve(&(-&spec.gradient));
        if z.iter().any(|v| !v.is_finite()) {
            return QpSolution::failed(SolveStatus::NumericalFailure, 0);
        }

        QpSolution {
            objective: spec.objective(&z),
            x: z.as_slice().to_vec(),
            status: SolveStatus::Optimal,
            iterations: 0,
        }
    }

    fn map_status(&self, status: SolverStatus) -> SolveStatus {
        match status {
            SolverStatus::Solved => SolveStatus::Optimal,
            SolverStatus::AlmostSolved if self.config.accept_almost_solved => {
                tracing::warn!("Clarabel reached reduced accuracy only, accepting solution");
                SolveStatus::Optimal
            }
            SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
                SolveStatus::Infeasible
            }
            SolverStatus::DualInfeasible | SolverStatus::AlmostDualInfeasible => {
                SolveStatus::Unbounded
            }
            _ => SolveStatus::NumericalFailure,
        }
    }
}

impl SolverBackend for ClarabelSolver {
    fn solve_qp(&self, spec: &QpSpec) -> Result<QpSolution> {
        spec.validate()?;

        if !spec.is_positive_definite_on_feasible_subspace(self.config.definiteness_tol) {
            tracing::warn!(
                "H is not positive definite on the feasible subspace ({} vars, {} equalities)",
                spec.num_vars(),
                spec.num_equalities()
            );
            return Ok(QpSolution::failed(SolveStatus::NumericalFailure, 0));
        }

        if !spec.has_inequalities() && !spec.has_equalities() {
            tracing::debug!("Unconstrained QP with {} vars, solving by Cholesky", spec.num_vars());
            return Ok(self.solve_unconstrained(spec));
        }

        let n = spec.num_vars();
        let n_eq = spec.num_equalities();
        let n_ineq = spec.num_inequalities();

        // Clarabel format: A z + s = b with s in K.
        // Equalities use the zero cone, G z <= h the nonnegative cone.
        let mut a_all = DMatrix::zeros(n_eq + n_ineq, n);
        a_all.rows_mut(0, n_eq).copy_from(&spec.eq_matrix);
        a_all.rows_mut(n_eq, n_ineq).copy_from(&spec.ineq_matrix);

        let b: Vec<f64> = spec
            .eq_rhs
            .iter()
            .chain(spec.ineq_rhs.iter())
            .copied()
            .collect();

        let mut cones = Vec::with_capacity(2);
        if n_eq > 0 {
            cones.push(ZeroConeT(n_eq));
        }
        if n_ineq > 0 {
            cones.push(NonnegativeConeT(n_ineq));
        }

        let p_csc = to_clarabel_csc_upper(&spec.hessian);
        let a_csc = to_clarabel_csc(&a_all);

        tracing::debug!(
            "Solving QP: {} vars, {} equalities, {} inequalities, max_iter={}",
            n,
            n_eq,
            n_ineq,
            self.config.max_iter
        );

        let mut solver = DefaultSolver::new(
            &p_csc,
            spec.gradient.as_slice(),
            &a_csc,
            &b,
            &cones,
            self.settings(),
        );

        solver.solve();

        let iterations = solver.info.iterations as usize;
        let status = self.map_status(solver.solution.status);

        if status != SolveStatus::Optimal {
            tracing::warn!(
                "Clarabel finished with {:?} after {} iterations",
                solver.solution.status,
                iterations
            );
            return Ok(QpSolution::failed(status, iterations));
        }

        let x = DVector::from_column_slice(&solver.solution.x);
        if x.iter().any(|v| !v.is_finite()) {
            tracing::warn!("Clarabel reported success with non-finite entries");
            return Ok(QpSolution::failed(SolveStatus::NumericalFailure, iterations));
        }

        let duals = DVector::from_column_slice(&solver.solution.z);
        let slacks = DVector::from_column_slice(&solver.solution.s);

        let polished = if self.config.polish {
            self.polish(spec, &duals, &slacks)
        } else {
            None
        };

        let x = match polished {
            Some(z) => z,
            None => {
                let residual = stationarity_residual(spec, &a_all, &x, &duals);
                if residual > self.config.kkt_tol {
                    tracing::warn!(
                        "Clarabel solution fails the stationarity check (relative residual {:.2e})",
                        residual
                    );
                    return Ok(QpSolution::failed(SolveStatus::NumericalFailure, iterations));
                }
                x
            }
        };

        Ok(QpSolution {
            objective: spec.objective(&x),
            x: x.as_slice().to_vec(),
            status,
            iterations,
        })
    }
}

impl ClarabelSolver {
    /// Solve the equality-constrained KKT system on the active set
    ///
    /// An inequality row is active when its dual exceeds its slack. The
    /// polished point is kept only if it is primal feasible, its active
    /// multipliers are non-negative and the KKT system was solved accurately;
    /// such a point is optimal for the convex QP.
    fn polish(
        &self,
        spec: &QpSpec,
        duals: &DVector<f64>,
        slacks: &DVector<f64>,
    ) -> Option<DVector<f64>> {
        let n = spec.num_vars();
        let n_eq = spec.num_equalities();
        let tol = self.config.kkt_tol;

        let active: Vec<usize> = (0..spec.num_inequalities())
            .filter(|&i| duals[n_eq + i] > slacks[n_eq + i])
            .collect();
        let m = n_eq + active.len();

        let mut kkt = DMatrix::zeros(n + m, n + m);
        let mut rhs = DVector::zeros(n + m);
        kkt.view_mut((0, 0), (n, n)).copy_from(&spec.hessian);
        rhs.rows_mut(0, n).copy_from(&(-&spec.gradient));

        for k in 0..m {
            let (row, value) = if k < n_eq {
                (spec.eq_matrix.row(k), spec.eq_rhs[k])
            } else {
                let i = active[k - n_eq];
                (spec.ineq_matrix.row(i), spec.ineq_rhs[i])
            };
            kkt.view_mut((n + k, 0), (1, n)).copy_from(&row);
            kkt.view_mut((0, n + k), (n, 1)).copy_from(&row.transpose());
            rhs[n + k] = value;
        }

        let solution = kkt.clone().lu().solve(&rhs)?;
        if solution.iter().any(|v| !v.is_finite()) {
            return None;
        }

        let kkt_error = (&kkt * &solution - &rhs).amax();
        if kkt_error > tol * (1.0 + rhs.amax()) {
            tracing::debug!("Polish rejected: KKT solve residual {:.2e}", kkt_error);
            return None;
        }

        let z = solution.rows(0, n).into_owned();
        let rhs_scale = 1.0 + spec.ineq_rhs.amax().max(spec.eq_rhs.amax());
        if spec.max_violation(&z) > tol * rhs_scale {
            tracing::debug!("Polish rejected: active set leaves a violated row");
            return None;
        }

        let multipliers = solution.rows(n + n_eq, active.len());
        let dual_scale = 1.0 + multipliers.amax();
        if multipliers.iter().any(|&mu| mu < -tol * dual_scale) {
            tracing::debug!("Polish rejected: negative multiplier on an active row");
            return None;
        }

        tracing::debug!("Polished on {} active inequalities", active.len());
        Some(z)
    }
}

/// Relative residual of `H z + g + [A_eq; G]ᵀ y`, Clarabel's dual stationarity
fn stationarity_residual(
    spec: &QpSpec,
    a_all: &DMatrix<f64>,
    z: &DVector<f64>,
    duals: &DVector<f64>,
) -> f64 {
    let hz = &spec.hessian * z;
    let aty = a_all.transpose() * duals;
    let residual = (&hz + &spec.gradient + &aty).amax();
    let scale = 1.0_f64
        .max(spec.gradient.amax())
        .max(hz.amax())
        .max(aty.amax());
    residual / scale
}

/// Convert DMatrix to Clarabel CSC format (upper triangle only for H)
fn to_clarabel_csc_upper(mat: &DMatrix<f64>) -> CscMatrix<f64> {
    let mut colptr = vec![0];
    let mut rowval = Vec::new();
    let mut nzval = Vec::new();

    // Iterate column by column (CSC format)
    for col in 0..mat.ncols() {
        // For upper triangle: row <= col
        for row in 0..=col {
            let val = mat[(row, col)];
            if val != 0.0 {
                rowval.push(row);
                nzval.push(val);
            }
        }
        colptr.push(nzval.len());
    }

    CscMatrix {
        m: mat.nrows(),
        n: mat.ncols(),
        colptr,
        rowval,
        nzval,
    }
}

/// Convert DMatrix to Clarabel CSC format (full matrix)
fn to_clarabel_csc(mat: &DMatrix<f64>) -> CscMatrix<f64> {
    let mut colptr = vec![0];
    let mut rowval = Vec::new();
    let mut nzval = Vec::new();

    for col in 0..mat.ncols() {
        for row in 0..mat.nrows() {
            let val = mat[(row, col)];
            if val != 0.0 {
                rowval.push(row);
                nzval.push(val);
            }
        }
        colptr.push(nzval.len());
    }

    CscMatrix {
        m: mat.nrows(),
        n: mat.ncols(),
        colptr,
        rowval,
        nzval,
    }
}
