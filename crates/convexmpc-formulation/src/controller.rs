use convexmpc_solver::{ClarabelSolver, QpSpec, SolverBackend, SolverConfig};
use convexmpc_types::{Formulation, MpcProblem, Result, SolveResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::condensed::CondensedFormulator;
use crate::recovery::TrajectoryRecoverer;
use crate::sparse::SparseFormulator;

/// Configuration for the MPC controller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub formulation: Formulation,
    pub solver: SolverConfig,
}

/// Single-shot MPC solver: formulate, solve, recover
///
/// Stateless between calls; one controller can be shared across threads.
pub struct MpcController {
    backend: Arc<dyn SolverBackend + Send + Sync>,
    config: ControllerConfig,
}

impl MpcController {
    /// Create a controller with the Clarabel backend and the condensed formulation
    pub fn new() -> Self {
        Self::from_config(ControllerConfig::default())
    }

    /// Create a Clarabel-backed controller from configuration
    pub fn from_config(config: ControllerConfig) -> Self {
        MpcController {
            backend: Arc::new(ClarabelSolver::with_config(config.solver.clone())),
            config,
        }
    }

    /// Create with custom backend and configuration
    pub fn with_backend(
        backend: Arc<dyn SolverBackend + Send + Sync>,
        config: ControllerConfig,
    ) -> Self {
        MpcController { backend, config }
    }

    pub fn with_formulation(mut self, formulation: Formulation) -> Self {
        self.config.formulation = formulation;
        self
    }

    pub fn formulation(&self) -> Formulation {
        self.config.formulation
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Build the QP this controller would hand to its backend
    pub fn formulate(&self, problem: &MpcProblem) -> Result<QpSpec> {
        match self.config.formulation {
            Formulation::Condensed => Ok(CondensedFormulator::build_qp(problem)?.spec),
            Formulation::Sparse => SparseFormulator::build_qp(problem),
        }
    }

    /// Solve one MPC problem
    ///
    /// Structural problems are returned as `Err`; solver outcomes other than
    /// optimal come back as a `SolveResult` without a trajectory.
    pub fn solve(&self, problem: &MpcProblem) -> Result<SolveResult> {
        let formulation = self.config.formulation;

        let result = match formulation {
            Formulation::Condensed => {
                let qp = CondensedFormulator::build_qp(problem)?;
                let solution = self.backend.solve_qp(&qp.spec)?;
                if solution.is_optimal() {
                    let trajectory = TrajectoryRecoverer::from_inputs(
                        problem,
                        &qp.prediction,
                        &solution.to_vector(),
                    )?;
                    SolveResult::optimal(formulation, trajectory, solution.objective, solution.iterations)
                } else {
                    SolveResult::failed(solution.status, formulation, solution.iterations)
                }
            }
            Formulation::Sparse => {
                let spec = SparseFormulator::build_qp(problem)?;
                let solution = self.backend.solve_qp(&spec)?;
                if solution.is_optimal() {
                    let trajectory = TrajectoryRecoverer::from_joint(problem, &solution.to_vector())?;
                    SolveResult::optimal(formulation, trajectory, solution.objective, solution.iterations)
                } else {
                    SolveResult::failed(solution.status, formulation, solution.iterations)
                }
            }
        };

        if result.is_optimal() {
            tracing::info!(
                "MPC solve finished: {:?} formulation, horizon {}, {} iterations, objective {:.6e}",
                formulation,
                problem.horizon(),
                result.iterations,
                result.objective.unwrap_or(f64::NAN)
            );
        } else {
            tracing::warn!(
                "MPC solve did not reach optimality: {:?} ({:?} formulation)",
                result.status,
                formulation
            );
        }

        Ok(result)
    }
}

impl Default for MpcController {
    fn default() -> Self {
        Self::new()
    }
}
