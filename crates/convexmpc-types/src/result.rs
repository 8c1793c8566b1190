use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::system::LinearSystem;

/// Outcome of a QP solve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    Unbounded,
    NumericalFailure,
}

/// Which QP formulation of the MPC problem to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Formulation {
    /// States eliminated, unknowns are the inputs only
    #[default]
    Condensed,
    /// Inputs and states as joint unknowns tied by dynamics equalities
    Sparse,
}

/// Predicted input and state sequences
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    /// `u0 .. u_{N-1}`
    pub inputs: Vec<DVector<f64>>,
    /// `x0 .. xN`, with `states[0]` the supplied initial state
    pub states: Vec<DVector<f64>>,
}

impl Trajectory {
    pub fn horizon(&self) -> usize {
        self.inputs.len()
    }

    /// The receding-horizon control action `u0`
    pub fn first_input(&self) -> Option<&DVector<f64>> {
        self.inputs.first()
    }

    /// Largest `|x[t+1] - (A x[t] + B u[t])|` over all steps and components
    pub fn max_dynamics_residual(&self, system: &LinearSystem) -> f64 {
        self.inputs
            .iter()
            .enumerate()
            .map(|(t, u)| {
                let predicted = system.propagate(&self.states[t], u);
                (&self.states[t + 1] - predicted).amax()
            })
            .fold(0.0, f64::max)
    }

    /// Largest componentwise difference to another trajectory of the same shape
    pub fn max_difference(&self, other: &Trajectory) -> f64 {
        let inputs = self.inputs.iter().zip(&other.inputs);
        let states = self.states.iter().zip(&other.states);
        inputs
            .chain(states)
            .map(|(a, b)| (a - b).amax())
            .fold(0.0, f64::max)
    }
}

/// Plain serialisable view of a trajectory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrajectoryReport {
    pub inputs: Vec<Vec<f64>>,
    pub states: Vec<Vec<f64>>,
}

impl From<&Trajectory> for TrajectoryReport {
    fn from(traj: &Trajectory) -> Self {
        TrajectoryReport {
            inputs: traj.inputs.iter().map(|u| u.as_slice().to_vec()).collect(),
            states: traj.states.iter().map(|x| x.as_slice().to_vec()).collect(),
        }
    }
}

/// Result of one MPC solve
#[derive(Debug, Clone)]
pub struct SolveResult {
    pub status: SolveStatus,
    pub formulation: Formulation,
    /// Present iff `status == Optimal`
    pub trajectory: Option<Trajectory>,
    /// QP objective `0.5 zᵀHz + gᵀz` at the solution, when optimal
    pub objective: Option<f64>,
    pub iterations: usize,
}

impl SolveResult {
    pub fn optimal(
        formulation: Formulation,
        trajectory: Trajectory,
        objective: f64,
        iterations: usize,
    ) -> Self {
        SolveResult {
            status: SolveStatus::Optimal,
            formulation,
            trajectory: Some(trajectory),
            objective: Some(objective),
            iterations,
        }
    }

    /// A non-optimal outcome; carries no trajectory
    pub fn failed(status: SolveStatus, formulation: Formulation, iterations: usize) -> Self {
        SolveResult {
            status,
            formulation,
            trajectory: None,
            objective: None,
            iterations,
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolveStatus::Optimal
    }
}
