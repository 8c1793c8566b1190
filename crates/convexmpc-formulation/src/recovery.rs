use convexmpc_types::{MpcError, MpcProblem, Result, Trajectory};
use nalgebra::DVector;

use crate::prediction::PredictionMatrices;
use crate::sparse::SparseLayout;

/// Rebuilds input and state sequences from a solved QP vector
pub struct TrajectoryRecoverer;

impl TrajectoryRecoverer {
    /// Condensed path: `z` is the stacked input sequence, states follow from
    /// `X = Sx x0 + Su U`
    pub fn from_inputs(
        problem: &MpcProblem,
        prediction: &PredictionMatrices,
        z: &DVector<f64>,
    ) -> Result<Trajectory> {
        let (n, nx, nu) = (problem.horizon(), problem.nx(), problem.nu());
        expect_len(z, n * nu)?;

        let predicted = prediction.predict(problem.x0(), z);

        let mut states = Vec::with_capacity(n + 1);
        states.push(problem.x0().clone());
        states.extend(split(predicted.as_slice(), nx));

        Ok(Trajectory {
            inputs: split(z.as_slice(), nu),
            states,
        })
    }

    /// Sparse path: inputs and states are read directly from
    /// `z = [u0, .., u_{N-1}, x1, .., xN]`
    pub fn from_joint(problem: &MpcProblem, z: &DVector<f64>) -> Result<Trajectory> {
        let layout = SparseLayout::new(problem);
        expect_len(z, layout.num_vars())?;

        let (inputs, states_tail) = z.as_slice().split_at(layout.num_inputs());

        let mut states = Vec::with_capacity(layout.horizon + 1);
        states.push(problem.x0().clone());
        states.extend(split(states_tail, layout.nx));

        Ok(Trajectory {
            inputs: split(inputs, layout.nu),
            states,
        })
    }
}

fn expect_len(z: &DVector<f64>, expected: usize) -> Result<()> {
    if z.len() != expected {
        return Err(MpcError::DimensionMismatch(format!(
            "solution vector must have length {}, got {}",
            expected,
            z.len()
        )));
    }
    Ok(())
}

fn split(values: &[f64], chunk: usize) -> Vec<DVector<f64>> {
    values
        .chunks_exact(chunk)
        .map(DVector::from_column_slice)
        .collect()
}
