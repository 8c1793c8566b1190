use convexmpc_solver::QpSpec;
use convexmpc_types::{block_diag, kron_identity, tile_vector, MpcProblem, Result};
use nalgebra::DMatrix;

use crate::prediction::PredictionMatrices;
use crate::stacking::InequalityStack;

/// Condensed QP together with the prediction matrices needed for recovery
#[derive(Debug, Clone, PartialEq)]
pub struct CondensedQp {
    pub spec: QpSpec,
    pub prediction: PredictionMatrices,
}

/// Builds the dense QP over the input sequence `U = [u0; ..; u_{N-1}]`
///
/// States are eliminated through `X = Sx x0 + Su U`, which gives
/// `H = Suᵀ Qbar Su + Rbar` and `g = Suᵀ Qbar Sx x0`, with
/// `Qbar = diag(Q, .., Q, P)` and `Rbar = diag(R, .., R)`.
/// There is never an equality block.
pub struct CondensedFormulator;

impl CondensedFormulator {
    pub fn build_qp(problem: &MpcProblem) -> Result<CondensedQp> {
        let n = problem.horizon();
        let n_u = n * problem.nu();
        let cost = problem.cost();
        let bounds = problem.bounds();

        let prediction = PredictionMatrices::build(problem.system(), n);

        let mut q_blocks: Vec<&DMatrix<f64>> = vec![cost.q(); n - 1];
        q_blocks.push(cost.p());
        let qbar = block_diag(&q_blocks);
        let rbar = kron_identity(n, cost.r());

        let su_t_qbar = prediction.su.transpose() * &qbar;
        let hessian = &su_t_qbar * &prediction.su + rbar;
        let hessian = (&hessian + hessian.transpose()) * 0.5;

        // Sx x0: the state trajectory under zero input
        let free_response = &prediction.sx * problem.x0();
        let gradient = &su_t_qbar * &free_response;

        let mut stack = InequalityStack::new(n_u);
        stack.push_if_present(bounds.umax.as_ref(), |umax| {
            (DMatrix::identity(n_u, n_u), tile_vector(umax, n))
        });
        stack.push_if_present(bounds.umin.as_ref(), |umin| {
            (-DMatrix::identity(n_u, n_u), -tile_vector(umin, n))
        });
        stack.push_if_present(bounds.xmax.as_ref(), |xmax| {
            (prediction.su.clone(), tile_vector(xmax, n) - &free_response)
        });
        stack.push_if_present(bounds.xmin.as_ref(), |xmin| {
            (-&prediction.su, &free_response - tile_vector(xmin, n))
        });
        let (g, h) = stack.finish();

        tracing::debug!(
            "Condensed QP: {} vars, {} inequalities (horizon {})",
            n_u,
            h.len(),
            n
        );

        Ok(CondensedQp {
            spec: QpSpec::new(hessian, gradient).with_inequalities(g, h),
            prediction,
        })
    }
}
