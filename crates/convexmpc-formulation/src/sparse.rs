use convexmpc_solver::QpSpec;
use convexmpc_types::{block_diag, tile_vector, MpcProblem, Result};
use nalgebra::{DMatrix, DVector};

use crate::stacking::{selection_block, InequalityStack};

/// Column layout of the joint unknown `z = [u0, .., u_{N-1}, x1, .., xN]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SparseLayout {
    pub horizon: usize,
    pub nx: usize,
    pub nu: usize,
}

impl SparseLayout {
    pub fn new(problem: &MpcProblem) -> Self {
        SparseLayout {
            horizon: problem.horizon(),
            nx: problem.nx(),
            nu: problem.nu(),
        }
    }

    /// Length of the stacked input partition
    pub fn num_inputs(&self) -> usize {
        self.horizon * self.nu
    }

    /// Length of the stacked state partition
    pub fn num_states(&self) -> usize {
        self.horizon * self.nx
    }

    pub fn num_vars(&self) -> usize {
        self.num_inputs() + self.num_states()
    }

    /// First column of `u_t`
    pub fn input_offset(&self, t: usize) -> usize {
        t * self.nu
    }

    /// First column of `x_{t+1}`
    pub fn state_offset(&self, t: usize) -> usize {
        self.num_inputs() + t * self.nx
    }
}

/// Builds the block-structured QP over inputs and states jointly
///
/// Cost `H = diag(R x N, Q x (N-1), P)` with `g = 0`; the dynamics become the
/// equality block and each present bound family a selection block of `G`.
pub struct SparseFormulator;

impl SparseFormulator {
    pub fn build_qp(problem: &MpcProblem) -> Result<QpSpec> {
        let layout = SparseLayout::new(problem);
        let n = layout.horizon;
        let nz = layout.num_vars();
        let cost = problem.cost();
        let bounds = problem.bounds();

        let mut blocks: Vec<&DMatrix<f64>> = vec![cost.r(); n];
        blocks.extend(std::iter::repeat(cost.q()).take(n - 1));
        blocks.push(cost.p());
        let hessian = block_diag(&blocks);
        let gradient = DVector::zeros(nz);

        let (a_eq, b_eq) = Self::dynamics_constraints(problem, &layout);

        let (n_u, n_x) = (layout.num_inputs(), layout.num_states());
        let mut stack = InequalityStack::new(nz);
        stack.push_if_present(bounds.umax.as_ref(), |umax| {
            (selection_block(nz, 0, n_u, 1.0), tile_vector(umax, n))
        });
        stack.push_if_present(bounds.umin.as_ref(), |umin| {
            (selection_block(nz, 0, n_u, -1.0), -tile_vector(umin, n))
        });
        stack.push_if_present(bounds.xmax.as_ref(), |xmax| {
            (selection_block(nz, n_u, n_x, 1.0), tile_vector(xmax, n))
        });
        stack.push_if_present(bounds.xmin.as_ref(), |xmin| {
            (selection_block(nz, n_u, n_x, -1.0), -tile_vector(xmin, n))
        });
        let (g, h) = stack.finish();

        tracing::debug!(
            "Sparse QP: {} vars, {} equalities, {} inequalities (horizon {})",
            nz,
            b_eq.len(),
            h.len(),
            n
        );

        Ok(QpSpec::new(hessian, gradient)
            .with_inequalities(g, h)
            .with_equalities(a_eq, b_eq))
    }

    /// `x_{t+1} - A x_t - B u_t = 0` for `t = 0..N-1`, with `x_0` substituted
    ///
    /// Row-block `t` holds `-B` on `u_t`, `I` on `x_{t+1}` and, for `t >= 1`,
    /// `-A` on `x_t`. Only the first block of `b_eq` is non-zero (`A x0`).
    pub fn dynamics_constraints(
        problem: &MpcProblem,
        layout: &SparseLayout,
    ) -> (DMatrix<f64>, DVector<f64>) {
        let (nx, nu) = (layout.nx, layout.nu);
        let a = problem.system().a();
        let neg_a = -a;
        let neg_b = -problem.system().b();

        let mut a_eq = DMatrix::zeros(layout.num_states(), layout.num_vars());
        for t in 0..layout.horizon {
            let row = t * nx;
            a_eq.view_mut((row, layout.input_offset(t)), (nx, nu))
                .copy_from(&neg_b);
            a_eq.view_mut((row, layout.state_offset(t)), (nx, nx))
                .fill_with_identity();
            if t >= 1 {
                a_eq.view_mut((row, layout.state_offset(t - 1)), (nx, nx))
                    .copy_from(&neg_a);
            }
        }

        let mut b_eq = DVector::zeros(layout.num_states());
        b_eq.rows_mut(0, nx).copy_from(&(a * problem.x0()));

        (a_eq, b_eq)
    }
}
