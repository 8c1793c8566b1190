//! Shared scenarios and independent reference solutions.
//!
//! Two oracles that do not go through the crate's formulations:
//! a backward Riccati recursion (unconstrained only) and a QP written
//! directly over `[x0, .., xN, u0, .., u_{N-1}]` and handed to Clarabel.

#![allow(dead_code)]

use clarabel::algebra::CscMatrix;
use clarabel::solver::{
    DefaultSettings, DefaultSolver, IPSolver, SolverStatus,
    SupportedConeT::{NonnegativeConeT, ZeroConeT},
};
use convexmpc_types::{Bounds, CostWeights, LinearSystem, MpcProblem, Trajectory};
use nalgebra::{DMatrix, DVector};

pub const TOL: f64 = 1e-4;
pub const BOUND_SLACK: f64 = 1e-6;

pub fn reference_system() -> LinearSystem {
    LinearSystem::new(
        DMatrix::from_row_slice(2, 2, &[0.8, 1.0, 0.0, 0.9]),
        DMatrix::from_row_slice(2, 1, &[-1.0, 2.0]),
    )
    .unwrap()
}

/// A = [[0.8, 1], [0, 0.9]], B = [-1, 2], identity weights, N = 10, x0 = [1, 2]
pub fn reference_problem(bounds: Bounds) -> MpcProblem {
    MpcProblem::new(
        reference_system(),
        CostWeights::identity(2, 1),
        10,
        DVector::from_vec(vec![1.0, 2.0]),
        bounds,
    )
    .unwrap()
}

pub fn input_bounds() -> Bounds {
    Bounds::none().with_input_bounds(
        DVector::from_element(1, -0.7),
        DVector::from_element(1, 0.7),
    )
}

pub fn all_bounds() -> Bounds {
    input_bounds().with_state_bounds(
        DVector::from_vec(vec![-3.5, -0.5]),
        DVector::from_vec(vec![3.5, 2.0]),
    )
}

/// Finite-horizon LQR by backward Riccati recursion, rolled out from x0
pub fn riccati_trajectory(problem: &MpcProblem) -> Trajectory {
    let sys = problem.system();
    let cost = problem.cost();
    let (a, b) = (sys.a(), sys.b());
    let n = problem.horizon();

    let mut p_next = cost.p().clone();
    let mut gains = vec![DMatrix::zeros(sys.nu(), sys.nx()); n];
    for t in (0..n).rev() {
        let btp = b.transpose() * &p_next;
        let lhs = cost.r() + &btp * b;
        let k = lhs.cholesky().unwrap().solve(&(&btp * a));
        p_next = cost.q() + a.transpose() * &p_next * (a - b * &k);
        p_next = (&p_next + p_next.transpose()) * 0.5;
        gains[t] = k;
    }

    let mut states = vec![problem.x0().clone()];
    let mut inputs = Vec::with_capacity(n);
    for k in &gains {
        let x = states.last().unwrap();
        let u = -(k * x);
        let next = sys.propagate(x, &u);
        states.push(next);
        inputs.push(u);
    }

    Trajectory { inputs, states }
}

/// Solve the MPC problem as a modeling tool would state it
///
/// Unknowns are every state including x0 plus every input; x0 is pinned by
/// an equality. Returns `None` unless Clarabel reports a solution.
pub fn modeling_trajectory(problem: &MpcProblem) -> Option<Trajectory> {
    let sys = problem.system();
    let cost = problem.cost();
    let bounds = problem.bounds();
    let (nx, nu, n) = (problem.nx(), problem.nu(), problem.horizon());

    let n_states = (n + 1) * nx;
    let nw = n_states + n * nu;
    let x_col = |t: usize| t * nx;
    let u_col = |t: usize| n_states + t * nu;

    let mut p = DMatrix::zeros(nw, nw);
    for t in 1..=n {
        let weight = if t == n { cost.p() } else { cost.q() };
        p.view_mut((x_col(t), x_col(t)), (nx, nx)).copy_from(weight);
    }
    for t in 0..n {
        p.view_mut((u_col(t), u_col(t)), (nu, nu)).copy_from(cost.r());
    }
    let q = vec![0.0; nw];

    // Equalities: x0 = given, x_{t+1} - A x_t - B u_t = 0
    let n_eq = n_states;
    let mut a_eq = DMatrix::zeros(n_eq, nw);
    let mut b_eq = DVector::zeros(n_eq);
    a_eq.view_mut((0, 0), (nx, nx)).fill_with_identity();
    b_eq.rows_mut(0, nx).copy_from(problem.x0());
    for t in 0..n {
        let row = (t + 1) * nx;
        a_eq.view_mut((row, x_col(t + 1)), (nx, nx)).fill_with_identity();
        a_eq.view_mut((row, x_col(t)), (nx, nx)).copy_from(&(-sys.a()));
        a_eq.view_mut((row, u_col(t)), (nx, nu)).copy_from(&(-sys.b()));
    }

    // Inequalities, one scalar row per bounded entry
    let mut rows: Vec<(usize, f64, f64)> = Vec::new();
    for t in 0..n {
        for i in 0..nu {
            if let Some(umax) = &bounds.umax {
                rows.push((u_col(t) + i, 1.0, umax[i]));
            }
            if let Some(umin) = &bounds.umin {
                rows.push((u_col(t) + i, -1.0, -umin[i]));
            }
        }
    }
    for t in 1..=n {
        for i in 0..nx {
            if let Some(xmax) = &bounds.xmax {
                rows.push((x_col(t) + i, 1.0, xmax[i]));
            }
            if let Some(xmin) = &bounds.xmin {
                rows.push((x_col(t) + i, -1.0, -xmin[i]));
            }
        }
    }
    let n_ineq = rows.len();

    let mut a_all = DMatrix::zeros(n_eq + n_ineq, nw);
    a_all.rows_mut(0, n_eq).copy_from(&a_eq);
    let mut b_all: Vec<f64> = b_eq.iter().copied().collect();
    for (k, &(col, sign, rhs)) in rows.iter().enumerate() {
        a_all[(n_eq + k, col)] = sign;
        b_all.push(rhs);
    }

    let mut cones = vec![ZeroConeT(n_eq)];
    if n_ineq > 0 {
        cones.push(NonnegativeConeT(n_ineq));
    }

    let mut settings = DefaultSettings::default();
    settings.verbose = false;
    settings.tol_gap_abs = 1e-9;
    settings.tol_gap_rel = 1e-9;
    settings.tol_feas = 1e-9;

    let mut solver = DefaultSolver::new(
        &dense_to_csc(&p, true),
        &q,
        &dense_to_csc(&a_all, false),
        &b_all,
        &cones,
        settings,
    );
    solver.solve();

    if !matches!(
        solver.solution.status,
        SolverStatus::Solved | SolverStatus::AlmostSolved
    ) {
        return None;
    }

    let w = &solver.solution.x;
    let states = (0..=n)
        .map(|t| DVector::from_column_slice(&w[x_col(t)..x_col(t) + nx]))
        .collect();
    let inputs = (0..n)
        .map(|t| DVector::from_column_slice(&w[u_col(t)..u_col(t) + nu]))
        .collect();

    Some(Trajectory { inputs, states })
}

fn dense_to_csc(mat: &DMatrix<f64>, upper_only: bool) -> CscMatrix<f64> {
    let mut colptr = vec![0];
    let mut rowval = Vec::new();
    let mut nzval = Vec::new();

    for col in 0..mat.ncols() {
        let last = if upper_only { col + 1 } else { mat.nrows() };
        for row in 0..last {
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

/// Panics with the offending step if any bound family is violated
pub fn assert_bounds_respected(traj: &Trajectory, bounds: &Bounds) {
    for (t, u) in traj.inputs.iter().enumerate() {
        if let Some(umax) = &bounds.umax {
            for i in 0..u.len() {
                assert!(u[i] <= umax[i] + BOUND_SLACK, "u{}[{}] = {} > {}", t, i, u[i], umax[i]);
            }
        }
        if let Some(umin) = &bounds.umin {
            for i in 0..u.len() {
                assert!(u[i] >= umin[i] - BOUND_SLACK, "u{}[{}] = {} < {}", t, i, u[i], umin[i]);
            }
        }
    }
    for (t, x) in traj.states.iter().enumerate().skip(1) {
        if let Some(xmax) = &bounds.xmax {
            for i in 0..x.len() {
                assert!(x[i] <= xmax[i] + BOUND_SLACK, "x{}[{}] = {} > {}", t, i, x[i], xmax[i]);
            }
        }
        if let Some(xmin) = &bounds.xmin {
            for i in 0..x.len() {
                assert!(x[i] >= xmin[i] - BOUND_SLACK, "x{}[{}] = {} < {}", t, i, x[i], xmin[i]);
            }
        }
    }
}
