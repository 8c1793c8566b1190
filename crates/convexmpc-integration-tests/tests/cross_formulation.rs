mod common;

use common::*;
use convexmpc_formulation::MpcController;
use convexmpc_types::{
    Bounds, CostWeights, Formulation, LinearSystem, MpcProblem, SolveStatus, Trajectory,
};
use nalgebra::{DMatrix, DVector};
use proptest::collection::vec;
use proptest::prelude::*;
use std::sync::Arc;
use std::thread;

/// Weight diagonal entry, zero about a third of the time
fn weight() -> impl Strategy<Value = f64> {
    prop_oneof![1 => Just(0.0), 2 => 0.1f64..2.0]
}

/// Random system with row sums of |A| up to 1.5, so both stable and unstable
/// open-loop dynamics are drawn. Q and P may be zero; state boxes are optional.
fn random_problem() -> impl Strategy<Value = MpcProblem> {
    (1usize..=3, 1usize..=2)
        .prop_flat_map(|(nx, nu)| {
            (
                vec(-1.0f64..1.0, nx * nx),
                0.3f64..1.5,
                vec(-1.0f64..1.0, nx * nu),
                vec(weight(), nx),
                vec(0.5f64..2.0, nu),
                vec(weight(), nx),
                vec(-2.0f64..2.0, nx),
                1usize..=12,
                proptest::option::of(0.3f64..2.0),
                proptest::option::of(3.0f64..20.0),
                Just((nx, nu)),
            )
        })
        .prop_map(
            |(a, radius, b, q, r, p, x0, horizon, u_limit, x_limit, (nx, nu))| {
                let a = DMatrix::from_row_slice(nx, nx, &a) * (radius / nx as f64);
                let b = DMatrix::from_row_slice(nx, nu, &b);
                let cost = CostWeights::new(
                    DMatrix::from_diagonal(&DVector::from_vec(q)),
                    DMatrix::from_diagonal(&DVector::from_vec(r)),
                    DMatrix::from_diagonal(&DVector::from_vec(p)),
                )
                .unwrap();

                let mut bounds = Bounds::none();
                if let Some(limit) = u_limit {
                    bounds = bounds.with_input_bounds(
                        DVector::from_element(nu, -limit),
                        DVector::from_element(nu, limit),
                    );
                }
                if let Some(limit) = x_limit {
                    bounds = bounds.with_state_bounds(
                        DVector::from_element(nx, -limit),
                        DVector::from_element(nx, limit),
                    );
                }

                MpcProblem::new(
                    LinearSystem::new(a, b).unwrap(),
                    cost,
                    horizon,
                    DVector::from_vec(x0),
                    bounds,
                )
                .unwrap()
            },
        )
}

/// Largest state magnitude, used to scale agreement tolerances
fn magnitude(traj: &Trajectory) -> f64 {
    traj.states.iter().map(|x| x.amax()).fold(1.0, f64::max)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_formulations_agree(problem in random_problem()) {
        let condensed = MpcController::new()
            .with_formulation(Formulation::Condensed)
            .solve(&problem)
            .unwrap();
        let sparse = MpcController::new()
            .with_formulation(Formulation::Sparse)
            .solve(&problem)
            .unwrap();

        for result in [&condensed, &sparse] {
            prop_assert_eq!(result.trajectory.is_some(), result.is_optimal());
            if let Some(traj) = &result.trajectory {
                let scale = magnitude(traj);
                prop_assert!(traj.max_dynamics_residual(problem.system()) < TOL * scale);
                prop_assert_eq!(&traj.states[0], problem.x0());
                assert_bounds_respected(traj, problem.bounds());
            }
        }

        // An infeasible verdict from one form rules out an optimum from the other
        prop_assert!(!(condensed.status == SolveStatus::Infeasible && sparse.is_optimal()));
        prop_assert!(!(sparse.status == SolveStatus::Infeasible && condensed.is_optimal()));

        if let (Some(tc), Some(ts)) = (&condensed.trajectory, &sparse.trajectory) {
            let diff = tc.max_difference(ts);
            prop_assert!(diff < TOL * magnitude(tc), "diff = {}", diff);
        }
    }

    #[test]
    fn prop_unconstrained_matches_riccati(problem in random_problem()) {
        let problem = MpcProblem::new(
            problem.system().clone(),
            problem.cost().clone(),
            problem.horizon(),
            problem.x0().clone(),
            Bounds::none(),
        )
        .unwrap();

        let lqr = riccati_trajectory(&problem);
        for formulation in [Formulation::Condensed, Formulation::Sparse] {
            let result = MpcController::new()
                .with_formulation(formulation)
                .solve(&problem)
                .unwrap();
            if let Some(traj) = result.trajectory {
                let diff = traj.max_difference(&lqr);
                prop_assert!(diff < TOL * magnitude(&lqr), "{:?}: diff = {}", formulation, diff);
            }
        }
    }
}

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn test_controller_shared_across_threads() {
    assert_send_sync::<MpcController>();

    let controller = Arc::new(MpcController::new().with_formulation(Formulation::Sparse));
    let initial_states: Vec<DVector<f64>> = (0..8)
        .map(|k| DVector::from_vec(vec![1.0 - 0.25 * k as f64, 0.5 + 0.1 * k as f64]))
        .collect();

    let handles: Vec<_> = initial_states
        .iter()
        .cloned()
        .map(|x0| {
            let controller = Arc::clone(&controller);
            thread::spawn(move || {
                let problem = reference_problem(all_bounds()).with_initial_state(x0).unwrap();
                controller.solve(&problem).unwrap()
            })
        })
        .collect();

    for (handle, x0) in handles.into_iter().zip(&initial_states) {
        let threaded = handle.join().unwrap();
        let problem = reference_problem(all_bounds())
            .with_initial_state(x0.clone())
            .unwrap();
        let sequential = controller.solve(&problem).unwrap();

        assert_eq!(threaded.status, sequential.status);
        assert_eq!(threaded.trajectory, sequential.trajectory);
    }
}
