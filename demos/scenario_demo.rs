use convexmpc_formulation::{ControllerConfig, MpcController};
use convexmpc_types::{Formulation, MpcError, Result, ScenarioConfig, TrajectoryReport};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Demo settings: which scenario to solve and how much to print
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct DemoConfig {
    show_trajectories: bool,
    controller: ControllerConfig,
    scenario: ScenarioConfig,
}

impl Default for DemoConfig {
    fn default() -> Self {
        let mut scenario = ScenarioConfig::default();
        scenario.umin = Some(vec![-0.7]);
        scenario.umax = Some(vec![0.7]);
        scenario.xmin = Some(vec![-3.5, -0.5]);
        scenario.xmax = Some(vec![3.5, 2.0]);

        DemoConfig {
            show_trajectories: true,
            controller: ControllerConfig::default(),
            scenario,
        }
    }
}

fn load_config() -> Result<DemoConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .map_err(|e| MpcError::ConfigError(format!("{}: {}", path, e)))?;
            serde_json::from_str(&json).map_err(|e| MpcError::ConfigError(e.to_string()))
        }
        None => Ok(DemoConfig::default()),
    }
}

fn run() -> Result<()> {
    let config = load_config()?;
    let problem = config.scenario.clone().into_problem()?;

    println!("=== ConvexMPC Scenario Demo ===\n");
    println!(
        "nx = {}, nu = {}, horizon = {}, bound families = {}",
        problem.nx(),
        problem.nu(),
        problem.horizon(),
        problem.bounds().present_kinds()
    );
    println!();

    let mut trajectories = Vec::new();
    for formulation in [Formulation::Condensed, Formulation::Sparse] {
        let controller = MpcController::from_config(config.controller.clone())
            .with_formulation(formulation);
        let result = controller.solve(&problem)?;

        println!(
            "{:?}: status {:?}, {} iterations, objective {}",
            formulation,
            result.status,
            result.iterations,
            result
                .objective
                .map(|v| format!("{:.6}", v))
                .unwrap_or_else(|| "n/a".to_string())
        );

        if let Some(traj) = result.trajectory {
            println!(
                "  dynamics residual: {:.2e}",
                traj.max_dynamics_residual(problem.system())
            );
            if config.show_trajectories {
                let report = TrajectoryReport::from(&traj);
                let json = serde_json::to_string_pretty(&report)
                    .map_err(|e| MpcError::ConfigError(e.to_string()))?;
                println!("{}", json);
            }
            trajectories.push(traj);
        }
    }

    if let [condensed, sparse] = trajectories.as_slice() {
        println!();
        println!(
            "Max difference between formulations: {:.2e}",
            condensed.max_difference(sparse)
        );
    }

    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
