mod bounds;
mod config;
mod cost;
mod error;
mod matrix_utils;
mod problem;
mod result;
mod system;

pub use bounds::Bounds;
pub use config::{matrix_from_rows, ScenarioConfig};
pub use cost::{CostWeights, COST_TOLERANCE};
pub use error::{MpcError, Result};
pub use matrix_utils::{
    block_diag, is_symmetric, kron_identity, min_eigenvalue, tile_vector, validate_pd,
    validate_psd,
};
pub use problem::MpcProblem;
pub use result::{Formulation, SolveResult, SolveStatus, Trajectory, TrajectoryReport};
pub use system::LinearSystem;
