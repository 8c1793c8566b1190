mod qp_spec;
mod backend;
mod config;
mod clarabel_backend;

pub use qp_spec::QpSpec;
pub use backend::{SolverBackend, QpSolution};
pub use config::SolverConfig;
pub use clarabel_backend::ClarabelSolver;
