use thiserror::Error;

#[derive(Debug, Error)]
pub enum MpcError {
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("Ill-posed cost: {0}")]
    IllPosedCost(String),

    #[error("Invalid bounds: {0}")]
    InvalidBounds(String),

    #[error("Non-finite input: {0}")]
    NonFinite(String),

    #[error("Invalid horizon: {0} (must be at least 1)")]
    InvalidHorizon(usize),

    #[error("Solver error: {0}")]
    SolverError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, MpcError>;
