use serde::{Deserialize, Serialize};

/// Settings for the Clarabel-backed QP adapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Interior-point iteration limit
    pub max_iter: u32,
    /// Wall-clock limit in seconds (none = unlimited)
    pub time_limit_secs: Option<f64>,
    pub tol_gap_abs: f64,
    pub tol_gap_rel: f64,
    pub tol_feas: f64,
    pub verbose: bool,
    /// Relative tolerance for the positive-definiteness pre-check
    pub definiteness_tol: f64,
    /// Treat Clarabel's reduced-accuracy `AlmostSolved` as optimal
    pub accept_almost_solved: bool,
    /// Re-solve the KKT system on Clarabel's active set after a successful solve
    pub polish: bool,
    /// Relative tolerance for accepting a polished point and for the
    /// stationarity check on unpolished solutions
    pub kkt_tol: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            max_iter: 10000,
            time_limit_secs: None,
            tol_gap_abs: 1e-8,
            tol_gap_rel: 1e-8,
            tol_feas: 1e-8,
            verbose: false,
            definiteness_tol: 1e-12,
            accept_almost_solved: true,
            polish: true,
            kkt_tol: 1e-7,
        }
    }
}
