use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::bounds::Bounds;
use crate::cost::CostWeights;
use crate::error::{MpcError, Result};
use crate::problem::MpcProblem;
use crate::system::LinearSystem;

/// Serialisable description of an MPC problem
///
/// Matrices are row-major `Vec<Vec<f64>>`. Nothing is validated until
/// [`ScenarioConfig::into_problem`] builds the [`MpcProblem`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub a: Vec<Vec<f64>>,
    pub b: Vec<Vec<f64>>,
    pub q: Vec<Vec<f64>>,
    pub r: Vec<Vec<f64>>,
    pub p: Vec<Vec<f64>>,
    pub horizon: usize,
    pub x0: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub umin: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub umax: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xmin: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xmax: Option<Vec<f64>>,
}

impl Default for ScenarioConfig {
    /// Two-state, one-input system over a 10-step horizon with identity weights
    fn default() -> Self {
        ScenarioConfig {
            a: vec![vec![0.8, 1.0], vec![0.0, 0.9]],
            b: vec![vec![-1.0], vec![2.0]],
            q: vec![vec![1.0, 0.0], vec![0.0, 1.0]],
            r: vec![vec![1.0]],
            p: vec![vec![1.0, 0.0], vec![0.0, 1.0]],
            horizon: 10,
            x0: vec![1.0, 2.0],
            umin: None,
            umax: None,
            xmin: None,
            xmax: None,
        }
    }
}

impl ScenarioConfig {
    /// Parse a scenario from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| MpcError::ConfigError(e.to_string()))
    }

    /// Serialise the scenario to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| MpcError::ConfigError(e.to_string()))
    }

    /// Build and validate the problem
    pub fn into_problem(&self) -> Result<MpcProblem> {
        let system = LinearSystem::new(
            matrix_from_rows("A", &self.a)?,
            matrix_from_rows("B", &self.b)?,
        )?;

        let cost = CostWeights::new(
            matrix_from_rows("Q", &self.q)?,
            matrix_from_rows("R", &self.r)?,
            matrix_from_rows("P", &self.p)?,
        )?;

        let to_vec = |v: &Option<Vec<f64>>| v.as_ref().map(|v| DVector::from_column_slice(v));
        let bounds = Bounds {
            umin: to_vec(&self.umin),
            umax: to_vec(&self.umax),
            xmin: to_vec(&self.xmin),
            xmax: to_vec(&self.xmax),
        };

        MpcProblem::new(
            system,
            cost,
            self.horizon,
            DVector::from_column_slice(&self.x0),
            bounds,
        )
    }
}

/// Build a matrix from row-major rows, rejecting ragged input
pub fn matrix_from_rows(name: &str, rows: &[Vec<f64>]) -> Result<DMatrix<f64>> {
    let ncols = rows.first().map_or(0, Vec::len);
    if let Some(i) = rows.iter().position(|row| row.len() != ncols) {
        return Err(MpcError::DimensionMismatch(format!(
            "{} row {} has length {}, expected {}",
            name,
            i,
            rows[i].len(),
            ncols
        )));
    }

    Ok(DMatrix::from_row_iterator(
        rows.len(),
        ncols,
        rows.iter().flat_map(|row| row.iter().copied()),
    ))
}
