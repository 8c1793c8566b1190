use nalgebra::DVector;

use crate::bounds::Bounds;
use crate::cost::CostWeights;
use crate::error::{MpcError, Result};
use crate::system::LinearSystem;

/// A fully validated finite-horizon MPC problem
///
/// All shape and well-posedness checks run in [`MpcProblem::new`]; an
/// instance is immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct MpcProblem {
    system: LinearSystem,
    cost: CostWeights,
    horizon: usize,
    x0: DVector<f64>,
    bounds: Bounds,
}

impl MpcProblem {
    pub fn new(
        system: LinearSystem,
        cost: CostWeights,
        horizon: usize,
        x0: DVector<f64>,
        bounds: Bounds,
    ) -> Result<Self> {
        if horizon == 0 {
            return Err(MpcError::InvalidHorizon(horizon));
        }

        let nx = system.nx();
        let nu = system.nu();

        if cost.q().nrows() != nx {
            return Err(MpcError::DimensionMismatch(format!(
                "Q and P must be {}x{}, got {}x{}",
                nx,
                nx,
                cost.q().nrows(),
                cost.q().ncols()
            )));
        }

        if cost.r().nrows() != nu {
            return Err(MpcError::DimensionMismatch(format!(
                "R must be {}x{}, got {}x{}",
                nu,
                nu,
                cost.r().nrows(),
                cost.r().ncols()
            )));
        }

        if x0.len() != nx {
            return Err(MpcError::DimensionMismatch(format!(
                "x0 must have length {}, got {}",
                nx,
                x0.len()
            )));
        }

        if x0.iter().any(|x| !x.is_finite()) {
            return Err(MpcError::NonFinite(
                "x0 contains non-finite entries".to_string(),
            ));
        }

        bounds.validate(nx, nu)?;

        Ok(MpcProblem {
            system,
            cost,
            horizon,
            x0,
            bounds,
        })
    }

    /// Same system, costs, horizon and bounds from a different initial state
    pub fn with_initial_state(&self, x0: DVector<f64>) -> Result<Self> {
        MpcProblem::new(
            self.system.clone(),
            self.cost.clone(),
            self.horizon,
            x0,
            self.bounds.clone(),
        )
    }

    pub fn system(&self) -> &LinearSystem {
        &self.system
    }

    pub fn cost(&self) -> &CostWeights {
        &self.cost
    }

    /// Horizon N
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Initial state x0
    pub fn x0(&self) -> &DVector<f64> {
        &self.x0
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn nx(&self) -> usize {
        self.system.nx()
    }

    pub fn nu(&self) -> usize {
        self.system.nu()
    }
}
