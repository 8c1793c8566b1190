use nalgebra::DVector;

use crate::error::{MpcError, Result};

/// Optional box bounds on inputs and states
///
/// Each family is independent; an absent family leaves that direction
/// unconstrained. State bounds apply to the predicted states `x1..xN`,
/// never to the fixed initial state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bounds {
    pub umin: Option<DVector<f64>>,
    pub umax: Option<DVector<f64>>,
    pub xmin: Option<DVector<f64>>,
    pub xmax: Option<DVector<f64>>,
}

impl Bounds {
    /// No bounds at all
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_umin(mut self, umin: DVector<f64>) -> Self {
        self.umin = Some(umin);
        self
    }

    pub fn with_umax(mut self, umax: DVector<f64>) -> Self {
        self.umax = Some(umax);
        self
    }

    pub fn with_xmin(mut self, xmin: DVector<f64>) -> Self {
        self.xmin = Some(xmin);
        self
    }

    pub fn with_xmax(mut self, xmax: DVector<f64>) -> Self {
        self.xmax = Some(xmax);
        self
    }

    /// Set both input bounds at once
    pub fn with_input_bounds(self, umin: DVector<f64>, umax: DVector<f64>) -> Self {
        self.with_umin(umin).with_umax(umax)
    }

    /// Set both state bounds at once
    pub fn with_state_bounds(self, xmin: DVector<f64>, xmax: DVector<f64>) -> Self {
        self.with_xmin(xmin).with_xmax(xmax)
    }

    pub fn has_input_bounds(&self) -> bool {
        self.umin.is_some() || self.umax.is_some()
    }

    pub fn has_state_bounds(&self) -> bool {
        self.xmin.is_some() || self.xmax.is_some()
    }

    /// Number of bound families that are set (0..=4)
    pub fn present_kinds(&self) -> usize {
        [&self.umin, &self.umax, &self.xmin, &self.xmax]
            .iter()
            .filter(|b| b.is_some())
            .count()
    }

    /// Check lengths against (nx, nu), finiteness and lower <= upper
    pub fn validate(&self, nx: usize, nu: usize) -> Result<()> {
        let families = [
            ("umin", &self.umin, nu),
            ("umax", &self.umax, nu),
            ("xmin", &self.xmin, nx),
            ("xmax", &self.xmax, nx),
        ];

        for (name, bound, expected) in families {
            if let Some(v) = bound {
                if v.len() != expected {
                    return Err(MpcError::DimensionMismatch(format!(
                        "{} must have length {}, got {}",
                        name,
                        expected,
                        v.len()
                    )));
                }
                if v.iter().any(|x| !x.is_finite()) {
                    return Err(MpcError::InvalidBounds(format!(
                        "{} contains non-finite entries",
                        name
                    )));
                }
            }
        }

        check_ordered("u", &self.umin, &self.umax)?;
        check_ordered("x", &self.xmin, &self.xmax)?;

        Ok(())
    }
}

fn check_ordered(
    name: &str,
    lower: &Option<DVector<f64>>,
    upper: &Option<DVector<f64>>,
) -> Result<()> {
    if let (Some(lo), Some(hi)) = (lower, upper) {
        if let Some(i) = lo.iter().zip(hi.iter()).position(|(l, h)| l > h) {
            return Err(MpcError::InvalidBounds(format!(
                "{}min[{}] = {} exceeds {}max[{}] = {}",
                name, i, lo[i], name, i, hi[i]
            )));
        }
    }
    Ok(())
}
