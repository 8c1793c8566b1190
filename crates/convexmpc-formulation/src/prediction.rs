use convexmpc_types::LinearSystem;
use nalgebra::{DMatrix, DVector};

/// Stacked prediction `X = Sx x0 + Su U` for `X = [x1; ..; xN]`, `U = [u0; ..; u_{N-1}]`
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionMatrices {
    /// `[A; A^2; ..; A^N]`, shape `N*nx x nx`
    pub sx: DMatrix<f64>,
    /// Block lower-triangular, block `(i, j) = A^(i-j) B` for `i >= j`
    pub su: DMatrix<f64>,
}

impl PredictionMatrices {
    pub fn build(system: &LinearSystem, horizon: usize) -> Self {
        let nx = system.nx();
        let nu = system.nu();
        let a = system.a();
        let b = system.b();

        // powers[k] = A^k for k = 0..=N
        let mut powers = Vec::with_capacity(horizon + 1);
        powers.push(DMatrix::identity(nx, nx));
        for k in 1..=horizon {
            let next = a * &powers[k - 1];
            powers.push(next);
        }

        let mut sx = DMatrix::zeros(horizon * nx, nx);
        for i in 0..horizon {
            sx.view_mut((i * nx, 0), (nx, nx)).copy_from(&powers[i + 1]);
        }

        // A^k B, shared by every block on the k-th subdiagonal
        let impulse: Vec<DMatrix<f64>> = powers[..horizon].iter().map(|p| p * b).collect();

        let mut su = DMatrix::zeros(horizon * nx, horizon * nu);
        for i in 0..horizon {
            for j in 0..=i {
                su.view_mut((i * nx, j * nu), (nx, nu))
                    .copy_from(&impulse[i - j]);
            }
        }

        PredictionMatrices { sx, su }
    }

    /// Stacked states `x1..xN` for initial state `x0` and stacked inputs `u`
    pub fn predict(&self, x0: &DVector<f64>, u: &DVector<f64>) -> DVector<f64> {
        &self.sx * x0 + &self.su * u
    }
}
