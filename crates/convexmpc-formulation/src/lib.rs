mod stacking;
mod prediction;
mod condensed;
mod sparse;
mod recovery;
mod controller;

pub use stacking::{selection_block, InequalityStack};
pub use prediction::PredictionMatrices;
pub use condensed::{CondensedFormulator, CondensedQp};
pub use sparse::{SparseFormulator, SparseLayout};
pub use recovery::TrajectoryRecoverer;
pub use controller::{ControllerConfig, MpcController};
