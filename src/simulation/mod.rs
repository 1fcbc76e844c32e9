pub mod survivor;
pub mod tick;

pub use survivor::{ParameterSnapshot, Survivor, SurvivorSnapshot};
pub use tick::{run_frame, SimulationEvent};
