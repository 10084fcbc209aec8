pub mod harness;
pub mod physics;
pub mod trace;

pub use harness::{
    SimulationConfig, SimulationError, SimulationReport, run_scenario_to_file, run_simulation,
};
pub use physics::PointMassPhysics;
pub use trace::TraceWriter;
