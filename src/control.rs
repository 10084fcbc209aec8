pub mod pid;

pub use pid::{PIDController, PIDParameters, PidError};
