use log::{debug, trace, warn};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PidError {
    #[error("controller evaluated before initialize()")]
    Uninitialized,
    #[error("non-positive timestep: dt = {dt}")]
    NonPositiveTimestep { dt: f64 },
    #[error("{0} must be a finite number")]
    NonFinite(&'static str),
}

/// Gains of a PID controller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PIDParameters {
    pub k_p: f64,
    pub k_i: f64,
    pub k_d: f64,
}

impl Default for PIDParameters {
    fn default() -> Self {
        PIDParameters::new(1.0, 0.0, 0.0)
    }
}

impl PIDParameters {
    pub fn new(k_p: f64, k_i: f64, k_d: f64) -> Self {
        Self { k_p, k_i, k_d }
    }

    fn validate(&self) -> Result<(), PidError> {
        check_finite(self.k_p, "k_p")?;
        check_finite(self.k_i, "k_i")?;
        check_finite(self.k_d, "k_d")
    }
}

fn check_finite(value: f64, name: &'static str) -> Result<(), PidError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(PidError::NonFinite(name))
    }
}

/// Single-input single-output PID controller.
///
/// The error is `target - state`. The integral is accumulated with the
/// trapezoidal rule and is never clamped; the response is never saturated.
///
/// Every evaluation mutates the controller, so one instance belongs to one
/// control loop and is driven serially through `&mut self`.
#[derive(Clone, Debug)]
pub struct PIDController {
    params: PIDParameters,
    target: f64,
    last_timestamp: f64,
    last_error: f64,
    error_integral: f64,
    initialized: bool,
}

impl PIDController {
    /// Creates an uninitialized controller. [`PIDController::initialize`]
    /// must be called before the first [`PIDController::calculate_output`].
    pub fn new(params: PIDParameters) -> Self {
        Self {
            params,
            target: 0.0,
            last_timestamp: 0.0,
            last_error: 0.0,
            error_integral: 0.0,
            initialized: false,
        }
    }

    /// Seeds the baseline used by the derivative and integral terms.
    ///
    /// May be called again on an initialized controller; this discards the
    /// accumulated integral.
    pub fn initialize(&mut self, target: f64, state: f64, timestamp: f64) -> Result<(), PidError> {
        check_finite(target, "target")?;
        check_finite(state, "state")?;
        check_finite(timestamp, "timestamp")?;

        self.target = target;
        self.last_error = target - state;
        self.last_timestamp = timestamp;
        self.error_integral = 0.0;
        self.initialized = true;

        debug!(
            "pid initialized: target={} state={} t={}",
            target, state, timestamp
        );
        Ok(())
    }

    /// Computes the control response for the measured `state` at `timestamp`.
    ///
    /// A timestamp that does not advance past the previous evaluation is
    /// rejected with [`PidError::NonPositiveTimestep`] and leaves the
    /// controller untouched.
    pub fn calculate_output(&mut self, state: f64, timestamp: f64) -> Result<f64, PidError> {
        if !self.initialized {
            warn!("pid evaluated before initialization");
            return Err(PidError::Uninitialized);
        }
        check_finite(state, "state")?;
        check_finite(timestamp, "timestamp")?;

        let dt = timestamp - self.last_timestamp;
        if dt <= 0.0 {
            warn!(
                "rejecting pid update: t={} last_t={} dt={}",
                timestamp, self.last_timestamp, dt
            );
            return Err(PidError::NonPositiveTimestep { dt });
        }

        let error = self.target - state;
        let error_derivative = (error - self.last_error) / dt;
        self.error_integral += ((error + self.last_error) / 2.0) * dt;

        let response = self.params.k_p * error
            + self.params.k_d * error_derivative
            + self.params.k_i * self.error_integral;

        self.last_timestamp = timestamp;
        self.last_error = error;

        trace!(
            "pid t={} error={} derivative={} integral={} response={}",
            timestamp, error, error_derivative, self.error_integral, response
        );
        Ok(response)
    }

    /// Replaces the setpoint. The integral and the previous error are kept,
    /// so a step in the target shows up as a derivative spike on the next
    /// evaluation.
    pub fn update_target(&mut self, target: f64) -> Result<(), PidError> {
        check_finite(target, "target")?;
        self.target = target;
        Ok(())
    }

    pub fn get_target(&self) -> f64 {
        self.target
    }

    /// New gains apply from the next evaluation on.
    pub fn set_params(&mut self, params: PIDParameters) -> Result<(), PidError> {
        params.validate()?;
        self.params = params;
        Ok(())
    }

    pub fn get_params(&self) -> PIDParameters {
        self.params
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn get_integral(&self) -> f64 {
        self.error_integral
    }

    pub fn get_last_error(&self) -> f64 {
        self.last_error
    }

    pub fn get_last_timestamp(&self) -> f64 {
        self.last_timestamp
    }
}
