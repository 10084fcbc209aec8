use std::io;
use std::path::Path;

use log::{debug, info};
use thiserror::Error;

use crate::control::pid::{PIDController, PIDParameters, PidError};
use crate::core::TargetFunction;
use crate::simulation::physics::PointMassPhysics;
use crate::simulation::trace::TraceWriter;

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("trace io error: {0}")]
    Io(#[from] io::Error),
    #[error("trace csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("controller error: {0}")]
    Pid(#[from] PidError),
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
    pub params: PIDParameters,
    pub max_time: f64,
    pub dt: f64,
    pub should_stabilize: bool,
    pub tolerance: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            params: PIDParameters::new(5.0, 5.0, 5.0),
            max_time: 10.0,
            dt: 0.01,
            should_stabilize: true,
            tolerance: 0.05,
        }
    }
}

impl SimulationConfig {
    pub fn new(params: PIDParameters) -> Self {
        Self {
            params,
            ..Default::default()
        }
    }

    pub fn with_max_time(mut self, max_time: f64) -> Self {
        self.max_time = max_time;
        self
    }

    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = dt;
        self
    }

    pub fn with_should_stabilize(mut self, should_stabilize: bool) -> Self {
        self.should_stabilize = should_stabilize;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    fn validate(&self) -> Result<(), SimulationError> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(SimulationError::InvalidConfig("dt must be positive"));
        }
        if !self.max_time.is_finite() {
            return Err(SimulationError::InvalidConfig("max_time must be finite"));
        }
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(SimulationError::InvalidConfig("tolerance must be non-negative"));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimulationReport {
    pub steps: usize,
    pub final_time: f64,
    pub final_target: f64,
    pub final_state: f64,
    pub final_error: f64,
    pub stabilized: bool,
}

/// Drives a point mass at rest toward `target` with a PID controller,
/// recording `(t, target, state)` for every step into `trace`.
pub fn run_simulation<T, W>(
    config: &SimulationConfig,
    target: &T,
    trace: &mut TraceWriter<W>,
) -> Result<SimulationReport, SimulationError>
where
    T: TargetFunction + ?Sized,
    W: io::Write,
{
    config.validate()?;

    let mut physics = PointMassPhysics::at_rest();

    let mut controller = PIDController::new(config.params);
    let mut current_target = 0.0;
    controller.initialize(current_target, physics.get_position(), 0.0)?;

    let mut steps = 0;
    let mut time = 0.0;
    // t = n * dt without accumulation: a run covers [dt, max_time), so 10s at
    // dt = 0.01 is 999 steps where a `t += dt` loop drifts into a 1000th.
    loop {
        let next_time = (steps + 1) as f64 * config.dt;
        if next_time >= config.max_time {
            break;
        }
        time = next_time;
        steps += 1;

        current_target = target.target_at(time);
        controller.update_target(current_target)?;

        // Control Loop
        let response = controller.calculate_output(physics.get_position(), time)?;

        // Physics Loop
        physics.set_response(response);
        physics.update(config.dt);

        trace.write_row(time, current_target, physics.get_position())?;
    }

    let final_state = physics.get_position();
    let final_error = (current_target - final_state).abs();
    let stabilized = !config.should_stabilize || final_error < config.tolerance;

    debug!(
        "simulation done: steps={} final_state={} final_error={}",
        steps, final_state, final_error
    );

    Ok(SimulationReport {
        steps,
        final_time: time,
        final_target: current_target,
        final_state,
        final_error,
        stabilized,
    })
}

/// Runs one named scenario and writes its trace as CSV to `path`.
pub fn run_scenario_to_file<T, P>(
    name: &str,
    config: &SimulationConfig,
    target: &T,
    path: P,
) -> Result<SimulationReport, SimulationError>
where
    T: TargetFunction + ?Sized,
    P: AsRef<Path>,
{
    info!(
        "scenario {}: max_time={}s dt={}s -> {}",
        name,
        config.max_time,
        config.dt,
        path.as_ref().display()
    );

    let mut trace = TraceWriter::create(path)?;
    let report = run_simulation(config, target, &mut trace)?;
    trace.finish()?;

    info!(
        "scenario {}: {} steps, final error {:.5}, stabilized: {}",
        name, report.steps, report.final_error, report.stabilized
    );
    Ok(report)
}

#[cfg(test)]
mod harness_tests {
    use super::*;
    use crate::core::{constant, step_function};

    #[test]
    fn test_step_response_stabilizes() {
        let config = SimulationConfig::default();
        let mut trace = TraceWriter::discard().unwrap();

        let report = run_simulation(&config, &step_function, &mut trace).unwrap();

        assert_eq!(report.steps, 999, "t runs from dt up to below max_time");
        assert_eq!(trace.rows(), 999);
        assert_eq!(report.final_target, 1.0);
        assert!(report.final_error < 0.05, "error {}", report.final_error);
        assert!(report.stabilized);
    }

    #[test]
    fn test_proportional_only_does_not_stabilize() {
        let config = SimulationConfig::new(PIDParameters::new(5.0, 0.0, 0.0));
        let mut trace = TraceWriter::discard().unwrap();

        let report = run_simulation(&config, &step_function, &mut trace).unwrap();

        assert!(!report.stabilized, "undamped plant keeps oscillating");
    }

    #[test]
    fn test_stabilization_check_can_be_disabled() {
        let config = SimulationConfig::new(PIDParameters::new(1.0, 0.0, 0.0))
            .with_should_stabilize(false);
        let mut trace = TraceWriter::discard().unwrap();

        let report = run_simulation(&config, &constant(1.0), &mut trace).unwrap();

        assert!(report.final_error > 0.05);
        assert!(report.stabilized);
    }

    #[test]
    fn test_trace_rows_follow_the_loop() {
        let config = SimulationConfig::default().with_max_time(0.035);
        let mut trace = TraceWriter::new(Vec::new()).unwrap();

        let report = run_simulation(&config, &constant(0.0), &mut trace).unwrap();
        let text = String::from_utf8(trace.finish().unwrap()).unwrap();

        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(report.steps, 3);
        assert_eq!(lines.len(), 4, "header plus one row per step");
        assert_eq!(lines[0], "Time,Target,State");
        assert_eq!(lines[1], "0.01,0,0");
        assert!(lines[3].ends_with(",0,0"));
    }

    #[test]
    fn test_unwritable_trace_path_fails_only_that_run() {
        let dir = std::env::temp_dir().join(format!("pid-sim-harness-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let blocker = dir.join("not_a_dir");
        std::fs::write(&blocker, b"").unwrap();
        let config = SimulationConfig::default().with_max_time(0.5);

        let result = run_scenario_to_file(
            "blocked",
            &config,
            &step_function,
            blocker.join("sub").join("trace.csv"),
        );
        assert!(
            matches!(result, Err(SimulationError::Io(_))),
            "got {:?}",
            result
        );

        let report = run_scenario_to_file("next", &config, &step_function, dir.join("ok.csv"))
            .expect("a later run is unaffected");
        assert_eq!(report.steps, 49);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_rejects_non_positive_dt() {
        let config = SimulationConfig::default().with_dt(0.0);
        let mut trace = TraceWriter::discard().unwrap();

        assert!(matches!(
            run_simulation(&config, &step_function, &mut trace),
            Err(SimulationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_non_finite_target_surfaces_controller_error() {
        let config = SimulationConfig::default();
        let mut trace = TraceWriter::discard().unwrap();

        let target = |t: f64| if t > 0.5 { f64::NAN } else { 0.0 };

        let result = run_simulation(&config, &target, &mut trace);

        assert!(matches!(
            result,
            Err(SimulationError::Pid(PidError::NonFinite("target")))
        ));
    }
}
