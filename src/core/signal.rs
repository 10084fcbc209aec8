/// Time-varying setpoint driving a simulation.
///
/// Implemented for every `Fn(f64) -> f64`, so plain functions and closures
/// can be used directly.
pub trait TargetFunction {
    fn target_at(&self, time: f64) -> f64;
}

impl<F> TargetFunction for F
where
    F: Fn(f64) -> f64,
{
    fn target_at(&self, time: f64) -> f64 {
        self(time)
    }
}

const SQUARE_HALF_PERIOD: f64 = 10.0;

fn half_period_index(time: f64) -> i64 {
    (time / SQUARE_HALF_PERIOD).floor() as i64
}

/// Steps from 0 to 1 at t = 1s.
pub fn step_function(time: f64) -> f64 {
    if time < 1.0 { 0.0 } else { 1.0 }
}

/// Square wave between 1 and 0, switching every 10s.
pub fn square_wave(time: f64) -> f64 {
    if half_period_index(time).rem_euclid(2) == 0 {
        1.0
    } else {
        0.0
    }
}

/// Square wave whose high level alternates between 0.5 and 1, switching every 10s.
pub fn uneven_square_wave(time: f64) -> f64 {
    let index = half_period_index(time);
    match (index.rem_euclid(2), index.rem_euclid(4)) {
        (0, 0) => 0.5,
        (0, _) => 1.0,
        _ => 0.0,
    }
}

/// Sine of period ~1s.
pub fn sine_wave(time: f64) -> f64 {
    (time * 6.283185).sin()
}

/// Fixed setpoint, independent of time.
pub fn constant(value: f64) -> impl Fn(f64) -> f64 {
    move |_| value
}
