pub mod signal;

pub use signal::{
    TargetFunction, constant, sine_wave, square_wave, step_function, uneven_square_wave,
};
