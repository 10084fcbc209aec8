use std::process::ExitCode;

use chrono::Local;
use fern::Dispatch;
use pid_sim::{
    PIDParameters, SimulationConfig, TargetFunction, run_scenario_to_file, sine_wave, square_wave,
    step_function, uneven_square_wave,
};

struct Scenario {
    name: &'static str,
    output_file: &'static str,
    config: SimulationConfig,
    target: &'static dyn TargetFunction,
}

fn setup_logger() -> Result<(), Box<dyn std::error::Error>> {
    Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}][{}][{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(log::LevelFilter::Debug)
        .chain(std::fs::File::create("pid-sim.log")?)
        .chain(std::io::stdout())
        .apply()?;

    Ok(())
}

fn scenarios(params: PIDParameters) -> Vec<Scenario> {
    let base = SimulationConfig::new(params);

    vec![
        Scenario {
            name: "step_function",
            output_file: "test_results/step_function.csv",
            config: base.clone().with_max_time(10.0),
            target: &step_function,
        },
        Scenario {
            name: "square_wave",
            output_file: "test_results/square_wave.csv",
            config: base.clone().with_max_time(100.0),
            target: &square_wave,
        },
        Scenario {
            name: "uneven_square_wave",
            output_file: "test_results/uneven_square_wave.csv",
            config: base.clone().with_max_time(100.0),
            target: &uneven_square_wave,
        },
        Scenario {
            name: "sinusoid",
            output_file: "test_results/sinusoid.csv",
            config: base.with_max_time(10.0).with_should_stabilize(false),
            target: &sine_wave,
        },
    ]
}

fn main() -> ExitCode {
    if let Err(e) = setup_logger() {
        eprintln!("failed to set up logging: {}", e);
        return ExitCode::FAILURE;
    }

    let params = PIDParameters::new(5.0, 5.0, 5.0);
    log::info!("pid-sim: k_p={} k_i={} k_d={}", params.k_p, params.k_i, params.k_d);

    for scenario in scenarios(params) {
        match run_scenario_to_file(
            scenario.name,
            &scenario.config,
            scenario.target,
            scenario.output_file,
        ) {
            Ok(report) if report.stabilized => {}
            Ok(report) => {
                log::error!(
                    "{} did not stabilize: target {} state {}",
                    scenario.name,
                    report.final_target,
                    report.final_state
                );
                return ExitCode::FAILURE;
            }
            Err(e) => {
                log::error!("{} failed: {}", scenario.name, e);
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
