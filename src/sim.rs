use std::io;
use std::io::Write;
use std::process;

use mipsim::cpu::Config;
use mipsim::cpu::Core;
use mipsim::cpu::DEFAULT_MAX_CYCLES;
use mipsim::error::ExecutionError;
use mipsim::error::SimulatorError;
use mipsim::error::SimulatorResult;
use mipsim::flags::Mipsim;
use mipsim::loader;
use mipsim::predictor::PredictorKind;
use text_io::read;

fn main() {
    let flags = match Mipsim::from_env() {
        Ok(flags) => flags,
        Err(err) if err.is_help() => {
            println!("{}", err);
            process::exit(0);
        }
        Err(err) => {
            eprintln!("{}", err);
            process::exit(1);
        }
    };

    if let Err(e) = run(flags) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(flags: Mipsim) -> SimulatorResult<()> {
    let predictor = flags
        .pred_type
        .map(PredictorKind::from)
        .unwrap_or(PredictorKind::StaticNotTaken);

    let config = Config {
        pipeline_enabled: flags.pipeline,
        predictor,
        verbose: flags.verbose,
        ..Config::default()
    };

    let mut core = Core::new(config)?;
    let words = loader::read_image_file(&flags.program)?;
    core.load_words(&words)?;

    println!("MIPS Simulator");
    println!("==============");
    println!("Program: {}", flags.program.display());
    println!("Step Mode: {}", enabled(flags.step));
    println!("Pipeline: {}", enabled(flags.pipeline));
    if flags.branch_pred {
        println!("Branch Prediction: Enabled ({:?})", predictor);
    } else {
        println!("Branch Prediction: Disabled");
    }
    println!();

    if flags.step {
        step_loop(&mut core, flags.pipeline)?;
    } else {
        match core.run(DEFAULT_MAX_CYCLES) {
            Ok(_) => {}
            Err(SimulatorError::ExecutionError(ExecutionError::SafetyCapReached(cap))) => {
                eprintln!("Warning: safety cap of {} cycles reached", cap);
            }
            Err(e) => return Err(e),
        }
    }

    println!("Simulation completed.");
    println!();
    println!("Final State:");
    print!("{}", core.register_dump());
    if flags.pipeline {
        println!();
        print!("{}", core.pipeline_dump());
    }

    let stats = core.stats();
    println!();
    println!("Cycles: {}", stats.cycles);
    println!("Instructions Retired: {}", stats.retired);
    println!("CPI: {:.2}", stats.cpi);
    println!();
    print!("{}", core.hazard_stats_dump());
    if flags.branch_pred {
        println!();
        print!("{}", core.branch_stats_dump());
    }

    Ok(())
}

/// Cycle-by-cycle mode: print the state, wait for the user, advance
fn step_loop(core: &mut Core, show_pipeline: bool) -> SimulatorResult<()> {
    let mut cycle = 0u64;
    while !core.halted() {
        cycle += 1;
        println!("--- Cycle {} ---", cycle);
        print!("{}", core.register_dump());
        if show_pipeline {
            println!();
            print!("{}", core.pipeline_dump());
        }

        print!("\nPress Enter to continue (or 'q' to quit): ");
        io::stdout().flush()?;
        let line: String = read!("{}\n");
        if line.trim() == "q" || line.trim() == "quit" {
            break;
        }

        core.step();
    }
    println!();
    Ok(())
}

fn enabled(on: bool) -> &'static str {
    if on {
        "Enabled"
    } else {
        "Disabled"
    }
}
