use std::process;

use mipsim::cpu::Config;
use mipsim::cpu::Core;
use mipsim::cpu::DEFAULT_MAX_CYCLES;
use mipsim::error::SimulatorError;
use mipsim::error::SimulatorResult;
use mipsim::predictor::PredictorKind;

mod programs;

fn main() {
    if let Err(e) = run_eval() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Every predictor variant crossed with every benchmark, one CSV row each
fn run_eval() -> SimulatorResult<()> {
    let output_path = "predictor_eval.csv";
    let mut writer = csv::Writer::from_path(output_path).map_err(|e| csv_error(output_path, e))?;

    writer
        .write_record([
            "Program",
            "Predictor",
            "Cycles",
            "Retired",
            "CPI",
            "Branches",
            "Mispredictions",
            "Accuracy",
        ])
        .map_err(|e| csv_error(output_path, e))?;

    let predictors = [
        ("static-nt", PredictorKind::StaticNotTaken),
        ("static-t", PredictorKind::StaticTaken),
        ("btfn", PredictorKind::Btfn),
        ("1bit", PredictorKind::OneBit { index_bits: 10 }),
        ("2bit", PredictorKind::TwoBitSat { index_bits: 10 }),
        ("gshare", PredictorKind::Gshare { history_bits: 10, index_bits: 10 }),
        ("local", PredictorKind::LocalHistory { local_bits: 10, pattern_bits: 10 }),
        ("tournament", PredictorKind::Tournament { choice_bits: 10 }),
    ];

    for (program_name, words) in programs::benchmarks() {
        eprintln!("Running benchmark: {}", program_name);

        for (predictor_name, kind) in predictors {
            let mut core = Core::new(Config { predictor: kind, ..Config::default() })?;
            core.load_words(&words)?;
            core.run(DEFAULT_MAX_CYCLES)?;

            let stats = core.stats();
            writer
                .write_record([
                    program_name.to_string(),
                    predictor_name.to_string(),
                    stats.cycles.to_string(),
                    stats.retired.to_string(),
                    format!("{:.3}", stats.cpi),
                    stats.branch.total.to_string(),
                    stats.branch.mispredicted.to_string(),
                    format!("{:.3}", stats.branch.accuracy()),
                ])
                .map_err(|e| csv_error(output_path, e))?;
        }
    }

    writer.flush()?;
    eprintln!("Wrote {}", output_path);
    Ok(())
}

fn csv_error(path: &str, e: csv::Error) -> SimulatorError {
    SimulatorError::IoError(std::io::Error::new(
        std::io::ErrorKind::Other,
        format!("Failed to write CSV '{}': {}", path, e),
    ))
}
