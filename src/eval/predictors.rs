use mipsim::cpu::Config;
use mipsim::cpu::Core;
use mipsim::cpu::DEFAULT_MAX_CYCLES;
use mipsim::predictor::PredictorKind;

mod programs;

/// Sweeps the table size of the dynamic predictors over the benchmark set
/// and plots accuracy against index bits
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let index_bits: Vec<u32> = (4..=12).collect();

    // One line series per predictor family, averaged over the benchmarks
    let families: Vec<(&str, fn(u32) -> PredictorKind)> = vec![
        ("2bit", |bits| PredictorKind::TwoBitSat { index_bits: bits }),
        ("gshare", |bits| PredictorKind::Gshare { history_bits: bits, index_bits: bits }),
        ("local", |bits| PredictorKind::LocalHistory { local_bits: bits, pattern_bits: bits }),
    ];

    let mut data: Vec<Vec<(u32, f64)>> = vec![vec![]; families.len()];
    for (i, (name, make_kind)) in families.iter().enumerate() {
        for &bits in &index_bits {
            let mut accuracy_sum = 0.0;
            let mut count = 0;
            for (_, words) in programs::benchmarks() {
                let mut core =
                    Core::new(Config { predictor: make_kind(bits), ..Config::default() })?;
                core.load_words(&words)?;
                core.run(DEFAULT_MAX_CYCLES)?;
                accuracy_sum += core.stats().branch.accuracy();
                count += 1;
            }
            data[i].push((bits, accuracy_sum / count as f64));
        }
        eprintln!("Swept predictor family: {}", name);
    }

    // Plot the sweep
    use plotters::prelude::*;

    let output_path = "predictor_accuracy.svg";
    let root = SVGBackend::new(output_path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut ctx = ChartBuilder::on(&root)
        .caption("Predictor accuracy vs table size", ("sans-serif", 40).into_font())
        .margin(5)
        .x_label_area_size(40)
        .y_label_area_size(40)
        .build_cartesian_2d(4u32..13u32, 0.0..1.05f64)?;
    ctx.configure_mesh().x_desc("Index bits").y_desc("Accuracy").draw()?;

    for (i, (name, _)) in families.iter().enumerate() {
        let color = Palette99::pick(i).to_rgba();
        ctx.draw_series(LineSeries::new(data[i].iter().copied(), color.clone()))?
            .label(name.to_string())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.clone())
            });
    }
    ctx.configure_series_labels().border_style(BLACK).draw()?;
    root.present()?;

    eprintln!("Wrote {}", output_path);
    Ok(())
}
