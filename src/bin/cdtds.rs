//! Streaming drift-detection CLI: mines a training window, then watches the
//! subsequent stream for drift, writing one rules file per cohort.

use cdtds_miner::config::{DriftAlgorithm, PipelineConfig};
use cdtds_miner::data_loader::load_csv;
use cdtds_miner::export::write_cohort_rules;
use cdtds_miner::pipeline::CdtdsPipeline;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "cdtds", about = "Streaming rule mining with concept-drift detection")]
struct Args {
    #[arg(long)]
    input: PathBuf,

    #[arg(long)]
    output: String,

    #[arg(long)]
    training_window_size: usize,

    #[arg(long)]
    min_confidence: f64,

    #[arg(long)]
    min_support: f64,

    #[arg(long)]
    min_lift: f64,

    #[arg(long, default_value = "vrchange")]
    drift_algorithm: String,

    #[arg(long)]
    fixed_drift_confidence: Option<f64>,

    #[arg(long, default_value_t = false)]
    generate_maximal_itemsets: bool,

    #[arg(long, default_value_t = false)]
    trace_malloc: bool,

    #[arg(long, default_value_t = false)]
    disable_save_rules: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let Some(drift_algorithm) = DriftAlgorithm::parse(&args.drift_algorithm) else {
        eprintln!("error: unknown --drift-algorithm '{}'", args.drift_algorithm);
        return ExitCode::FAILURE;
    };

    let config = match PipelineConfig::validated(
        args.training_window_size,
        args.min_support,
        args.min_confidence,
        args.min_lift,
        drift_algorithm,
        args.fixed_drift_confidence,
        args.generate_maximal_itemsets,
        args.trace_malloc,
        args.disable_save_rules,
    ) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let transactions = match load_csv(&args.input) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: failed to read {}: {e}", args.input.display());
            return ExitCode::FAILURE;
        }
    };

    let disable_save_rules = config.disable_save_rules;
    let output_prefix = args.output.clone();
    let start = std::time::Instant::now();
    let mut pipeline = CdtdsPipeline::new(config);
    let mut write_error = None;

    let drift_count = pipeline.run(transactions, |result, interner| {
        log::info!(
            "cohort {}: {} rules, drift={:?}",
            result.cohort,
            result.rules.len(),
            result.drift.as_ref().map(|d| d.kind)
        );
        if !disable_save_rules && write_error.is_none() {
            if let Err(e) = write_cohort_rules(&output_prefix, result.cohort, &result.rules, interner) {
                write_error = Some(e);
            }
        }
    });

    log::info!("run complete: {drift_count} drifts detected in {:?}", start.elapsed());

    if let Some(e) = write_error {
        eprintln!("error: failed to write rules: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
