//! Batch association-rule miner: one CSV in, one rules file out, no
//! per-cohort split or drift monitoring.

use cdtds_miner::data_loader::load_csv;
use cdtds_miner::export::write_rules_file;
use cdtds_miner::item::Interner;
use cdtds_miner::mining::{fpgrowth, generate_rules};
use cdtds_miner::transaction::Transaction;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "armpy", about = "Batch association-rule mining over a CSV transaction log")]
struct Args {
    #[arg(long)]
    input: PathBuf,

    #[arg(long)]
    output: PathBuf,

    #[arg(long)]
    min_support: f64,

    #[arg(long)]
    min_confidence: f64,

    #[arg(long)]
    min_lift: f64,

    #[arg(long, default_value_t = false)]
    generate_maximal_itemsets: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    if !(0.0..=1.0).contains(&args.min_support) || !(0.0..=1.0).contains(&args.min_confidence) {
        eprintln!("error: --min-support and --min-confidence must be in [0,1]");
        return ExitCode::FAILURE;
    }
    if args.min_lift < 1.0 {
        eprintln!("error: --min-lift must be >= 1");
        return ExitCode::FAILURE;
    }

    let rows = match load_csv(&args.input) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: failed to read {}: {e}", args.input.display());
            return ExitCode::FAILURE;
        }
    };

    let mut interner = Interner::new();
    let mut tree = cdtds_miner::fptree::FPTree::new();
    for row in &rows {
        let tx = Transaction::from_names(row, &mut interner);
        tree.insert(tx.items(), 1);
    }
    tree.sort();

    let start = std::time::Instant::now();
    let mining = fpgrowth::mine(&tree, args.min_support, args.generate_maximal_itemsets);
    let rules = generate_rules(
        &mining.itemsets,
        &mining.itemset_counts,
        mining.n_transactions,
        args.min_confidence,
        args.min_lift,
    );
    log::info!(
        "mined {} itemsets, {} rules from {} transactions in {:?}",
        mining.itemsets.len(),
        rules.len(),
        mining.n_transactions,
        start.elapsed()
    );

    if let Err(e) = write_rules_file(&args.output, &rules, &interner) {
        eprintln!("error: failed to write {}: {e}", args.output.display());
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
