//! # cdtds-miner
//!
//! Streaming association-rule mining over an FP-tree, with two windowing
//! disciplines (a fixed-size sliding window and an adaptive exponential
//! histogram) and Hoeffding/Hellinger-based concept-drift detection.
//!
//! ## Quick Start
//!
//! ```no_run
//! use cdtds_miner::config::{DriftAlgorithm, PipelineConfig};
//! use cdtds_miner::data_loader::load_csv;
//! use cdtds_miner::pipeline::CdtdsPipeline;
//!
//! # fn main() -> cdtds_miner::errors::Result<()> {
//! let transactions = load_csv("transactions.csv")?;
//! let config = PipelineConfig::validated(
//!     1000, 0.01, 0.5, 1.0, DriftAlgorithm::Virtual, Some(0.8), false, false, false,
//! )?;
//! let mut pipeline = CdtdsPipeline::new(config);
//! pipeline.run(transactions, |result, _interner| {
//!     println!("cohort {}: {} rules", result.cohort, result.rules.len());
//! });
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod data_loader;
pub mod drift;
pub mod errors;
pub mod export;
pub mod fptree;
pub mod item;
pub mod levenshtein;
pub mod localcut;
pub mod mining;
pub mod pipeline;
pub mod ruletree;
pub mod transaction;
pub mod window;

pub use config::{DriftAlgorithm, PipelineConfig};
pub use errors::{MiningError, Result};
pub use item::{Interner, Item, ItemSet};
pub use mining::{generate_rules, mine, AssociationRule, MiningResult};
pub use pipeline::{CdtdsPipeline, CohortResult};
pub use transaction::Transaction;
