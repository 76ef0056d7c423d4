pub mod apriori;
pub mod fpgrowth;
pub mod rules;
pub mod stats;

pub use fpgrowth::{mine, MiningResult};
pub use rules::{generate_rules, AssociationRule};
