pub mod adaptive;
pub mod cptree;

pub use adaptive::AdaptiveWindow;
pub use cptree::CpTreeMiner;
