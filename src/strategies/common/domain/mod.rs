pub mod config;

pub use config::{PrecisionConfig, StrategyInfo};
