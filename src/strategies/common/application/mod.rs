pub mod shutdown;
pub mod status;
pub mod strategy;

pub use shutdown::ShutdownSignal;
pub use status::{StatusTracker, StrategyState, StrategyStatus};
pub use strategy::{run_to_completion, StrategyInstance};
