pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{
    run_to_completion, ShutdownSignal, StatusTracker, StrategyInstance, StrategyState,
    StrategyStatus,
};
pub use domain::{PrecisionConfig, StrategyInfo};
pub use infrastructure::{wait_for_fill, FillOutcome, PollConfig};
