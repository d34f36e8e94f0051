pub mod fill_monitor;

pub use fill_monitor::{wait_for_fill, FillOutcome, PollConfig};
