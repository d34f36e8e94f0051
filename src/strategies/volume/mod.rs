pub mod config;
pub mod strategy;

pub use config::VolumeConfig;
pub use strategy::{CycleOutcome, VolumeStrategy};
