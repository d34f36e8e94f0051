pub mod config;
pub mod quote;
pub mod strategy;

pub use config::BidCancelConfig;
pub use strategy::BidCancelStrategy;
