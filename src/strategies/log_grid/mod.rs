pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::controller::LogGridStrategy;
pub use domain::config::LogGridConfig;
