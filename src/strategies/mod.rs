// 策略模块
pub mod bid_cancel;
pub mod common;
pub mod log_grid;
pub mod volume;

// 导出策略类型
pub use bid_cancel::{BidCancelConfig, BidCancelStrategy};
pub use log_grid::{LogGridConfig, LogGridStrategy};
pub use volume::{VolumeConfig, VolumeStrategy};
