// 工具模块 - 通用工具函数
pub mod logger;
pub mod precision;
pub mod signature;
pub mod time_sync;

pub use logger::{init_logger, resolve_log_level};
pub use precision::{quantize_down, quantize_half_up, quantize_nearest};
pub use signature::*;
pub use time_sync::TimeSyncManager;
