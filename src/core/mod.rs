// 核心模块 - 只包含核心业务逻辑
pub mod config;
pub mod error;
pub mod exchange;
pub mod retry_policy;
pub mod types;

pub use config::*;
pub use error::*;
pub use exchange::*;
pub use types::{
    BookTicker, OpenOrder, Order, OrderRequest, OrderSide, OrderStatus, OrderType, TickerPrice,
};
