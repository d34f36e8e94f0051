// 交易所实现
pub mod aster;

#[cfg(test)]
pub mod mock;

// 导出交易所实现
pub use aster::AsterExchange;
