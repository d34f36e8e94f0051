use rust_decimal::Decimal;
use thiserror::Error;

/// 网格计算与下单过程中的错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    /// 网格区间或步数非法，启动即失败
    #[error("无效的网格区间: {0}")]
    InvalidRange(String),

    /// 取整后数量为0或名义金额不足，跳过该档位
    #[error("订单数量低于最小值: 价格 {price}, 数量 {quantity}")]
    BelowMinimum { price: Decimal, quantity: Decimal },

    /// 交易所数据无法解析
    #[error("解析失败: {0}")]
    Parse(String),

    /// 本轮未能取得行情或挂单，跳过本轮
    #[error("交易所数据不可用: {0}")]
    TransportAbsent(String),
}

impl GridError {
    pub fn invalid_range(reason: impl Into<String>) -> Self {
        GridError::InvalidRange(reason.into())
    }
}
