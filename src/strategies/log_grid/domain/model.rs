use std::fmt;

use rust_decimal::Decimal;

use crate::core::types::{OrderRequest, OrderSide};
use crate::utils::quantize_down;

/// 网格价格档位，已按价格精度向下取整
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PriceLevel(Decimal);

impl PriceLevel {
    /// 按价格精度向下取整后构造
    pub fn new(raw: Decimal, price_quantum: Decimal) -> Self {
        Self(quantize_down(raw, price_quantum))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for PriceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 交易对精度，运行期间不变
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentSpec {
    pub symbol: String,
    /// 价格最小变动单位
    pub price_quantum: Decimal,
    /// 数量最小变动单位
    pub quantity_quantum: Decimal,
    /// 最小名义金额，None 表示不检查
    pub min_notional: Option<Decimal>,
}

/// 缺失的网格订单（档位 + 方向）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingPlacement {
    pub level: PriceLevel,
    pub side: OrderSide,
}

/// 待提交的限价单
#[derive(Debug, Clone, PartialEq)]
pub struct OrderIntent {
    pub symbol: String,
    pub side: OrderSide,
    pub price: Decimal,
    pub quantity: Decimal,
}

impl OrderIntent {
    pub fn notional(&self) -> Decimal {
        self.price * self.quantity
    }

    pub fn to_request(&self) -> OrderRequest {
        OrderRequest::limit(&self.symbol, self.side, self.quantity, self.price)
    }
}

/// 无法解析的挂单，只跳过该挂单本身
#[derive(Debug, Clone, PartialEq)]
pub struct ParseWarning {
    pub order_id: i64,
    pub reason: String,
}

/// 处于错误一侧的挂单：价格之上的买单或价格之下的卖单
#[derive(Debug, Clone, PartialEq)]
pub struct StrandedOrder {
    pub order_id: i64,
    pub side: OrderSide,
    pub price: Decimal,
}

/// 一次对账的结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    /// 按档位降序排列的缺失订单
    pub placements: Vec<PendingPlacement>,
    pub warnings: Vec<ParseWarning>,
    pub stranded: Vec<StrandedOrder>,
}

impl Reconciliation {
    pub fn is_complete(&self) -> bool {
        self.placements.is_empty()
    }
}

/// 单轮执行汇总
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// 成功挂出的订单数
    pub placed: usize,
    /// 交易所拒绝或请求失败的订单数
    pub failed: usize,
    /// 因数量/名义金额不足跳过的档位数
    pub skipped: usize,
}

impl fmt::Display for TickReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "成功 {} / 失败 {} / 跳过 {}",
            self.placed, self.failed, self.skipped
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_price_level_equality_is_quantized() {
        let a = PriceLevel::new(dec!(0.65004), dec!(0.0001));
        let b = PriceLevel::new(dec!(0.65), dec!(0.0001));
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "0.6500");
        assert!(PriceLevel::new(dec!(0.66), dec!(0.0001)) > a);
    }

    #[test]
    fn test_intent_to_request() {
        let intent = OrderIntent {
            symbol: "CRVUSDT".to_string(),
            side: OrderSide::Sell,
            price: dec!(0.6800),
            quantity: dec!(10),
        };
        let request = intent.to_request();
        assert_eq!(request.price, Some(dec!(0.68)));
        assert_eq!(request.side, OrderSide::Sell);
        assert_eq!(intent.notional(), dec!(6.8));
    }
}
