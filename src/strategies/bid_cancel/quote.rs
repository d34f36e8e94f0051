use rust_decimal::Decimal;
use thiserror::Error;

use crate::core::types::{BookTicker, OrderRequest, OrderSide};
use crate::strategies::common::PrecisionConfig;
use crate::utils::{quantize_down, quantize_half_up};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuoteError {
    #[error("无效的报价: {0}")]
    InvalidPrice(Decimal),

    #[error("订单数量低于最小值: 价格 {price}, 数量 {quantity}")]
    BelowMinimum { price: Decimal, quantity: Decimal },
}

/// 盘口内侧的目标价格
///
/// 买单在买一上加 offset 个 tick，碰到卖一则退回买一；卖单对称处理
pub fn quote_price(side: OrderSide, book: &BookTicker, offset_ticks: u32, tick: Decimal) -> Decimal {
    let offset = Decimal::from(offset_ticks) * tick;
    match side {
        OrderSide::Buy => {
            let target = book.bid_price + offset;
            if target >= book.ask_price {
                log::warn!(
                    "⚠️ 买单价格 {} 不低于卖一 {}，改挂买一 {}",
                    target,
                    book.ask_price,
                    book.bid_price
                );
                book.bid_price
            } else {
                target
            }
        }
        OrderSide::Sell => {
            let target = book.ask_price - offset;
            if target <= book.bid_price {
                log::warn!(
                    "⚠️ 卖单价格 {} 不高于买一 {}，改挂卖一 {}",
                    target,
                    book.bid_price,
                    book.ask_price
                );
                book.ask_price
            } else {
                target
            }
        }
    }
}

/// 按目标名义金额生成 GTC 限价单
///
/// 数量 = 金额 / 目标价，向下取整；价格四舍五入到 tick
pub fn build_quote(
    symbol: &str,
    side: OrderSide,
    book: &BookTicker,
    usdt_amount: Decimal,
    offset_ticks: u32,
    precision: &PrecisionConfig,
) -> Result<OrderRequest, QuoteError> {
    let target = quote_price(side, book, offset_ticks, precision.price_quantum);
    if target <= Decimal::ZERO {
        return Err(QuoteError::InvalidPrice(target));
    }

    let raw_quantity = usdt_amount
        .checked_div(target)
        .ok_or(QuoteError::InvalidPrice(target))?;
    let quantity = quantize_down(raw_quantity, precision.quantity_quantum);
    let price = quantize_half_up(target, precision.price_quantum);

    if quantity <= Decimal::ZERO {
        return Err(QuoteError::BelowMinimum { price, quantity });
    }
    if let Some(min_notional) = precision.min_notional {
        if price * quantity < min_notional {
            return Err(QuoteError::BelowMinimum { price, quantity });
        }
    }

    Ok(OrderRequest::limit(symbol, side, quantity, price))
}
