use rust_decimal::Decimal;

use crate::strategies::log_grid::domain::{GridError, InstrumentSpec, OrderIntent, PendingPlacement};
use crate::utils::quantize_down;

/// 把缺失档位转换为符合交易对精度的限价单
#[derive(Debug, Clone)]
pub struct OrderIntentEmitter {
    instrument: InstrumentSpec,
}

impl OrderIntentEmitter {
    pub fn new(instrument: InstrumentSpec) -> Self {
        Self { instrument }
    }

    /// 价格和数量都向下取整；数量取整后为0或名义金额不足时返回 `BelowMinimum`
    pub fn emit(
        &self,
        placement: &PendingPlacement,
        quantity: Decimal,
    ) -> Result<OrderIntent, GridError> {
        let price = quantize_down(placement.level.value(), self.instrument.price_quantum);
        let quantity = quantize_down(quantity, self.instrument.quantity_quantum);

        if quantity <= Decimal::ZERO {
            return Err(GridError::BelowMinimum { price, quantity });
        }

        let intent = OrderIntent {
            symbol: self.instrument.symbol.clone(),
            side: placement.side,
            price,
            quantity,
        };

        match self.instrument.min_notional {
            Some(min_notional) if intent.notional() < min_notional => {
                Err(GridError::BelowMinimum { price, quantity })
            }
            _ => Ok(intent),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::OrderSide;
    use crate::strategies::log_grid::domain::PriceLevel;
    use rust_decimal_macros::dec;

    fn emitter(min_notional: Option<Decimal>) -> OrderIntentEmitter {
        OrderIntentEmitter::new(InstrumentSpec {
            symbol: "CRVUSDT".to_string(),
            price_quantum: dec!(0.0001),
            quantity_quantum: dec!(1),
            min_notional,
        })
    }

    fn buy_at(price: Decimal) -> PendingPlacement {
        PendingPlacement {
            level: PriceLevel::new(price, dec!(0.0001)),
            side: OrderSide::Buy,
        }
    }

    #[test]
    fn test_emit_quantizes_down() {
        let intent = emitter(None).emit(&buy_at(dec!(0.6093)), dec!(10.9)).unwrap();

        assert_eq!(intent.symbol, "CRVUSDT");
        assert_eq!(intent.side, OrderSide::Buy);
        assert_eq!(intent.price.to_string(), "0.6093");
        assert_eq!(intent.quantity.to_string(), "10");
    }

    #[test]
    fn test_quantity_below_quantum() {
        let result = emitter(None).emit(&buy_at(dec!(0.65)), dec!(0.3));
        assert!(matches!(result, Err(GridError::BelowMinimum { .. })));
    }

    #[test]
    fn test_min_notional() {
        let strict = emitter(Some(dec!(5)));
        assert!(matches!(
            strict.emit(&buy_at(dec!(0.60)), dec!(8)),
            Err(GridError::BelowMinimum { .. })
        ));
        assert!(strict.emit(&buy_at(dec!(0.60)), dec!(9)).is_ok());
    }
}
