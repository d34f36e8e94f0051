use std::collections::HashSet;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::core::types::{OpenOrder, OrderSide};
use crate::strategies::log_grid::domain::{
    ParseWarning, PendingPlacement, PriceLevel, Reconciliation, StrandedOrder,
};
use crate::utils::quantize_nearest;

/// 对比网格档位与当前挂单，找出缺失的订单
///
/// 价格下方的档位需要买单，上方的需要卖单，与当前价相等的档位不挂单。
/// 挂单价格按最近的 tick 取整后比较，方向或价格无法解析的挂单记入 warnings 后跳过。
/// 结果只描述差异，不做任何 I/O
pub fn reconcile(
    current_price: Decimal,
    levels: &[PriceLevel],
    open_orders: &[OpenOrder],
    price_quantum: Decimal,
) -> Reconciliation {
    let mut buys: HashSet<Decimal> = HashSet::new();
    let mut sells: HashSet<Decimal> = HashSet::new();
    let mut warnings = Vec::new();
    let mut stranded = Vec::new();

    for order in open_orders {
        let (side, price) = match parse_open_order(order) {
            Ok(parsed) => parsed,
            Err(reason) => {
                warnings.push(ParseWarning {
                    order_id: order.order_id,
                    reason,
                });
                continue;
            }
        };

        let price = quantize_nearest(price, price_quantum);
        let wrong_side = match side {
            OrderSide::Buy => price > current_price,
            OrderSide::Sell => price < current_price,
        };
        if wrong_side {
            stranded.push(StrandedOrder {
                order_id: order.order_id,
                side,
                price,
            });
        }

        match side {
            OrderSide::Buy => buys.insert(price),
            OrderSide::Sell => sells.insert(price),
        };
    }

    let placements = levels
        .iter()
        .filter_map(|level| {
            let price = level.value();
            if price < current_price && !buys.contains(&price) {
                Some(PendingPlacement {
                    level: *level,
                    side: OrderSide::Buy,
                })
            } else if price > current_price && !sells.contains(&price) {
                Some(PendingPlacement {
                    level: *level,
                    side: OrderSide::Sell,
                })
            } else {
                None
            }
        })
        .collect();

    Reconciliation {
        placements,
        warnings,
        stranded,
    }
}

fn parse_open_order(order: &OpenOrder) -> Result<(OrderSide, Decimal), String> {
    let side = OrderSide::from_str(&order.side)
        .map_err(|_| format!("无法识别的方向: {:?}", order.side))?;

    let raw_price = order
        .price
        .as_deref()
        .ok_or_else(|| "缺少价格".to_string())?;
    let price = Decimal::from_str(raw_price.trim())
        .map_err(|_| format!("无法解析的价格: {:?}", raw_price))?;
    if price <= Decimal::ZERO {
        return Err(format!("价格必须大于0: {}", price));
    }

    Ok((side, price))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchanges::mock::MockExchange;
    use rust_decimal_macros::dec;

    const TICK: Decimal = dec!(0.0001);

    fn levels(prices: &[Decimal]) -> Vec<PriceLevel> {
        let mut levels: Vec<PriceLevel> = prices.iter().map(|p| PriceLevel::new(*p, TICK)).collect();
        levels.sort_by(|a, b| b.cmp(a));
        levels
    }

    fn placement(price: Decimal, side: OrderSide) -> PendingPlacement {
        PendingPlacement {
            level: PriceLevel::new(price, TICK),
            side,
        }
    }

    fn sample_levels() -> Vec<PriceLevel> {
        levels(&[dec!(0.60), dec!(0.62), dec!(0.65), dec!(0.68), dec!(0.70)])
    }

    #[test]
    fn test_empty_book_fills_both_sides() {
        let result = reconcile(dec!(0.65), &sample_levels(), &[], TICK);

        assert_eq!(
            result.placements,
            vec![
                placement(dec!(0.70), OrderSide::Sell),
                placement(dec!(0.68), OrderSide::Sell),
                placement(dec!(0.62), OrderSide::Buy),
                placement(dec!(0.60), OrderSide::Buy),
            ]
        );
        assert!(result.warnings.is_empty());
        assert!(result.stranded.is_empty());
    }

    #[test]
    fn test_covered_levels_are_skipped() {
        let open = vec![
            MockExchange::open_order(1, "BUY", "0.6200"),
            MockExchange::open_order(2, "SELL", "0.70000"),
        ];
        let result = reconcile(dec!(0.65), &sample_levels(), &open, TICK);

        assert_eq!(
            result.placements,
            vec![
                placement(dec!(0.68), OrderSide::Sell),
                placement(dec!(0.60), OrderSide::Buy),
            ]
        );
    }

    #[test]
    fn test_order_prices_matched_to_nearest_tick() {
        let open = vec![
            MockExchange::open_order(1, "BUY", "0.62004"),
            MockExchange::open_order(2, "BUY", "0.59996"),
        ];
        let result = reconcile(dec!(0.65), &sample_levels(), &open, TICK);

        assert!(result
            .placements
            .iter()
            .all(|p| p.side == OrderSide::Sell));
    }

    #[test]
    fn test_wrong_side_order_does_not_cover_level() {
        // 0.62 上只有卖单，仍需要补买单
        let open = vec![MockExchange::open_order(1, "SELL", "0.62")];
        let result = reconcile(dec!(0.65), &sample_levels(), &open, TICK);

        assert!(result
            .placements
            .contains(&placement(dec!(0.62), OrderSide::Buy)));
        assert_eq!(result.stranded.len(), 1);
        assert_eq!(result.stranded[0].order_id, 1);
        assert_eq!(result.stranded[0].side, OrderSide::Sell);
    }

    #[test]
    fn test_unparsable_orders_become_warnings() {
        let mut no_price = MockExchange::open_order(3, "SELL", "0");
        no_price.price = None;
        let open = vec![
            MockExchange::open_order(1, "BOTH", "0.62"),
            MockExchange::open_order(2, "BUY", "abc"),
            no_price,
            MockExchange::open_order(4, "BUY", "0.60"),
        ];
        let result = reconcile(dec!(0.65), &sample_levels(), &open, TICK);

        let warned: Vec<i64> = result.warnings.iter().map(|w| w.order_id).collect();
        assert_eq!(warned, vec![1, 2, 3]);
        assert!(result
            .placements
            .contains(&placement(dec!(0.62), OrderSide::Buy)));
        assert!(!result
            .placements
            .contains(&placement(dec!(0.60), OrderSide::Buy)));
    }

    #[test]
    fn test_price_outside_grid() {
        let above = reconcile(dec!(0.80), &sample_levels(), &[], TICK);
        assert_eq!(above.placements.len(), 5);
        assert!(above.placements.iter().all(|p| p.side == OrderSide::Buy));

        let below = reconcile(dec!(0.50), &sample_levels(), &[], TICK);
        assert!(below.placements.iter().all(|p| p.side == OrderSide::Sell));
    }

    #[test]
    fn test_idempotent_once_orders_rest() {
        let grid = sample_levels();
        let first = reconcile(dec!(0.65), &grid, &[], TICK);

        let open: Vec<OpenOrder> = first
            .placements
            .iter()
            .enumerate()
            .map(|(i, p)| {
                MockExchange::open_order(i as i64, p.side.as_str(), &p.level.to_string())
            })
            .collect();

        let second = reconcile(dec!(0.65), &grid, &open, TICK);
        assert!(second.is_complete());
        assert_eq!(reconcile(dec!(0.65), &grid, &open, TICK), second);
    }

    fn opposite(side: OrderSide) -> OrderSide {
        match side {
            OrderSide::Buy => OrderSide::Sell,
            OrderSide::Sell => OrderSide::Buy,
        }
    }

    fn sorted_pairs(placements: &[PendingPlacement]) -> Vec<(Decimal, OrderSide)> {
        let mut pairs: Vec<(Decimal, OrderSide)> =
            placements.iter().map(|p| (p.level.value(), p.side)).collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        pairs
    }

    #[test]
    fn test_mirrored_inputs_give_mirrored_placements() {
        let price = dec!(0.65);
        let mirror = |value: Decimal| price * Decimal::TWO - value;

        let prices = [
            dec!(0.58),
            dec!(0.61),
            dec!(0.64),
            dec!(0.65),
            dec!(0.67),
            dec!(0.70),
        ];
        let orders = [
            (1, OrderSide::Buy, dec!(0.61)),
            (2, OrderSide::Sell, dec!(0.70)),
            (3, OrderSide::Sell, dec!(0.58)),
            (4, OrderSide::Buy, dec!(0.67)),
        ];

        let grid = levels(&prices);
        let open: Vec<OpenOrder> = orders
            .iter()
            .map(|(id, side, p)| MockExchange::open_order(*id, side.as_str(), &p.to_string()))
            .collect();

        let mirrored_prices: Vec<Decimal> = prices.iter().map(|p| mirror(*p)).collect();
        let mirrored_grid = levels(&mirrored_prices);
        let mirrored_open: Vec<OpenOrder> = orders
            .iter()
            .map(|(id, side, p)| {
                MockExchange::open_order(*id, opposite(*side).as_str(), &mirror(*p).to_string())
            })
            .collect();

        let original = reconcile(price, &grid, &open, TICK);
        let mirrored = reconcile(price, &mirrored_grid, &mirrored_open, TICK);

        let mut expected: Vec<(Decimal, OrderSide)> = original
            .placements
            .iter()
            .map(|p| (mirror(p.level.value()), opposite(p.side)))
            .collect();
        expected.sort_by(|a, b| a.0.cmp(&b.0));

        assert!(!expected.is_empty());
        assert_eq!(sorted_pairs(&mirrored.placements), expected);

        let stranded_ids = |r: &Reconciliation| {
            let mut ids: Vec<i64> = r.stranded.iter().map(|o| o.order_id).collect();
            ids.sort();
            ids
        };
        assert_eq!(stranded_ids(&original), vec![3, 4]);
        assert_eq!(stranded_ids(&mirrored), stranded_ids(&original));
    }

    #[test]
    fn test_side_symmetry() {
        let grid = levels(&[dec!(0.60), dec!(0.62), dec!(0.68), dec!(0.70)]);
        let result = reconcile(dec!(0.65), &grid, &[], TICK);

        let buys = result
            .placements
            .iter()
            .filter(|p| p.side == OrderSide::Buy)
            .count();
        let sells = result.placements.len() - buys;
        assert_eq!(buys, 2);
        assert_eq!(sells, 2);

        // 价格恰好落在档位上时该档位不挂单
        let on_level = reconcile(dec!(0.68), &grid, &[], TICK);
        assert!(on_level
            .placements
            .iter()
            .all(|p| p.level.value() != dec!(0.68)));
    }
}
