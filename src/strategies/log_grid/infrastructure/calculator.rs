use rust_decimal::prelude::*;

use crate::strategies::log_grid::domain::{GridError, PriceLevel};
use crate::utils::quantize_down;

/// 相邻档位的等比系数 (upper/lower)^(1/num_grids)
pub fn grid_ratio(upper: Decimal, lower: Decimal, num_grids: u32) -> Result<Decimal, GridError> {
    if lower <= Decimal::ZERO {
        return Err(GridError::invalid_range(format!(
            "下边界必须大于0: {}",
            lower
        )));
    }
    if upper <= lower {
        return Err(GridError::invalid_range(format!(
            "上边界 {} 必须大于下边界 {}",
            upper, lower
        )));
    }
    if num_grids < 1 {
        return Err(GridError::invalid_range("网格数量至少为1"));
    }

    let span = upper
        .checked_div(lower)
        .ok_or_else(|| GridError::invalid_range("上下边界比值溢出"))?;
    let exponent = Decimal::ONE / Decimal::from(num_grids);

    span.checked_powd(exponent)
        .ok_or_else(|| GridError::invalid_range("等比系数计算溢出"))
}

fn raw_level(
    lower: Decimal,
    upper: Decimal,
    ratio: Decimal,
    num_grids: u32,
    i: u32,
) -> Result<Decimal, GridError> {
    if i == 0 {
        return Ok(lower);
    }
    if i == num_grids {
        return Ok(upper);
    }
    ratio
        .checked_powi(i64::from(i))
        .and_then(|factor| lower.checked_mul(factor))
        .ok_or_else(|| GridError::invalid_range(format!("第{}档价格计算溢出", i)))
}

/// 第一个原始价格不低于 `target` 的档位序号
///
/// 中间档位取整后与当前档位相同，直接跳过。先用对数估算，再向前回退修正估算误差，
/// 结果落在 (current, num_grids] 内
fn next_index(
    lower: Decimal,
    upper: Decimal,
    ratio: Decimal,
    ln_ratio: Decimal,
    num_grids: u32,
    current: u32,
    target: Decimal,
) -> Result<u32, GridError> {
    let estimate = target
        .checked_div(lower)
        .and_then(|span| span.checked_ln())
        .and_then(|ln_target| ln_target.checked_div(ln_ratio))
        .and_then(|steps| steps.ceil().to_u32())
        .unwrap_or(num_grids);
    let mut next = estimate.clamp(current + 1, num_grids);

    while next - 1 > current && raw_level(lower, upper, ratio, num_grids, next - 1)? >= target {
        next -= 1;
    }

    Ok(next)
}

/// 生成对数网格档位（降序）
///
/// 档位 i 的价格为 lower·r^i，首尾两档固定为 upper 与 lower，
/// 所有价格按 `price_quantum` 向下取整，取整后相距不超过半个 tick 的档位只保留一个。
/// 网格比 tick 更密时只计算落在不同 tick 上的档位，耗时与区间内的 tick 数相关
pub fn compute_levels(
    upper: Decimal,
    lower: Decimal,
    num_grids: u32,
    price_quantum: Decimal,
) -> Result<Vec<PriceLevel>, GridError> {
    if price_quantum <= Decimal::ZERO {
        return Err(GridError::invalid_range(format!(
            "价格精度必须大于0: {}",
            price_quantum
        )));
    }

    let ratio = grid_ratio(upper, lower, num_grids)?;
    if quantize_down(lower, price_quantum) <= Decimal::ZERO {
        return Err(GridError::invalid_range(format!(
            "下边界 {} 小于价格精度 {}",
            lower, price_quantum
        )));
    }

    log::debug!(
        "网格区间 [{}, {}] 共 {} 格，等比系数 {}",
        lower,
        upper,
        num_grids,
        ratio.round_dp(8)
    );

    let ln_ratio = ratio
        .checked_ln()
        .filter(|v| *v > Decimal::ZERO)
        .ok_or_else(|| GridError::invalid_range(format!("网格过密，等比系数 {} 无法区分", ratio)))?;

    // 区间内最多只有 ticks+1 个不同价格
    let max_distinct = ((quantize_down(upper, price_quantum) - quantize_down(lower, price_quantum))
        / price_quantum)
        .floor()
        .to_usize()
        .unwrap_or(0)
        .saturating_add(1);
    let capacity = max_distinct.min((num_grids as usize).saturating_add(1));

    let mut ascending: Vec<PriceLevel> = Vec::with_capacity(capacity);
    let mut i = 0u32;
    loop {
        let level = PriceLevel::new(raw_level(lower, upper, ratio, num_grids, i)?, price_quantum);
        let target = level.value() + price_quantum;
        ascending.push(level);
        if i == num_grids {
            break;
        }
        i = next_index(lower, upper, ratio, ln_ratio, num_grids, i, target)?;
    }

    let half_tick = price_quantum / Decimal::TWO;
    let mut levels: Vec<PriceLevel> = Vec::with_capacity(ascending.len());
    for level in ascending.into_iter().rev() {
        if let Some(last) = levels.last() {
            if (last.value() - level.value()).abs() <= half_tick {
                continue;
            }
        }
        levels.push(level);
    }

    Ok(levels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn values(levels: &[PriceLevel]) -> Vec<Decimal> {
        levels.iter().map(|l| l.value()).collect()
    }

    #[test]
    fn test_crv_grid_levels() {
        let levels = compute_levels(dec!(0.70), dec!(0.60), 10, dec!(0.0001)).unwrap();

        assert_eq!(levels.len(), 11);
        assert_eq!(
            values(&levels),
            vec![
                dec!(0.7000),
                dec!(0.6892),
                dec!(0.6787),
                dec!(0.6683),
                dec!(0.6581),
                dec!(0.6480),
                dec!(0.6381),
                dec!(0.6283),
                dec!(0.6187),
                dec!(0.6093),
                dec!(0.6000),
            ]
        );
        assert_eq!(levels[0].to_string(), "0.7000");
    }

    #[test]
    fn test_grid_ratio() {
        let ratio = grid_ratio(dec!(0.70), dec!(0.60), 10).unwrap();
        assert!(ratio > dec!(1.01553) && ratio < dec!(1.01554));
    }

    #[test]
    fn test_levels_strictly_descending_within_range() {
        let levels = compute_levels(dec!(65000), dec!(20000), 37, dec!(0.1)).unwrap();

        assert!(levels.len() <= 38);
        assert_eq!(levels.first().unwrap().value(), dec!(65000.0));
        assert_eq!(levels.last().unwrap().value(), dec!(20000.0));
        for pair in levels.windows(2) {
            assert!(pair[0] > pair[1]);
        }
    }

    #[test]
    fn test_collapsed_levels_are_deduplicated() {
        // 1, 1.189, 1.414, 1.681, 2 取整后只剩 2 和 1
        let levels = compute_levels(dec!(2), dec!(1), 4, dec!(1)).unwrap();
        assert_eq!(values(&levels), vec![dec!(2), dec!(1)]);
    }

    #[test]
    fn test_endpoints_quantized_down() {
        let levels = compute_levels(dec!(0.70009), dec!(0.60004), 3, dec!(0.0001)).unwrap();
        assert_eq!(levels.first().unwrap().value(), dec!(0.7000));
        assert_eq!(levels.last().unwrap().value(), dec!(0.6000));
    }

    #[test]
    fn test_single_grid() {
        let levels = compute_levels(dec!(0.70), dec!(0.60), 1, dec!(0.0001)).unwrap();
        assert_eq!(values(&levels), vec![dec!(0.70), dec!(0.60)]);
    }

    #[test]
    fn test_over_fine_grid_collapses_to_ticks() {
        let levels = compute_levels(dec!(0.70), dec!(0.60), 2_000_000, dec!(0.0001)).unwrap();

        assert_eq!(levels.len(), 1001);
        assert_eq!(levels.first().unwrap().value(), dec!(0.7000));
        assert_eq!(levels.last().unwrap().value(), dec!(0.6000));
        for pair in levels.windows(2) {
            assert_eq!(pair[0].value() - pair[1].value(), dec!(0.0001));
        }
    }

    #[test]
    fn test_max_grid_count_stays_bounded() {
        let levels = compute_levels(dec!(0.70), dec!(0.60), u32::MAX, dec!(0.0001)).unwrap();
        assert_eq!(levels.len(), 1001);
    }

    #[test]
    fn test_partially_collapsed_grid() {
        // 1, 1.189, 1.414, 1.681, 2 间距都小于 1 tick，只剩落在不同 tick 上的档位
        let levels = compute_levels(dec!(2), dec!(1), 4, dec!(0.5)).unwrap();
        assert_eq!(values(&levels), vec![dec!(2), dec!(1.5), dec!(1)]);
    }

    #[test]
    fn test_invalid_ranges() {
        let cases = [
            (dec!(0.60), dec!(0.70), 10, dec!(0.0001)),
            (dec!(0.70), dec!(0.70), 10, dec!(0.0001)),
            (dec!(0.70), dec!(0.60), 0, dec!(0.0001)),
            (dec!(0.70), dec!(0), 10, dec!(0.0001)),
            (dec!(0.70), dec!(-0.1), 10, dec!(0.0001)),
            (dec!(0.70), dec!(0.60), 10, dec!(0)),
            (dec!(0.70), dec!(0.00001), 10, dec!(0.0001)),
        ];

        for (upper, lower, n, quantum) in cases {
            assert!(
                matches!(
                    compute_levels(upper, lower, n, quantum),
                    Err(GridError::InvalidRange(_))
                ),
                "upper={} lower={} n={} quantum={}",
                upper,
                lower,
                n,
                quantum
            );
        }
    }
}
