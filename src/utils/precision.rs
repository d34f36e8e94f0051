//! 价格/数量精度处理
//!
//! 所有函数都按"最小变动单位"（quantum）取整，quantum 不必是 10 的幂

use rust_decimal::{Decimal, RoundingStrategy};

fn quantize_with(value: Decimal, quantum: Decimal, strategy: RoundingStrategy) -> Decimal {
    if quantum <= Decimal::ZERO {
        return value;
    }

    let steps = match value.checked_div(quantum) {
        Some(steps) => steps.round_dp_with_strategy(0, strategy),
        None => return value,
    };

    match steps.checked_mul(quantum) {
        Some(mut quantized) => {
            quantized.rescale(quantum.scale());
            quantized
        }
        None => value,
    }
}

/// 向零取整到 quantum 的整数倍（正数即向下取整，永远不会变大）
pub fn quantize_down(value: Decimal, quantum: Decimal) -> Decimal {
    quantize_with(value, quantum, RoundingStrategy::ToZero)
}

/// 取最近的 quantum 整数倍，恰在中点时取偶数倍
pub fn quantize_nearest(value: Decimal, quantum: Decimal) -> Decimal {
    quantize_with(value, quantum, RoundingStrategy::MidpointNearestEven)
}

/// 四舍五入到 quantum 的整数倍
pub fn quantize_half_up(value: Decimal, quantum: Decimal) -> Decimal {
    quantize_with(value, quantum, RoundingStrategy::MidpointAwayFromZero)
}
