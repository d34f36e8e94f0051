//! 订单成交轮询
//!
//! 固定间隔查询订单状态，直到成交、被拒或达到最大次数

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{exchange::Exchange, types::OrderStatus};

/// 轮询参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PollConfig {
    /// 最多查询次数，0 表示不查询直接超时
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// 每次查询前的等待时间
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

fn default_max_attempts() -> u32 {
    10
}

fn default_interval_ms() -> u64 {
    1000
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            interval_ms: default_interval_ms(),
        }
    }
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// 轮询结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillOutcome {
    Filled,
    TimedOut,
    /// 订单进入终态但未成交（CANCELED / EXPIRED / REJECTED）
    Rejected(OrderStatus),
}

/// 等待订单成交
///
/// 每次先等待 `interval` 再查询；查询失败或非终态都继续轮询
pub async fn wait_for_fill(
    exchange: &dyn Exchange,
    symbol: &str,
    order_id: i64,
    poll: PollConfig,
) -> FillOutcome {
    for attempt in 1..=poll.max_attempts {
        tokio::time::sleep(poll.interval()).await;

        match exchange.get_order(symbol, order_id).await {
            Ok(order) if order.status == OrderStatus::Filled => {
                log::info!("✅ 订单 {} 已成交 (第{}次查询)", order_id, attempt);
                return FillOutcome::Filled;
            }
            Ok(order) if order.status.is_dead() => {
                log::warn!("⚠️ 订单 {} 未成交即终止: {}", order_id, order.status);
                return FillOutcome::Rejected(order.status);
            }
            Ok(order) => {
                log::debug!(
                    "订单 {} 状态 {} ({}/{})",
                    order_id,
                    order.status,
                    attempt,
                    poll.max_attempts
                );
            }
            Err(e) => {
                log::warn!(
                    "⚠️ 查询订单 {} 失败 ({}/{}): {}",
                    order_id,
                    attempt,
                    poll.max_attempts,
                    e
                );
            }
        }
    }

    log::warn!(
        "⏰ 订单 {} 在{}次查询内未成交",
        order_id,
        poll.max_attempts
    );
    FillOutcome::TimedOut
}
