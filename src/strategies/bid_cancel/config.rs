use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{config::ExchangeConfig, error::ExchangeError};
use crate::strategies::common::domain::config::require_symbol;
use crate::strategies::common::{PrecisionConfig, StrategyInfo};

/// 盘口挂撤单策略配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BidCancelConfig {
    pub strategy: StrategyInfo,
    pub symbol: String,
    pub precision: PrecisionConfig,
    pub order: QuoteConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub exchange: Option<ExchangeConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteConfig {
    /// 每笔订单的目标名义金额（USDT）
    pub usdt_amount: Decimal,
    /// 从买一/卖一向盘口内侧偏移的 tick 数
    #[serde(default = "default_price_offset_ticks")]
    pub price_offset_ticks: u32,
}

fn default_price_offset_ticks() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// 两轮之间的间隔
    #[serde(default = "default_delay_secs")]
    pub delay_secs: u64,
    /// 撤单前打印当前挂单
    #[serde(default = "default_monitor_orders")]
    pub monitor_orders: bool,
    /// 下单后到撤单前的等待
    #[serde(default = "default_cancel_delay_ms")]
    pub cancel_delay_ms: u64,
}

fn default_iterations() -> u32 {
    5
}

fn default_delay_secs() -> u64 {
    2
}

fn default_monitor_orders() -> bool {
    true
}

fn default_cancel_delay_ms() -> u64 {
    500
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            delay_secs: default_delay_secs(),
            monitor_orders: default_monitor_orders(),
            cancel_delay_ms: default_cancel_delay_ms(),
        }
    }
}

impl BidCancelConfig {
    pub fn validate(&self) -> Result<(), ExchangeError> {
        require_symbol(&self.symbol)?;
        self.precision.validate()?;

        if self.order.usdt_amount <= Decimal::ZERO {
            return Err(ExchangeError::ValidationError {
                field: "order.usdt_amount".to_string(),
                reason: format!("必须大于0: {}", self.order.usdt_amount),
            });
        }
        if let Some(exchange) = &self.exchange {
            exchange.validate()?;
        }
        Ok(())
    }

    pub fn exchange_config(&self) -> ExchangeConfig {
        self.exchange.clone().unwrap_or_default()
    }
}
