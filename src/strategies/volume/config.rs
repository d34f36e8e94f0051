use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{config::ExchangeConfig, error::ExchangeError};
use crate::strategies::common::domain::config::require_symbol;
use crate::strategies::common::{PollConfig, StrategyInfo};

/// 市价买卖循环策略配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeConfig {
    pub strategy: StrategyInfo,
    pub symbol: String,
    /// 每笔市价单的固定数量
    pub quantity: Decimal,
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// 两个循环之间的间隔
    #[serde(default = "default_delay_secs")]
    pub delay_secs: u64,
    /// 成交轮询参数
    #[serde(default = "default_poll")]
    pub poll: PollConfig,
    #[serde(default)]
    pub exchange: Option<ExchangeConfig>,
}

fn default_iterations() -> u32 {
    5
}

fn default_delay_secs() -> u64 {
    5
}

fn default_poll() -> PollConfig {
    PollConfig {
        max_attempts: 20,
        interval_ms: 500,
    }
}

impl VolumeConfig {
    pub fn validate(&self) -> Result<(), ExchangeError> {
        require_symbol(&self.symbol)?;

        if self.quantity <= Decimal::ZERO {
            return Err(ExchangeError::ValidationError {
                field: "quantity".to_string(),
                reason: format!("必须大于0: {}", self.quantity),
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
