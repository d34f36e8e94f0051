use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::error::ExchangeError;

/// 策略基本信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyInfo {
    pub name: String,
    /// 日志级别，命令行参数优先
    #[serde(default)]
    pub log_level: Option<String>,
}

/// 交易对精度配置（不从交易所获取）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrecisionConfig {
    /// 价格最小变动单位，例如 0.0001
    pub price_quantum: Decimal,
    /// 数量最小变动单位，例如 1
    pub quantity_quantum: Decimal,
    #[serde(default)]
    pub min_notional: Option<Decimal>,
}

impl PrecisionConfig {
    pub fn validate(&self) -> Result<(), ExchangeError> {
        if self.price_quantum <= Decimal::ZERO {
            return Err(ExchangeError::ValidationError {
                field: "precision.price_quantum".to_string(),
                reason: format!("必须大于0: {}", self.price_quantum),
            });
        }
        if self.quantity_quantum <= Decimal::ZERO {
            return Err(ExchangeError::ValidationError {
                field: "precision.quantity_quantum".to_string(),
                reason: format!("必须大于0: {}", self.quantity_quantum),
            });
        }
        if let Some(min_notional) = self.min_notional {
            if min_notional < Decimal::ZERO {
                return Err(ExchangeError::ValidationError {
                    field: "precision.min_notional".to_string(),
                    reason: format!("不能为负数: {}", min_notional),
                });
            }
        }
        Ok(())
    }
}

pub(crate) fn require_symbol(symbol: &str) -> Result<(), ExchangeError> {
    if symbol.trim().is_empty() {
        return Err(ExchangeError::ValidationError {
            field: "symbol".to_string(),
            reason: "交易对不能为空".to_string(),
        });
    }
    Ok(())
}
