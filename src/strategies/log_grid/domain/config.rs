use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{config::ExchangeConfig, error::ExchangeError};
use crate::strategies::common::domain::config::require_symbol;
use crate::strategies::common::{PrecisionConfig, StrategyInfo};

use super::model::InstrumentSpec;

/// 对数网格策略的主配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogGridConfig {
    pub strategy: StrategyInfo,
    pub symbol: String,
    pub precision: PrecisionConfig,
    pub grid: GridConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub exchange: Option<ExchangeConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    pub upper_price: Decimal,
    pub lower_price: Decimal,
    pub num_grids: u32,
    /// 每个档位的下单数量
    pub quantity_per_grid: Decimal,
    /// 撤掉价格错误一侧的挂单（价格之上的买单、价格之下的卖单）
    #[serde(default)]
    pub cancel_stranded: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: u64,
    /// 两笔成功下单之间的间隔
    #[serde(default = "default_placement_delay_ms")]
    pub placement_delay_ms: u64,
    #[serde(default)]
    pub startup_cancel_all: bool,
    #[serde(default)]
    pub shutdown_cancel_all: bool,
}

fn default_check_interval_secs() -> u64 {
    60
}

fn default_placement_delay_ms() -> u64 {
    500
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: default_check_interval_secs(),
            placement_delay_ms: default_placement_delay_ms(),
            startup_cancel_all: false,
            shutdown_cancel_all: false,
        }
    }
}

impl LogGridConfig {
    /// 解析后校验；网格区间本身由网格计算统一校验
    pub fn validate(&self) -> Result<(), ExchangeError> {
        require_symbol(&self.symbol)?;
        self.precision.validate()?;

        if self.grid.quantity_per_grid <= Decimal::ZERO {
            return Err(ExchangeError::ValidationError {
                field: "grid.quantity_per_grid".to_string(),
                reason: format!("必须大于0: {}", self.grid.quantity_per_grid),
            });
        }
        if self.execution.check_interval_secs == 0 {
            return Err(ExchangeError::ValidationError {
                field: "execution.check_interval_secs".to_string(),
                reason: "检查间隔不能为0".to_string(),
            });
        }
        if let Some(exchange) = &self.exchange {
            exchange.validate()?;
        }
        Ok(())
    }

    pub fn instrument(&self) -> InstrumentSpec {
        InstrumentSpec {
            symbol: self.symbol.clone(),
            price_quantum: self.precision.price_quantum,
            quantity_quantum: self.precision.quantity_quantum,
            min_notional: self.precision.min_notional,
        }
    }

    pub fn exchange_config(&self) -> ExchangeConfig {
        self.exchange.clone().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const SAMPLE: &str = r#"
strategy:
  name: crv_log_grid
  log_level: debug
symbol: CRVUSDT
precision:
  price_quantum: "0.0001"
  quantity_quantum: "1"
grid:
  upper_price: "0.70"
  lower_price: "0.60"
  num_grids: 10
  quantity_per_grid: "10"
"#;

    #[test]
    fn test_parse_with_defaults() {
        let config: LogGridConfig = serde_yaml::from_str(SAMPLE).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.grid.upper_price, dec!(0.70));
        assert_eq!(config.grid.num_grids, 10);
        assert!(!config.grid.cancel_stranded);
        assert_eq!(config.execution.check_interval_secs, 60);
        assert!(!config.execution.startup_cancel_all);
        assert_eq!(config.strategy.log_level.as_deref(), Some("debug"));
        assert_eq!(config.exchange_config().name, "aster");

        let instrument = config.instrument();
        assert_eq!(instrument.symbol, "CRVUSDT");
        assert_eq!(instrument.price_quantum, dec!(0.0001));
    }

    #[test]
    fn test_validate_rejects_zero_quantity() {
        let mut config: LogGridConfig = serde_yaml::from_str(SAMPLE).unwrap();
        config.grid.quantity_per_grid = Decimal::ZERO;
        assert!(config.validate().is_err());

        config.grid.quantity_per_grid = dec!(10);
        config.symbol = " ".to_string();
        assert!(config.validate().is_err());
    }
}
