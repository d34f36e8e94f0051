use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use crate::core::{
    exchange::Exchange,
    types::{OrderRequest, OrderSide},
};
use crate::strategies::common::{
    wait_for_fill, FillOutcome, ShutdownSignal, StatusTracker, StrategyInstance, StrategyState,
    StrategyStatus,
};

use super::config::VolumeConfig;

/// 单个买卖循环的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Completed,
    /// 市价买单提交失败
    BuyFailed,
    /// 买单未成交，不再卖出
    BuyNotFilled(FillOutcome),
    SellFailed,
    SellNotFilled(FillOutcome),
}

impl CycleOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, CycleOutcome::Completed)
    }
}

/// 市价买入后等待成交，再市价卖出同样数量
pub struct VolumeStrategy {
    config: VolumeConfig,
    exchange: Arc<dyn Exchange>,
    status: StatusTracker,
}

impl VolumeStrategy {
    pub fn new(config: VolumeConfig, exchange: Arc<dyn Exchange>) -> Result<Self> {
        config.validate()?;
        let status = StatusTracker::new(config.strategy.name.clone());
        Ok(Self {
            config,
            exchange,
            status,
        })
    }

    /// 提交市价单并等待成交；提交失败返回 None
    async fn market_and_wait(&self, side: OrderSide) -> Option<FillOutcome> {
        let symbol = &self.config.symbol;
        let request = OrderRequest::market(symbol, side, self.config.quantity);

        log::info!("[volume] 提交市价{}单 {} {}", side, self.config.quantity, symbol);
        let order = match self.exchange.create_order(request).await {
            Ok(order) => order,
            Err(e) => {
                log::error!("[volume] ❌ 市价{}单提交失败: {}", side, e);
                return None;
            }
        };
        log::info!(
            "[volume] 市价{}单已提交 (订单ID {}, 状态 {})",
            side,
            order.order_id,
            order.status
        );

        Some(wait_for_fill(self.exchange.as_ref(), symbol, order.order_id, self.config.poll).await)
    }

    /// 执行一个买入-卖出循环
    pub async fn run_cycle(&self) -> CycleOutcome {
        match self.market_and_wait(OrderSide::Buy).await {
            None => return CycleOutcome::BuyFailed,
            Some(FillOutcome::Filled) => {}
            Some(outcome) => {
                log::warn!("[volume] ⚠️ 买单未成交 ({:?})，跳过卖出", outcome);
                return CycleOutcome::BuyNotFilled(outcome);
            }
        }

        match self.market_and_wait(OrderSide::Sell).await {
            None => CycleOutcome::SellFailed,
            Some(FillOutcome::Filled) => CycleOutcome::Completed,
            Some(outcome) => {
                log::warn!("[volume] ⚠️ 卖单未成交 ({:?})，持仓可能残留", outcome);
                CycleOutcome::SellNotFilled(outcome)
            }
        }
    }
}

#[async_trait]
impl StrategyInstance for VolumeStrategy {
    async fn start(&self) -> Result<()> {
        log::info!(
            "[volume] 启动 {}: 每笔 {}, 共 {} 轮, 间隔 {}s",
            self.config.symbol,
            self.config.quantity,
            self.config.iterations,
            self.config.delay_secs
        );
        self.status.mark_running().await;
        Ok(())
    }

    async fn run(&self, shutdown: ShutdownSignal) -> Result<()> {
        let iterations = self.config.iterations;
        let delay = Duration::from_secs(self.config.delay_secs);
        let mut completed = 0u32;

        for i in 1..=iterations {
            if shutdown.is_triggered() {
                break;
            }
            log::info!("[volume] --- 第 {}/{} 轮 ---", i, iterations);

            let outcome = self.run_cycle().await;
            if outcome.is_completed() {
                completed += 1;
                log::info!("[volume] ✅ 第 {} 轮买卖完成", i);
            } else {
                log::warn!("[volume] ⚠️ 第 {} 轮未完成: {:?}", i, outcome);
                self.status
                    .record_error(format!("第 {} 轮: {:?}", i, outcome))
                    .await;
            }
            self.status.record_round().await;

            if i < iterations && !shutdown.sleep(delay).await {
                break;
            }
        }

        log::info!("[volume] 完成 {}/{} 轮买卖", completed, iterations);
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.status.mark(StrategyState::Stopped).await;
        Ok(())
    }

    async fn status(&self) -> Result<StrategyStatus> {
        Ok(self.status.snapshot().await)
    }
}
