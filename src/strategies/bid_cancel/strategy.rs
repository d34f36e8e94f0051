use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use crate::core::{
    error::ExchangeError,
    exchange::Exchange,
    types::{BookTicker, OrderSide},
};
use crate::strategies::common::{
    ShutdownSignal, StatusTracker, StrategyInstance, StrategyState, StrategyStatus,
};

use super::config::BidCancelConfig;
use super::quote::build_quote;

/// 单轮汇总
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IterationReport {
    pub placed: usize,
    pub cancelled: usize,
}

/// 盘口挂撤单策略：每轮在买一/卖一内侧各挂一笔限价单，随后撤掉
pub struct BidCancelStrategy {
    config: BidCancelConfig,
    exchange: Arc<dyn Exchange>,
    status: StatusTracker,
}

impl BidCancelStrategy {
    pub fn new(config: BidCancelConfig, exchange: Arc<dyn Exchange>) -> Result<Self> {
        config.validate()?;
        let status = StatusTracker::new(config.strategy.name.clone());
        Ok(Self {
            config,
            exchange,
            status,
        })
    }

    /// 挂一笔报价单，只有 NEW / PARTIALLY_FILLED 的订单才返回订单ID
    async fn place_quote(&self, side: OrderSide, book: &BookTicker) -> Option<i64> {
        let request = match build_quote(
            &self.config.symbol,
            side,
            book,
            self.config.order.usdt_amount,
            self.config.order.price_offset_ticks,
            &self.config.precision,
        ) {
            Ok(request) => request,
            Err(e) => {
                log::warn!("[bid_cancel] ⚠️ 跳过{}单: {}", side, e);
                return None;
            }
        };

        log::info!(
            "[bid_cancel] 挂{}单 {} @ {} (偏移 {} tick, 约 {} USDT)",
            side,
            request.quantity,
            request.price.unwrap_or_default(),
            self.config.order.price_offset_ticks,
            self.config.order.usdt_amount
        );

        match self.exchange.create_order(request).await {
            Ok(order) if order.status.is_live() => {
                log::info!(
                    "[bid_cancel] ✅ {}单已挂出 (订单ID {}, 状态 {})",
                    side,
                    order.order_id,
                    order.status
                );
                Some(order.order_id)
            }
            Ok(order) => {
                log::warn!(
                    "[bid_cancel] ⚠️ {}单已提交但状态为 {} (订单ID {})",
                    side,
                    order.status,
                    order.order_id
                );
                None
            }
            Err(e) => {
                log::error!("[bid_cancel] ❌ {}单下单失败: {}", side, e);
                None
            }
        }
    }

    async fn log_open_orders(&self) {
        match self.exchange.get_open_orders(&self.config.symbol).await {
            Ok(orders) if orders.is_empty() => {
                log::info!("[bid_cancel] {} 当前无挂单", self.config.symbol);
            }
            Ok(orders) => {
                log::info!("[bid_cancel] {} 当前挂单 {} 个:", self.config.symbol, orders.len());
                for order in orders {
                    log::info!(
                        "  - ID: {}, 方向: {}, 价格: {}, 数量: {}, 状态: {}",
                        order.order_id,
                        order.side,
                        order.price.as_deref().unwrap_or("-"),
                        order.orig_qty.as_deref().unwrap_or("-"),
                        order.status
                    );
                }
            }
            Err(e) => log::warn!("[bid_cancel] ⚠️ 获取挂单失败: {}", e),
        }
    }

    /// 执行一轮：取盘口 → 挂买卖单 → 可选查看挂单 → 等待 → 撤单
    pub async fn run_iteration(&self) -> Result<IterationReport, ExchangeError> {
        let book = self.exchange.get_book_ticker(&self.config.symbol).await?;
        log::info!(
            "[bid_cancel] 当前盘口: 买一 {}, 卖一 {}",
            book.bid_price,
            book.ask_price
        );

        let mut placed = Vec::with_capacity(2);
        for side in [OrderSide::Buy, OrderSide::Sell] {
            if let Some(order_id) = self.place_quote(side, &book).await {
                placed.push((side, order_id));
            }
        }

        if self.config.execution.monitor_orders {
            self.log_open_orders().await;
        }

        let cancel_delay = Duration::from_millis(self.config.execution.cancel_delay_ms);
        if !cancel_delay.is_zero() {
            tokio::time::sleep(cancel_delay).await;
        }

        let mut report = IterationReport {
            placed: placed.len(),
            cancelled: 0,
        };
        for (side, order_id) in placed {
            match self.exchange.cancel_order(&self.config.symbol, order_id).await {
                Ok(order) => {
                    log::info!(
                        "[bid_cancel] 已撤销{}单 {} (状态 {})",
                        side,
                        order_id,
                        order.status
                    );
                    report.cancelled += 1;
                }
                Err(e) => log::error!("[bid_cancel] ❌ 撤销{}单 {} 失败: {}", side, order_id, e),
            }
        }

        Ok(report)
    }
}

#[async_trait]
impl StrategyInstance for BidCancelStrategy {
    async fn start(&self) -> Result<()> {
        log::info!(
            "[bid_cancel] 启动 {}: 每单 {} USDT, 偏移 {} tick ({}), 共 {} 轮, 间隔 {}s",
            self.config.symbol,
            self.config.order.usdt_amount,
            self.config.order.price_offset_ticks,
            self.config.precision.price_quantum
                * rust_decimal::Decimal::from(self.config.order.price_offset_ticks),
            self.config.execution.iterations,
            self.config.execution.delay_secs
        );
        self.status.mark_running().await;
        Ok(())
    }

    async fn run(&self, shutdown: ShutdownSignal) -> Result<()> {
        let iterations = self.config.execution.iterations;
        let delay = Duration::from_secs(self.config.execution.delay_secs);

        for i in 1..=iterations {
            if shutdown.is_triggered() {
                break;
            }
            log::info!("[bid_cancel] --- 第 {}/{} 轮 ---", i, iterations);

            match self.run_iteration().await {
                Ok(report) => log::info!(
                    "[bid_cancel] 第 {} 轮完成: 挂单 {}, 撤单 {}",
                    i,
                    report.placed,
                    report.cancelled
                ),
                Err(e) => {
                    log::warn!("[bid_cancel] ⚠️ 获取盘口失败，跳过本轮: {}", e);
                    self.status.record_error(&e).await;
                }
            }
            self.status.record_round().await;

            if i < iterations && !shutdown.sleep(delay).await {
                break;
            }
        }

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
