use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::core::exchange::Exchange;
use crate::strategies::common::{
    ShutdownSignal, StatusTracker, StrategyInstance, StrategyState, StrategyStatus,
};
use crate::strategies::log_grid::domain::{GridError, LogGridConfig, PriceLevel, TickReport};
use crate::strategies::log_grid::infrastructure::{compute_levels, reconcile, OrderIntentEmitter};

/// 对数网格策略
///
/// 启动时计算一次网格档位，之后每轮拉取价格和挂单，只补缺失的档位
pub struct LogGridStrategy {
    config: LogGridConfig,
    exchange: Arc<dyn Exchange>,
    levels: Vec<PriceLevel>,
    emitter: OrderIntentEmitter,
    status: StatusTracker,
}

impl LogGridStrategy {
    /// 校验配置并计算网格，区间非法时直接失败
    pub fn new(config: LogGridConfig, exchange: Arc<dyn Exchange>) -> Result<Self> {
        config.validate()?;

        let grid = &config.grid;
        let levels = compute_levels(
            grid.upper_price,
            grid.lower_price,
            grid.num_grids,
            config.precision.price_quantum,
        )?;

        let emitter = OrderIntentEmitter::new(config.instrument());
        let status = StatusTracker::new(config.strategy.name.clone());

        Ok(Self {
            config,
            exchange,
            levels,
            emitter,
            status,
        })
    }

    pub fn levels(&self) -> &[PriceLevel] {
        &self.levels
    }

    fn symbol(&self) -> &str {
        &self.config.symbol
    }

    fn log_levels(&self) {
        let expected = self.config.grid.num_grids as usize + 1;
        if self.levels.len() < expected {
            log::warn!(
                "[log_grid] ⚠️ 价格精度 {} 过粗，{} 个档位合并为 {} 个",
                self.config.precision.price_quantum,
                expected,
                self.levels.len()
            );
        }

        let listing: Vec<String> = self.levels.iter().map(|l| l.to_string()).collect();
        log::info!(
            "[log_grid] {} 网格 [{}, {}] 共 {} 档: {}",
            self.symbol(),
            self.config.grid.lower_price,
            self.config.grid.upper_price,
            self.levels.len(),
            listing.join(", ")
        );
    }

    /// 执行一轮对账与补单
    ///
    /// 取不到价格或挂单时返回 `TransportAbsent`，本轮不下任何单
    pub async fn tick(&self) -> Result<TickReport, GridError> {
        let symbol = self.symbol();

        let price = self
            .exchange
            .get_ticker_price(symbol)
            .await
            .map_err(|e| GridError::TransportAbsent(format!("获取 {} 价格失败: {}", symbol, e)))?;
        if price <= rust_decimal::Decimal::ZERO {
            return Err(GridError::Parse(format!("无效的价格: {}", price)));
        }

        let open_orders = self
            .exchange
            .get_open_orders(symbol)
            .await
            .map_err(|e| GridError::TransportAbsent(format!("获取 {} 挂单失败: {}", symbol, e)))?;

        log::info!(
            "[log_grid] {} 当前价格 {}，挂单 {} 个",
            symbol,
            price,
            open_orders.len()
        );

        let reconciliation = reconcile(
            price,
            &self.levels,
            &open_orders,
            self.config.precision.price_quantum,
        );

        for warning in &reconciliation.warnings {
            log::warn!(
                "[log_grid] ⚠️ 跳过无法解析的挂单 {}: {}",
                warning.order_id,
                warning.reason
            );
        }

        if !reconciliation.stranded.is_empty() {
            if self.config.grid.cancel_stranded {
                for stranded in &reconciliation.stranded {
                    match self.exchange.cancel_order(symbol, stranded.order_id).await {
                        Ok(_) => log::info!(
                            "[log_grid] 已撤销错位挂单 {} {} @ {}",
                            stranded.order_id,
                            stranded.side,
                            stranded.price
                        ),
                        Err(e) => log::warn!(
                            "[log_grid] ⚠️ 撤销错位挂单 {} 失败: {}",
                            stranded.order_id,
                            e
                        ),
                    }
                }
            } else {
                log::info!(
                    "[log_grid] 发现 {} 个错位挂单（价格之上的买单或之下的卖单），保持不动",
                    reconciliation.stranded.len()
                );
            }
        }

        let mut report = TickReport::default();
        if reconciliation.is_complete() {
            log::info!("[log_grid] ✅ 网格完整，无需补单");
            return Ok(report);
        }

        let quantity = self.config.grid.quantity_per_grid;
        let delay = Duration::from_millis(self.config.execution.placement_delay_ms);

        for placement in &reconciliation.placements {
            let intent = match self.emitter.emit(placement, quantity) {
                Ok(intent) => intent,
                Err(e) => {
                    log::warn!("[log_grid] ⚠️ 跳过档位 {}: {}", placement.level, e);
                    report.skipped += 1;
                    continue;
                }
            };

            match self.exchange.create_order(intent.to_request()).await {
                Ok(order) => {
                    log::info!(
                        "[log_grid] ✅ 挂单成功 {} {} @ {} 数量 {} (订单ID {})",
                        intent.symbol,
                        intent.side,
                        intent.price,
                        intent.quantity,
                        order.order_id
                    );
                    report.placed += 1;
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
                Err(e) => {
                    log::error!(
                        "[log_grid] ❌ 挂单失败 {} @ {}: {}",
                        intent.side,
                        intent.price,
                        e
                    );
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }
}

#[async_trait]
impl StrategyInstance for LogGridStrategy {
    async fn start(&self) -> Result<()> {
        self.log_levels();

        if self.config.execution.startup_cancel_all {
            self.exchange
                .cancel_all_orders(self.symbol())
                .await
                .map_err(|e| anyhow!("启动时撤销 {} 全部挂单失败: {}", self.symbol(), e))?;
            log::info!("[log_grid] 启动时已撤销 {} 全部挂单", self.symbol());
        }

        self.status.mark_running().await;
        Ok(())
    }

    async fn run(&self, shutdown: ShutdownSignal) -> Result<()> {
        let interval = Duration::from_secs(self.config.execution.check_interval_secs);

        while !shutdown.is_triggered() {
            match self.tick().await {
                Ok(report) => log::info!("[log_grid] 本轮完成: {}", report),
                Err(e) => {
                    log::warn!("[log_grid] ⚠️ 跳过本轮: {}", e);
                    self.status.record_error(&e).await;
                }
            }
            self.status.record_round().await;

            log::debug!("[log_grid] 等待 {}s 后进行下一轮", interval.as_secs());
            if !shutdown.sleep(interval).await {
                break;
            }
        }

        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        if self.config.execution.shutdown_cancel_all {
            match self.exchange.cancel_all_orders(self.symbol()).await {
                Ok(()) => log::info!("[log_grid] 停止时已撤销 {} 全部挂单", self.symbol()),
                Err(e) => {
                    log::warn!("[log_grid] 停止时撤销 {} 挂单失败: {}", self.symbol(), e);
                    self.status.record_error(&e).await;
                }
            }
        }

        self.status.mark(StrategyState::Stopped).await;
        Ok(())
    }

    async fn status(&self) -> Result<StrategyStatus> {
        Ok(self.status.snapshot().await)
    }
}
