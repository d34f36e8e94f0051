use anyhow::Result;
use async_trait::async_trait;

use super::{shutdown::ShutdownSignal, status::StrategyStatus};

#[async_trait]
pub trait StrategyInstance: Send + Sync {
    /// 启动准备（校验、预计算、可选的撤单）
    async fn start(&self) -> Result<()>;
    /// 主循环，直到完成全部轮次或收到停止信号
    async fn run(&self, shutdown: ShutdownSignal) -> Result<()>;
    /// 收尾清理
    async fn stop(&self) -> Result<()>;
    async fn status(&self) -> Result<StrategyStatus>;
}

/// 按 start → run → stop 的顺序驱动策略；run 出错时仍会执行 stop
pub async fn run_to_completion(
    strategy: &dyn StrategyInstance,
    shutdown: ShutdownSignal,
) -> Result<()> {
    strategy.start().await?;

    let outcome = strategy.run(shutdown).await;
    if let Err(e) = &outcome {
        log::error!("❌ 策略运行出错: {:#}", e);
    }

    strategy.stop().await?;
    let status = strategy.status().await?;
    log::info!("策略已停止: {}", status);

    outcome
}
