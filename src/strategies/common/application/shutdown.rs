use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

/// 停止信号，可克隆后分发给策略循环
#[derive(Clone)]
pub struct ShutdownSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// 等待收到停止信号
    pub async fn triggered(&self) {
        let mut rx = self.tx.subscribe();
        loop {
            let stopped = *rx.borrow_and_update();
            if stopped {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// 可中断的休眠，完整睡完返回 true，被停止信号打断返回 false
    pub async fn sleep(&self, duration: Duration) -> bool {
        if self.is_triggered() {
            return false;
        }

        tokio::select! {
            _ = tokio::time::sleep(duration) => true,
            _ = self.triggered() => false,
        }
    }

    /// 收到 Ctrl-C 时触发停止信号
    pub fn listen_ctrl_c(&self) {
        let signal = self.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    log::info!("收到停止信号，正在关闭策略...");
                    signal.trigger();
                }
                Err(e) => log::error!("❌ 监听 Ctrl-C 失败: {}", e),
            }
        });
    }
}
