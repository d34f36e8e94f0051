//! 时间同步模块
//!
//! 用于与交易所服务器同步时间，减少签名请求的时间戳错误

use crate::core::{error::ExchangeError, exchange::Exchange};
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

/// 时间同步管理器
pub struct TimeSyncManager {
    /// 时间偏移量（毫秒）
    time_offset_ms: RwLock<i64>,
    /// 最后同步时间，None 表示从未同步
    last_sync: RwLock<Option<DateTime<Utc>>>,
    /// 同步间隔（秒）
    sync_interval_secs: u64,
}

impl TimeSyncManager {
    /// 创建时间同步管理器
    pub fn new(sync_interval_secs: u64) -> Self {
        Self {
            time_offset_ms: RwLock::new(0),
            last_sync: RwLock::new(None),
            sync_interval_secs,
        }
    }

    /// 同步时间
    pub async fn sync_with_exchange(&self, exchange: &dyn Exchange) -> Result<i64, ExchangeError> {
        let start_time = Utc::now();

        // 获取服务器时间
        let server_time = exchange.get_server_time().await?;

        let end_time = Utc::now();
        let offset_ms = self.record(server_time, start_time, end_time).await;

        log::debug!(
            "⏰ 时间同步完成: 服务器时间 {}, 偏移 {}ms",
            server_time.format("%Y-%m-%d %H:%M:%S%.3f"),
            offset_ms
        );

        // 如果时间偏差超过1秒，发出警告
        if offset_ms.abs() > 1000 {
            log::warn!("⚠️ 系统时间与服务器相差 {}ms，建议同步系统时间", offset_ms);
        }

        Ok(offset_ms)
    }

    /// 记录一次服务器时间采样，返回新的偏移量
    pub async fn record(
        &self,
        server_time: DateTime<Utc>,
        request_start: DateTime<Utc>,
        request_end: DateTime<Utc>,
    ) -> i64 {
        // 假设网络延迟对称，取中点
        let local_time = request_start + (request_end - request_start) / 2;
        let offset_ms = server_time.timestamp_millis() - local_time.timestamp_millis();

        *self.time_offset_ms.write().await = offset_ms;
        *self.last_sync.write().await = Some(Utc::now());
        offset_ms
    }

    /// 获取调整后的时间戳（毫秒）
    pub async fn get_adjusted_timestamp(&self) -> i64 {
        let offset = *self.time_offset_ms.read().await;
        Utc::now().timestamp_millis() + offset
    }

    /// 检查是否需要重新同步
    pub async fn needs_sync(&self) -> bool {
        match *self.last_sync.read().await {
            None => true,
            Some(last_sync) => {
                let elapsed = Utc::now() - last_sync;
                elapsed.num_seconds() >= self.sync_interval_secs as i64
            }
        }
    }

    /// 获取时间偏移量
    pub async fn get_offset_ms(&self) -> i64 {
        *self.time_offset_ms.read().await
    }
}
