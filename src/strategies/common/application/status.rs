use chrono::{DateTime, Utc};

/// 策略运行状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyState {
    Initializing,
    Running,
    Stopped,
}

/// 统一的策略状态结构
#[derive(Debug, Clone)]
pub struct StrategyStatus {
    pub name: String,
    pub state: StrategyState,
    pub started_at: Option<DateTime<Utc>>,
    /// 已完成的轮次（网格的 tick 或循环策略的迭代）
    pub rounds: u64,
    pub updated_at: DateTime<Utc>,
    pub last_error: Option<String>,
}

impl StrategyStatus {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: StrategyState::Initializing,
            started_at: None,
            rounds: 0,
            updated_at: Utc::now(),
            last_error: None,
        }
    }
}

impl std::fmt::Display for StrategyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{:?}] 已完成 {} 轮", self.name, self.state, self.rounds)?;
        if let Some(started_at) = self.started_at {
            let uptime = Utc::now() - started_at;
            write!(f, ", 运行 {}s", uptime.num_seconds())?;
        }
        if let Some(err) = &self.last_error {
            write!(f, ", 最近错误: {}", err)?;
        }
        Ok(())
    }
}

/// 策略内部的状态记录
pub struct StatusTracker {
    status: tokio::sync::RwLock<StrategyStatus>,
}

impl StatusTracker {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            status: tokio::sync::RwLock::new(StrategyStatus::new(name)),
        }
    }

    pub async fn mark_running(&self) {
        let mut status = self.status.write().await;
        status.state = StrategyState::Running;
        status.started_at = Some(Utc::now());
        status.updated_at = Utc::now();
    }

    pub async fn record_round(&self) {
        let mut status = self.status.write().await;
        status.rounds += 1;
        status.updated_at = Utc::now();
    }

    pub async fn record_error(&self, error: impl std::fmt::Display) {
        let mut status = self.status.write().await;
        status.last_error = Some(error.to_string());
        status.updated_at = Utc::now();
    }

    pub async fn mark(&self, state: StrategyState) {
        let mut status = self.status.write().await;
        status.state = state;
        status.updated_at = Utc::now();
    }

    pub async fn snapshot(&self) -> StrategyStatus {
        self.status.read().await.clone()
    }
}
