use crate::core::error::ExchangeError;
use async_trait::async_trait;
/// 智能重试策略
use std::time::Duration;
use tokio::time::sleep;

/// 重试策略配置
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// 最大重试次数
    pub max_retries: u32,
    /// 初始延迟（毫秒）
    pub initial_delay_ms: u64,
    /// 最大延迟（毫秒）
    pub max_delay_ms: u64,
    /// 指数退避因子
    pub backoff_factor: f64,
    /// 是否添加抖动
    pub jitter: bool,
    /// 可重试的错误类型
    pub retryable_errors: Vec<RetryableError>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 100,
            max_delay_ms: 10000,
            backoff_factor: 2.0,
            jitter: true,
            retryable_errors: vec![
                RetryableError::NetworkError,
                RetryableError::Timeout,
                RetryableError::RateLimit,
                RetryableError::ServerError,
            ],
        }
    }
}

/// 可重试的错误类型
#[derive(Debug, Clone, PartialEq)]
pub enum RetryableError {
    NetworkError,
    Timeout,
    RateLimit,
    ServerError,
}

impl RetryableError {
    /// 错误归类，不可重试的错误返回 None
    fn classify(error: &ExchangeError) -> Option<Self> {
        match error {
            ExchangeError::NetworkError(e) if e.is_timeout() => Some(RetryableError::Timeout),
            ExchangeError::NetworkError(_) => Some(RetryableError::NetworkError),
            ExchangeError::RateLimitError(_, _) => Some(RetryableError::RateLimit),
            ExchangeError::ApiError { .. } if error.is_retryable() => {
                Some(RetryableError::ServerError)
            }
            _ => None,
        }
    }
}

/// 重试策略trait
#[async_trait]
pub trait RetryPolicy: Send + Sync {
    /// 判断是否应该重试
    fn should_retry(&self, error: &ExchangeError, attempt: u32) -> bool;

    /// 计算重试延迟
    fn calculate_delay(&self, attempt: u32) -> Duration;

    /// 执行带重试的操作
    async fn execute_with_retry<F, T, Fut>(&self, operation: F) -> Result<T, ExchangeError>
    where
        F: Fn() -> Fut + Send + Sync,
        Fut: std::future::Future<Output = Result<T, ExchangeError>> + Send,
        T: Send;
}

/// 指数退避重试策略
#[derive(Debug, Clone)]
pub struct ExponentialBackoffRetry {
    config: RetryConfig,
}

impl ExponentialBackoffRetry {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// 交易所给出 Retry-After 时以其为准，但不超过 `max_delay_ms`
    fn retry_delay(&self, error: &ExchangeError, attempt: u32) -> Duration {
        match error {
            ExchangeError::RateLimitError(_, Some(secs)) => {
                let cap = Duration::from_millis(self.config.max_delay_ms);
                Duration::from_secs(*secs).min(cap)
            }
            _ => self.calculate_delay(attempt),
        }
    }

    /// 判断错误是否可重试
    fn is_retryable_error(&self, error: &ExchangeError) -> bool {
        RetryableError::classify(error)
            .map(|kind| self.config.retryable_errors.contains(&kind))
            .unwrap_or(false)
    }
}

#[async_trait]
impl RetryPolicy for ExponentialBackoffRetry {
    fn should_retry(&self, error: &ExchangeError, attempt: u32) -> bool {
        if attempt >= self.config.max_retries {
            return false;
        }

        self.is_retryable_error(error)
    }

    fn calculate_delay(&self, attempt: u32) -> Duration {
        let base_delay =
            self.config.initial_delay_ms as f64 * self.config.backoff_factor.powi(attempt as i32);

        let mut delay_ms = base_delay.min(self.config.max_delay_ms as f64) as u64;

        // 添加抖动以避免雷同重试
        if self.config.jitter && delay_ms > 0 {
            use rand::Rng;
            let mut rng = rand::thread_rng();
            let jitter = rng.gen_range(0..=delay_ms / 4);
            delay_ms += jitter;
        }

        Duration::from_millis(delay_ms)
    }

    async fn execute_with_retry<F, T, Fut>(&self, operation: F) -> Result<T, ExchangeError>
    where
        F: Fn() -> Fut + Send + Sync,
        Fut: std::future::Future<Output = Result<T, ExchangeError>> + Send,
        T: Send,
    {
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => {
                    if attempt > 0 {
                        log::info!("✅ 操作在第{}次尝试后成功", attempt + 1);
                    }
                    return Ok(result);
                }
                Err(error) => {
                    if !self.should_retry(&error, attempt) {
                        return Err(error);
                    }

                    let delay = self.retry_delay(&error, attempt);
                    log::warn!(
                        "⚠️ 操作失败，将在{:.2}秒后重试 (尝试 {}/{}): {}",
                        delay.as_secs_f64(),
                        attempt + 1,
                        self.config.max_retries,
                        error
                    );

                    attempt += 1;

                    sleep(delay).await;
                }
            }
        }
    }
}
