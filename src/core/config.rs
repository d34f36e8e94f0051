use crate::core::error::ExchangeError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;

pub const DEFAULT_BASE_URL: &str = "https://fapi.asterdex.com";

/// 交易所连接配置（策略配置文件中的 `exchange` 段，缺省时全部取默认值）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// 签名请求的有效时间窗口（毫秒）
    #[serde(default = "default_recv_window")]
    pub recv_window_ms: u64,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// 服务器时间重新同步间隔（秒）
    #[serde(default = "default_time_sync_interval")]
    pub time_sync_interval_secs: u64,
    /// 公共行情请求的最大重试次数
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// API密钥环境变量前缀，如 ASTER -> ASTER_API_KEY
    #[serde(default = "default_env_prefix")]
    pub env_prefix: String,
}

fn default_name() -> String {
    "aster".to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_recv_window() -> u64 {
    5000
}

fn default_timeout() -> u64 {
    30
}

fn default_time_sync_interval() -> u64 {
    300
}

fn default_max_retries() -> u32 {
    3
}

fn default_env_prefix() -> String {
    "ASTER".to_string()
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            base_url: default_base_url(),
            recv_window_ms: default_recv_window(),
            timeout_secs: default_timeout(),
            time_sync_interval_secs: default_time_sync_interval(),
            max_retries: default_max_retries(),
            env_prefix: default_env_prefix(),
        }
    }
}

impl ExchangeConfig {
    pub fn validate(&self) -> Result<(), ExchangeError> {
        if !self.base_url.starts_with("http") {
            return Err(ExchangeError::ValidationError {
                field: "exchange.base_url".to_string(),
                reason: format!("不是有效的HTTP地址: {}", self.base_url),
            });
        }
        if self.recv_window_ms == 0 || self.recv_window_ms > 60_000 {
            return Err(ExchangeError::ValidationError {
                field: "exchange.recv_window_ms".to_string(),
                reason: "必须在 1..=60000 之间".to_string(),
            });
        }
        Ok(())
    }
}

/// 从YAML文件加载任意配置
pub fn load_yaml<T: DeserializeOwned>(path: &str) -> Result<T, ExchangeError> {
    let contents = fs::read_to_string(path)
        .map_err(|e| ExchangeError::ConfigError(format!("读取配置文件失败 {}: {}", path, e)))?;

    let config: T = serde_yaml::from_str(&contents)?;
    Ok(config)
}

/// API密钥配置
#[derive(Clone)]
pub struct ApiKeys {
    pub api_key: String,
    pub api_secret: String,
}

impl std::fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeys")
            .field("api_key", &mask(&self.api_key))
            .field("api_secret", &"***")
            .finish()
    }
}

fn mask(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 8 {
        return "***".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}***{}", head, tail)
}

impl ApiKeys {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    /// 从环境变量加载API密钥
    pub fn from_env(prefix: &str) -> Result<Self, ExchangeError> {
        dotenv::dotenv().ok(); // 加载.env文件，忽略错误

        let prefix_upper = prefix.to_uppercase();

        let api_key = std::env::var(format!("{}_API_KEY", prefix_upper))
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                ExchangeError::ConfigError(format!("未找到{}_API_KEY环境变量", prefix_upper))
            })?;

        // 尝试两种格式的密钥名称
        let api_secret = std::env::var(format!("{}_SECRET_KEY", prefix_upper))
            .or_else(|_| std::env::var(format!("{}_API_SECRET", prefix_upper)))
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                ExchangeError::ConfigError(format!(
                    "未找到{}_SECRET_KEY或{}_API_SECRET环境变量",
                    prefix_upper, prefix_upper
                ))
            })?;

        Ok(ApiKeys {
            api_key,
            api_secret,
        })
    }
}
