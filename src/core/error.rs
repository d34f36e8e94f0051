use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("网络请求错误: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("YAML配置错误: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("API错误: {code} - {message}")]
    ApiError { code: i32, message: String },

    #[error("认证错误: {0}")]
    AuthError(String),

    #[error("订单错误: {0}")]
    OrderError(String),

    #[error("速率限制: {0}")]
    RateLimitError(String, Option<u64>),

    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("参数验证错误: {field} - {reason}")]
    ValidationError { field: String, reason: String },

    #[error("数据解析错误: {0}")]
    ParseError(String),

    #[error("其他错误: {0}")]
    Other(String),
}

impl ExchangeError {
    /// 根据HTTP状态码和响应体构造错误
    ///
    /// 响应体形如 `{"code":-2011,"msg":"Unknown order sent."}` 时优先取 msg
    pub fn from_response(status: u16, body: &str) -> Self {
        #[derive(serde::Deserialize)]
        struct ApiErrorBody {
            code: Option<i64>,
            msg: Option<String>,
        }

        let message = match serde_json::from_str::<ApiErrorBody>(body) {
            Ok(ApiErrorBody {
                code: Some(code),
                msg: Some(msg),
            }) => format!("[{}] {}", code, msg),
            _ => body.to_string(),
        };

        match status {
            401 => ExchangeError::AuthError(message),
            418 | 429 => ExchangeError::RateLimitError(message, None),
            _ => ExchangeError::ApiError {
                code: status as i32,
                message,
            },
        }
    }

    /// 判断错误是否可以重试
    pub fn is_retryable(&self) -> bool {
        match self {
            ExchangeError::NetworkError(_) => true,
            ExchangeError::RateLimitError(_, _) => true,
            ExchangeError::ApiError { code, .. } => {
                // HTTP 5xx 错误通常可以重试
                *code >= 500 && *code < 600
            }
            _ => false,
        }
    }
}
