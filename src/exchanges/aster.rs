use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::{
    config::{ApiKeys, ExchangeConfig},
    error::ExchangeError,
    exchange::{BaseExchange, Exchange},
    retry_policy::{ExponentialBackoffRetry, RetryConfig, RetryPolicy},
    types::*,
};
use crate::utils::{SignatureHelper, TimeSyncManager};

const ORDER_ENDPOINT: &str = "/fapi/v1/order";

/// AsterDEX 期货交易所实现（Binance fapi 兼容接口）
#[derive(Clone)]
pub struct AsterExchange {
    base: BaseExchange,
    /// 服务器时间偏移，签名请求的 timestamp 以此校正
    time_sync: Arc<TimeSyncManager>,
    /// 公共行情请求的重试策略，下单/撤单不重试
    public_retry: ExponentialBackoffRetry,
}

impl AsterExchange {
    /// 创建交易所实例
    pub fn new(config: ExchangeConfig, api_keys: ApiKeys) -> Result<Self> {
        config.validate()?;
        let time_sync = Arc::new(TimeSyncManager::new(config.time_sync_interval_secs));
        let public_retry = ExponentialBackoffRetry::new(RetryConfig {
            max_retries: config.max_retries,
            ..Default::default()
        });
        let base = BaseExchange::new(config, api_keys)?;

        log::info!(
            "创建 {} 交易所实例: {}",
            base.name,
            base.config.base_url
        );

        Ok(Self {
            base,
            time_sync,
            public_retry,
        })
    }

    /// 从环境变量加载密钥并创建实例
    pub fn from_env(config: ExchangeConfig) -> Result<Self> {
        let api_keys = ApiKeys::from_env(&config.env_prefix)?;
        Self::new(config, api_keys)
    }

    /// 到期则重新同步服务器时间；失败时沿用旧偏移
    async fn ensure_time_synced(&self) {
        if !self.time_sync.needs_sync().await {
            return;
        }

        if let Err(e) = self.time_sync.sync_with_exchange(self).await {
            log::warn!(
                "同步{}服务器时间失败: {}，使用偏移 {}ms",
                self.base.name,
                e,
                self.time_sync.get_offset_ms().await
            );
        }
    }

    /// 发送认证请求
    async fn send_signed_request<T>(
        &self,
        method: Method,
        endpoint: &str,
        mut params: BTreeMap<String, String>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.ensure_time_synced().await;

        let timestamp = self.time_sync.get_adjusted_timestamp().await;
        params.insert("timestamp".to_string(), timestamp.to_string());
        params.insert(
            "recvWindow".to_string(),
            self.base.config.recv_window_ms.to_string(),
        );

        // 所有参数（包括签名）都放在查询串中，请求体为空
        let final_query = SignatureHelper::signed_query(&self.base.api_keys.api_secret, &params);
        let url = format!("{}{}?{}", self.base.config.base_url, endpoint, final_query);

        log::debug!("发送签名请求: {} {} {:?}", method, endpoint, params);

        let response = self
            .base
            .client
            .request(method, &url)
            .header("X-MBX-APIKEY", &self.base.api_keys.api_key)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// 发送公共请求（带重试）
    async fn send_public_request<T>(
        &self,
        endpoint: &str,
        params: BTreeMap<String, String>,
    ) -> Result<T>
    where
        T: DeserializeOwned + Send,
    {
        let mut url = format!("{}{}", self.base.config.base_url, endpoint);
        if !params.is_empty() {
            url = format!("{}?{}", url, SignatureHelper::build_query_string(&params));
        }

        let url = url.as_str();
        self.public_retry
            .execute_with_retry(|| async move {
                let response = self.base.client.get(url).send().await?;
                Self::handle_response::<T>(response).await
            })
            .await
    }

    async fn handle_response<T>(response: reqwest::Response) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        if status.is_success() {
            let data = response.json::<T>().await?;
            return Ok(data);
        }

        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "未知错误".to_string());

        match ExchangeError::from_response(status.as_u16(), &error_text) {
            ExchangeError::RateLimitError(message, None) => {
                log::warn!("⚠️ 触发限频 (HTTP {}): {}", status.as_u16(), message);
                Err(ExchangeError::RateLimitError(message, retry_after))
            }
            other => Err(other),
        }
    }

    fn symbol_params(symbol: &str) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        params.insert("symbol".to_string(), symbol.to_string());
        params
    }
}

/// 下单请求参数（不含 timestamp/recvWindow/signature）
pub fn order_params(order_request: &OrderRequest) -> Result<BTreeMap<String, String>> {
    if order_request.quantity <= Decimal::ZERO {
        return Err(ExchangeError::ValidationError {
            field: "quantity".to_string(),
            reason: format!("数量必须大于0: {}", order_request.quantity),
        });
    }

    let mut params = AsterExchange::symbol_params(&order_request.symbol);
    params.insert("side".to_string(), order_request.side.as_str().to_string());
    params.insert(
        "type".to_string(),
        order_request.order_type.as_str().to_string(),
    );
    params.insert("quantity".to_string(), order_request.quantity.to_string());

    match order_request.order_type {
        OrderType::Limit => {
            let price = order_request.price.ok_or_else(|| ExchangeError::ValidationError {
                field: "price".to_string(),
                reason: "限价单必须指定价格".to_string(),
            })?;
            params.insert("price".to_string(), price.to_string());
            params.insert("timeInForce".to_string(), "GTC".to_string());
        }
        OrderType::Market => {}
        OrderType::Other => {
            return Err(ExchangeError::OrderError("不支持的订单类型".to_string()));
        }
    }

    Ok(params)
}

#[async_trait]
impl Exchange for AsterExchange {
    fn name(&self) -> &str {
        &self.base.name
    }

    async fn get_server_time(&self) -> Result<DateTime<Utc>> {
        #[derive(Deserialize)]
        struct ServerTime {
            #[serde(rename = "serverTime")]
            server_time: i64,
        }

        let time: ServerTime = self
            .send_public_request("/fapi/v1/time", BTreeMap::new())
            .await?;

        DateTime::from_timestamp_millis(time.server_time).ok_or_else(|| {
            ExchangeError::ParseError(format!("无效的服务器时间: {}", time.server_time))
        })
    }

    async fn get_ticker_price(&self, symbol: &str) -> Result<Decimal> {
        let ticker: TickerPrice = self
            .send_public_request("/fapi/v1/ticker/price", Self::symbol_params(symbol))
            .await?;
        Ok(ticker.price)
    }

    async fn get_book_ticker(&self, symbol: &str) -> Result<BookTicker> {
        self.send_public_request("/fapi/v1/ticker/bookTicker", Self::symbol_params(symbol))
            .await
    }

    async fn create_order(&self, order_request: OrderRequest) -> Result<Order> {
        let params = order_params(&order_request)?;
        self.send_signed_request(Method::POST, ORDER_ENDPOINT, params)
            .await
    }

    async fn cancel_order(&self, symbol: &str, order_id: i64) -> Result<Order> {
        let mut params = Self::symbol_params(symbol);
        params.insert("orderId".to_string(), order_id.to_string());

        self.send_signed_request(Method::DELETE, ORDER_ENDPOINT, params)
            .await
    }

    async fn cancel_all_orders(&self, symbol: &str) -> Result<()> {
        #[derive(Deserialize)]
        struct CancelAllResponse {
            code: i64,
            #[serde(default)]
            msg: String,
        }

        let response: CancelAllResponse = self
            .send_signed_request(
                Method::DELETE,
                "/fapi/v1/allOpenOrders",
                Self::symbol_params(symbol),
            )
            .await?;

        if response.code == 200 {
            Ok(())
        } else {
            Err(ExchangeError::ApiError {
                code: response.code as i32,
                message: response.msg,
            })
        }
    }

    async fn get_order(&self, symbol: &str, order_id: i64) -> Result<Order> {
        let mut params = Self::symbol_params(symbol);
        params.insert("orderId".to_string(), order_id.to_string());

        self.send_signed_request(Method::GET, ORDER_ENDPOINT, params)
            .await
    }

    async fn get_open_orders(&self, symbol: &str) -> Result<Vec<OpenOrder>> {
        self.send_signed_request(
            Method::GET,
            "/fapi/v1/openOrders",
            Self::symbol_params(symbol),
        )
        .await
    }
}
