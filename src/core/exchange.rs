use crate::core::{
    config::{ApiKeys, ExchangeConfig},
    error::ExchangeError,
    types::{BookTicker, OpenOrder, Order, OrderRequest, Result},
};
use async_trait::async_trait;
use rust_decimal::Decimal;

/// 交易所通用接口trait
///
/// 策略只依赖此接口，所有网络I/O、签名和重试都在实现内部完成
#[async_trait]
pub trait Exchange: Send + Sync {
    /// 获取交易所名称
    fn name(&self) -> &str;

    /// 获取服务器时间
    async fn get_server_time(&self) -> Result<chrono::DateTime<chrono::Utc>>;

    /// 获取最新成交价
    async fn get_ticker_price(&self, symbol: &str) -> Result<Decimal>;

    /// 获取最优买卖价
    async fn get_book_ticker(&self, symbol: &str) -> Result<BookTicker>;

    /// 创建订单
    async fn create_order(&self, order_request: OrderRequest) -> Result<Order>;

    /// 取消订单
    async fn cancel_order(&self, symbol: &str, order_id: i64) -> Result<Order>;

    /// 取消交易对的全部挂单
    async fn cancel_all_orders(&self, symbol: &str) -> Result<()>;

    /// 获取订单状态
    async fn get_order(&self, symbol: &str, order_id: i64) -> Result<Order>;

    /// 获取活跃订单
    async fn get_open_orders(&self, symbol: &str) -> Result<Vec<OpenOrder>>;
}

/// 基础交易所实现
#[derive(Clone)]
pub struct BaseExchange {
    pub name: String,
    pub config: ExchangeConfig,
    pub api_keys: ApiKeys,
    pub client: reqwest::Client,
}

impl BaseExchange {
    /// 创建新的交易所实例
    pub fn new(config: ExchangeConfig, api_keys: ApiKeys) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("AsterCTA/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ExchangeError::ConfigError(format!("创建HTTP客户端失败: {}", e)))?;

        Ok(Self {
            name: config.name.clone(),
            config,
            api_keys,
            client,
        })
    }
}
