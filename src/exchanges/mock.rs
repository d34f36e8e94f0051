//! 内存交易所，用于策略测试
//!
//! 行情、挂单和订单状态都由测试脚本化设置，所有下单/撤单请求被记录下来供断言

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::core::{error::ExchangeError, exchange::Exchange, types::*};

pub struct MockExchange {
    price: Mutex<Option<Decimal>>,
    book: Mutex<Option<BookTicker>>,
    open_orders: Mutex<Option<Vec<OpenOrder>>>,
    /// 下单时返回的状态
    create_status: Mutex<OrderStatus>,
    /// 这些价格上的限价单会被拒绝
    rejected_prices: Mutex<HashSet<Decimal>>,
    reject_market_orders: Mutex<bool>,
    /// get_order 依次返回的结果，耗尽后返回 NEW
    order_statuses: Mutex<VecDeque<Result<OrderStatus>>>,
    placed: Mutex<Vec<OrderRequest>>,
    cancelled: Mutex<Vec<i64>>,
    cancel_all_calls: AtomicUsize,
    get_order_calls: AtomicUsize,
    next_order_id: AtomicI64,
}

impl Default for MockExchange {
    fn default() -> Self {
        Self::new()
    }
}

impl MockExchange {
    pub fn new() -> Self {
        Self {
            price: Mutex::new(None),
            book: Mutex::new(None),
            open_orders: Mutex::new(Some(Vec::new())),
            create_status: Mutex::new(OrderStatus::New),
            rejected_prices: Mutex::new(HashSet::new()),
            reject_market_orders: Mutex::new(false),
            order_statuses: Mutex::new(VecDeque::new()),
            placed: Mutex::new(Vec::new()),
            cancelled: Mutex::new(Vec::new()),
            cancel_all_calls: AtomicUsize::new(0),
            get_order_calls: AtomicUsize::new(0),
            next_order_id: AtomicI64::new(1),
        }
    }

    pub fn with_price(self, price: Decimal) -> Self {
        self.set_price(Some(price));
        self
    }

    /// None 表示行情请求失败
    pub fn set_price(&self, price: Option<Decimal>) {
        *self.price.lock().unwrap() = price;
    }

    pub fn set_book(&self, bid: Decimal, ask: Decimal) {
        *self.book.lock().unwrap() = Some(BookTicker {
            symbol: String::new(),
            bid_price: bid,
            ask_price: ask,
        });
    }

    /// None 表示挂单查询失败
    pub fn set_open_orders(&self, orders: Option<Vec<OpenOrder>>) {
        *self.open_orders.lock().unwrap() = orders;
    }

    pub fn set_create_status(&self, status: OrderStatus) {
        *self.create_status.lock().unwrap() = status;
    }

    pub fn reject_price(&self, price: Decimal) {
        self.rejected_prices.lock().unwrap().insert(price);
    }

    pub fn reject_market_orders(&self, reject: bool) {
        *self.reject_market_orders.lock().unwrap() = reject;
    }

    pub fn push_order_status(&self, status: OrderStatus) {
        self.order_statuses.lock().unwrap().push_back(Ok(status));
    }

    pub fn push_order_error(&self) {
        self.order_statuses
            .lock()
            .unwrap()
            .push_back(Err(ExchangeError::Other("模拟查询失败".to_string())));
    }

    pub fn placed_orders(&self) -> Vec<OrderRequest> {
        self.placed.lock().unwrap().clone()
    }

    pub fn cancelled_orders(&self) -> Vec<i64> {
        self.cancelled.lock().unwrap().clone()
    }

    pub fn cancel_all_calls(&self) -> usize {
        self.cancel_all_calls.load(Ordering::SeqCst)
    }

    pub fn get_order_calls(&self) -> usize {
        self.get_order_calls.load(Ordering::SeqCst)
    }

    /// 构造一个挂单快照
    pub fn open_order(order_id: i64, side: &str, price: &str) -> OpenOrder {
        OpenOrder {
            order_id,
            side: side.to_string(),
            price: Some(price.to_string()),
            orig_qty: Some("10".to_string()),
            status: "NEW".to_string(),
        }
    }

    fn order_from(&self, request: &OrderRequest, order_id: i64, status: OrderStatus) -> Order {
        Order {
            order_id,
            symbol: request.symbol.clone(),
            status,
            client_order_id: None,
            side: request.side,
            order_type: request.order_type,
            price: request.price,
            orig_qty: request.quantity,
            executed_qty: Decimal::ZERO,
            update_time: Some(Utc::now().timestamp_millis()),
        }
    }
}

#[async_trait]
impl Exchange for MockExchange {
    fn name(&self) -> &str {
        "mock"
    }

    async fn get_server_time(&self) -> Result<DateTime<Utc>> {
        Ok(Utc::now())
    }

    async fn get_ticker_price(&self, _symbol: &str) -> Result<Decimal> {
        self.price
            .lock()
            .unwrap()
            .ok_or_else(|| ExchangeError::Other("模拟行情失败".to_string()))
    }

    async fn get_book_ticker(&self, symbol: &str) -> Result<BookTicker> {
        let book = self.book.lock().unwrap().clone();
        book.map(|mut book| {
            book.symbol = symbol.to_string();
            book
        })
        .ok_or_else(|| ExchangeError::Other("模拟盘口失败".to_string()))
    }

    async fn create_order(&self, order_request: OrderRequest) -> Result<Order> {
        self.placed.lock().unwrap().push(order_request.clone());

        let rejected = match order_request.price {
            Some(price) => self.rejected_prices.lock().unwrap().contains(&price),
            None => *self.reject_market_orders.lock().unwrap(),
        };
        if rejected {
            return Err(ExchangeError::ApiError {
                code: -2019,
                message: "Margin is insufficient.".to_string(),
            });
        }

        let order_id = self.next_order_id.fetch_add(1, Ordering::SeqCst);
        let status = *self.create_status.lock().unwrap();
        Ok(self.order_from(&order_request, order_id, status))
    }

    async fn cancel_order(&self, symbol: &str, order_id: i64) -> Result<Order> {
        self.cancelled.lock().unwrap().push(order_id);
        Ok(Order {
            order_id,
            symbol: symbol.to_string(),
            status: OrderStatus::Canceled,
            client_order_id: None,
            side: OrderSide::Buy,
            order_type: OrderType::Limit,
            price: None,
            orig_qty: Decimal::ZERO,
            executed_qty: Decimal::ZERO,
            update_time: None,
        })
    }

    async fn cancel_all_orders(&self, _symbol: &str) -> Result<()> {
        self.cancel_all_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get_order(&self, symbol: &str, order_id: i64) -> Result<Order> {
        self.get_order_calls.fetch_add(1, Ordering::SeqCst);
        let next = self
            .order_statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(OrderStatus::New));

        let status = next?;
        Ok(Order {
            order_id,
            symbol: symbol.to_string(),
            status,
            client_order_id: None,
            side: OrderSide::Buy,
            order_type: OrderType::Market,
            price: None,
            orig_qty: Decimal::ZERO,
            executed_qty: Decimal::ZERO,
            update_time: None,
        })
    }

    async fn get_open_orders(&self, _symbol: &str) -> Result<Vec<OpenOrder>> {
        self.open_orders
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ExchangeError::Other("模拟挂单查询失败".to_string()))
    }
}
