//! Typed wrappers over the common KuCoin spot REST endpoints.
//!
//! Each wrapper builds its request path, goes through the signing and
//! validation pipeline in [`crate::client`], and deserializes the
//! envelope's `data` payload. Decimal fields are kept as the strings the
//! exchange sends; `*_f64` accessors parse on demand.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::client::KucoinRestClient;
use crate::error::{KucoinError, Result};
use crate::paginate::{auto_paginate_with, flatten_batches, PageQuery, Paginator};

fn parse_f64_or_warn(s: &str, field_name: &str) -> f64 {
    s.parse::<f64>().unwrap_or_else(|e| {
        warn!("Failed to parse {} '{}': {}", field_name, s, e);
        0.0
    })
}

// =============================================================================
// Request/Response Types
// =============================================================================

/// Order side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "buy",
            OrderSide::Sell => "sell",
        }
    }
}

/// Body for `POST /api/v1/orders`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub client_oid: String,
    pub side: String,
    pub symbol: String,
    #[serde(rename = "type")]
    pub order_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_in_force: Option<String>,
}

impl PlaceOrderRequest {
    /// Limit order with a generated client order id.
    pub fn limit(symbol: &str, side: OrderSide, price: &str, size: &str) -> Self {
        Self {
            client_oid: uuid::Uuid::new_v4().to_string(),
            side: side.as_str().to_string(),
            symbol: symbol.to_string(),
            order_type: "limit".to_string(),
            price: Some(price.to_string()),
            size: Some(size.to_string()),
            time_in_force: None,
        }
    }

    /// Market order sized in base currency, with a generated client order
    /// id.
    pub fn market(symbol: &str, side: OrderSide, size: &str) -> Self {
        Self {
            client_oid: uuid::Uuid::new_v4().to_string(),
            side: side.as_str().to_string(),
            symbol: symbol.to_string(),
            order_type: "market".to_string(),
            price: None,
            size: Some(size.to_string()),
            time_in_force: None,
        }
    }

    pub fn with_time_in_force(mut self, tif: impl Into<String>) -> Self {
        self.time_in_force = Some(tif.into());
        self
    }

    pub fn with_client_oid(mut self, client_oid: impl Into<String>) -> Self {
        self.client_oid = client_oid.into();
        self
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaceOrderAck {
    order_id: String,
}

/// One order as returned by `GET /api/v1/orders`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    pub id: String,
    pub symbol: String,
    pub side: String,
    #[serde(rename = "type")]
    pub order_type: String,
    pub price: String,
    pub size: String,
    pub deal_size: String,
    pub is_active: bool,
    #[serde(default)]
    pub cancel_exist: bool,
    pub created_at: u64,
    #[serde(default)]
    pub client_oid: Option<String>,
}

impl OrderDetail {
    pub fn size_f64(&self) -> f64 {
        parse_f64_or_warn(&self.size, "size")
    }

    pub fn deal_size_f64(&self) -> f64 {
        parse_f64_or_warn(&self.deal_size, "deal_size")
    }
}

/// Ids cancelled by `DELETE /api/v1/orders/{id}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelledOrders {
    pub cancelled_order_ids: Vec<String>,
}

/// One page of a paginated endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub current_page: u32,
    pub page_size: u32,
    #[serde(default)]
    pub total_num: u32,
    pub total_page: u32,
    pub items: Vec<T>,
}

/// One fill as returned by `GET /api/v1/fills`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fill {
    pub symbol: String,
    pub trade_id: String,
    pub order_id: String,
    #[serde(default)]
    pub counter_order_id: Option<String>,
    pub side: String,
    #[serde(default)]
    pub liquidity: Option<String>,
    pub price: String,
    pub size: String,
    pub funds: String,
    pub fee: String,
    #[serde(default)]
    pub fee_rate: Option<String>,
    pub fee_currency: String,
    #[serde(rename = "type")]
    pub order_type: String,
    pub created_at: u64,
}

/// One account as returned by `GET /api/v1/accounts`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountBalance {
    pub currency: String,
    #[serde(rename = "type")]
    pub account_type: String,
    pub balance: String,
    pub available: String,
    pub holds: String,
}

impl AccountBalance {
    pub fn balance_f64(&self) -> f64 {
        parse_f64_or_warn(&self.balance, "balance")
    }

    pub fn available_f64(&self) -> f64 {
        parse_f64_or_warn(&self.available, "available")
    }

    pub fn holds_f64(&self) -> f64 {
        parse_f64_or_warn(&self.holds, "holds")
    }
}

/// One trading pair as returned by `GET /api/v2/symbols`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolInfo {
    pub symbol: String,
    pub base_currency: String,
    pub quote_currency: String,
    pub base_min_size: String,
    pub base_max_size: String,
    pub base_increment: String,
    pub price_increment: String,
    pub enable_trading: bool,
}

/// Snapshot of every market, from `GET /api/v1/market/allTickers`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllTickers {
    pub time: u64,
    pub ticker: Vec<TickerSnapshot>,
}

/// One market inside [`AllTickers`].
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerSnapshot {
    pub symbol: String,
    #[serde(default)]
    pub buy: Option<String>,
    #[serde(default)]
    pub sell: Option<String>,
    pub last: String,
    pub vol: String,
    #[serde(rename = "changeRate", default)]
    pub change_rate: Option<String>,
    #[serde(default)]
    pub high: Option<String>,
    #[serde(default)]
    pub low: Option<String>,
    #[serde(rename = "averagePrice", default)]
    pub average_price: Option<String>,
}

impl TickerSnapshot {
    pub fn last_f64(&self) -> f64 {
        parse_f64_or_warn(&self.last, "last")
    }

    pub fn vol_f64(&self) -> f64 {
        parse_f64_or_warn(&self.vol, "vol")
    }
}

/// Best bid/ask snapshot from `GET /api/v1/market/orderbook/level1`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Level1Ticker {
    pub time: u64,
    pub sequence: String,
    pub price: String,
    pub size: String,
    #[serde(default)]
    pub best_bid: Option<String>,
    #[serde(default)]
    pub best_bid_size: Option<String>,
    #[serde(default)]
    pub best_ask: Option<String>,
    #[serde(default)]
    pub best_ask_size: Option<String>,
}

// =============================================================================
// Endpoint Wrappers
// =============================================================================

impl KucoinRestClient {
    /// Lists accounts, optionally filtered by currency and account type
    /// ("main", "trade", ...). Signed.
    pub async fn accounts(
        &self,
        currency: Option<&str>,
        account_type: Option<&str>,
    ) -> Result<Vec<AccountBalance>> {
        let mut params = std::collections::HashMap::new();
        if let Some(currency) = currency {
            params.insert("currency".to_string(), currency.to_string());
        }
        if let Some(account_type) = account_type {
            params.insert("type".to_string(), account_type.to_string());
        }
        let params = (!params.is_empty()).then_some(params);
        self.get_signed("/api/v1/accounts", params).await
    }

    /// Lists all trading pairs. Public.
    pub async fn symbols(&self) -> Result<Vec<SymbolInfo>> {
        self.get_public("/api/v2/symbols", None).await
    }

    /// Snapshot of every market. Public.
    pub async fn all_tickers(&self) -> Result<AllTickers> {
        self.get_public("/api/v1/market/allTickers", None).await
    }

    /// Best bid/ask for one symbol. Public.
    pub async fn ticker(&self, symbol: &str) -> Result<Level1Ticker> {
        let mut params = std::collections::HashMap::new();
        params.insert("symbol".to_string(), symbol.to_string());
        self.get_public("/api/v1/market/orderbook/level1", Some(params))
            .await
    }

    /// Places an order and returns the venue order id. Signed.
    pub async fn place_order(&self, request: &PlaceOrderRequest) -> Result<String> {
        let body =
            serde_json::to_string(request).map_err(|err| KucoinError::MalformedResponse {
                detail: format!("failed to serialize order request: {}", err),
            })?;
        let ack: PlaceOrderAck = self.post_signed("/api/v1/orders", &body).await?;
        Ok(ack.order_id)
    }

    /// Cancels one order by venue order id. Signed.
    pub async fn cancel_order(&self, order_id: &str) -> Result<CancelledOrders> {
        let endpoint = format!("/api/v1/orders/{}", order_id);
        self.delete_signed(&endpoint, None).await
    }

    /// Fetches one order by venue order id. Signed.
    pub async fn order(&self, order_id: &str) -> Result<OrderDetail> {
        let endpoint = format!("/api/v1/orders/{}", order_id);
        self.get_signed(&endpoint, None).await
    }

    /// One page of the order list, optionally filtered by symbol and
    /// status ("active" or "done"). Signed.
    pub async fn orders(
        &self,
        symbol: Option<&str>,
        status: Option<&str>,
        page: PageQuery,
    ) -> Result<Page<OrderDetail>> {
        let mut params = page.params();
        if let Some(symbol) = symbol {
            params.insert("symbol".to_string(), symbol.to_string());
        }
        if let Some(status) = status {
            params.insert("status".to_string(), status.to_string());
        }
        self.get_signed("/api/v1/orders", Some(params)).await
    }

    /// One page of the fill list, optionally filtered by symbol and order
    /// id. Signed.
    pub async fn fills(
        &self,
        symbol: Option<&str>,
        order_id: Option<&str>,
        page: PageQuery,
    ) -> Result<Page<Fill>> {
        let mut params = page.params();
        if let Some(symbol) = symbol {
            params.insert("symbol".to_string(), symbol.to_string());
        }
        if let Some(order_id) = order_id {
            params.insert("orderId".to_string(), order_id.to_string());
        }
        self.get_signed("/api/v1/fills", Some(params)).await
    }

    /// Every order across all pages, driven by
    /// [`auto_paginate_with`]. Signed.
    pub async fn orders_all_pages(
        &self,
        symbol: Option<&str>,
        status: Option<&str>,
        max_pages: Option<u32>,
    ) -> Result<Vec<OrderDetail>> {
        let items = auto_paginate_with(
            |page| {
                let mut params = page.params();
                if let Some(symbol) = symbol {
                    params.insert("symbol".to_string(), symbol.to_string());
                }
                if let Some(status) = status {
                    params.insert("status".to_string(), status.to_string());
                }
                self.get_signed::<Value>("/api/v1/orders", Some(params))
            },
            PageQuery::default(),
            paginator_opts(max_pages),
            flatten_batches,
        )
        .await?;
        collect_items(items)
    }

    /// Every fill across all pages. Signed.
    pub async fn fills_all_pages(
        &self,
        symbol: Option<&str>,
        order_id: Option<&str>,
        max_pages: Option<u32>,
    ) -> Result<Vec<Fill>> {
        let items = auto_paginate_with(
            |page| {
                let mut params = page.params();
                if let Some(symbol) = symbol {
                    params.insert("symbol".to_string(), symbol.to_string());
                }
                if let Some(order_id) = order_id {
                    params.insert("orderId".to_string(), order_id.to_string());
                }
                self.get_signed::<Value>("/api/v1/fills", Some(params))
            },
            PageQuery::default(),
            paginator_opts(max_pages),
            flatten_batches,
        )
        .await?;
        collect_items(items)
    }
}

fn paginator_opts(max_pages: Option<u32>) -> Paginator {
    match max_pages {
        Some(limit) => Paginator::default().with_max_pages(limit),
        None => Paginator::default(),
    }
}

fn collect_items<T: DeserializeOwned>(items: Vec<Value>) -> Result<Vec<T>> {
    serde_json::from_value(Value::Array(items)).map_err(|err| KucoinError::MalformedResponse {
        detail: format!("unexpected item shape: {}", err),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_place_order_request_serialization() {
        let request = PlaceOrderRequest::limit("BTC-USDT", OrderSide::Buy, "50000", "0.001")
            .with_client_oid("oid-1")
            .with_time_in_force("GTC");
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body,
            json!({
                "clientOid": "oid-1",
                "side": "buy",
                "symbol": "BTC-USDT",
                "type": "limit",
                "price": "50000",
                "size": "0.001",
                "timeInForce": "GTC",
            })
        );
    }

    #[test]
    fn test_market_order_omits_unset_fields() {
        let request = PlaceOrderRequest::market("ETH-USDT", OrderSide::Sell, "1.5");
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["type"], "market");
        assert_eq!(body["side"], "sell");
        assert!(body.get("price").is_none());
        assert!(body.get("timeInForce").is_none());
        // A client order id is always generated.
        assert!(!body["clientOid"].as_str().unwrap().is_empty());
    }

    #[test]
    fn test_order_detail_parsing_and_accessors() {
        let order: OrderDetail = serde_json::from_value(json!({
            "id": "5c35c02703aa673ceec2a168",
            "symbol": "BTC-USDT",
            "side": "buy",
            "type": "limit",
            "price": "10",
            "size": "2",
            "dealSize": "0.5",
            "isActive": true,
            "cancelExist": false,
            "createdAt": 1547026471000u64,
            "clientOid": "oid-7",
        }))
        .unwrap();

        assert_eq!(order.size_f64(), 2.0);
        assert_eq!(order.deal_size_f64(), 0.5);
        assert_eq!(order.client_oid.as_deref(), Some("oid-7"));
    }

    #[test]
    fn test_page_of_orders_parsing() {
        let page: Page<OrderDetail> = serde_json::from_value(json!({
            "currentPage": 1,
            "pageSize": 50,
            "totalNum": 1,
            "totalPage": 1,
            "items": [{
                "id": "order-1",
                "symbol": "BTC-USDT",
                "side": "sell",
                "type": "limit",
                "price": "45000",
                "size": "1",
                "dealSize": "1",
                "isActive": false,
                "createdAt": 1547026471000u64,
            }],
        }))
        .unwrap();

        assert_eq!(page.total_page, 1);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].side, "sell");
    }

    #[test]
    fn test_account_balance_accessors() {
        let account: AccountBalance = serde_json::from_value(json!({
            "currency": "USDT",
            "type": "trade",
            "balance": "100.5",
            "available": "90.25",
            "holds": "10.25",
        }))
        .unwrap();

        assert_eq!(account.balance_f64(), 100.5);
        assert_eq!(account.available_f64(), 90.25);
        assert_eq!(account.holds_f64(), 10.25);
    }

    #[test]
    fn test_ticker_snapshot_with_missing_optionals() {
        let ticker: TickerSnapshot = serde_json::from_value(json!({
            "symbol": "BTC-USDT",
            "last": "50000.1",
            "vol": "1234.5",
        }))
        .unwrap();

        assert_eq!(ticker.last_f64(), 50000.1);
        assert_eq!(ticker.vol_f64(), 1234.5);
        assert!(ticker.buy.is_none());
        assert!(ticker.change_rate.is_none());
    }

    #[test]
    fn test_parse_f64_falls_back_to_zero() {
        assert_eq!(parse_f64_or_warn("not-a-number", "price"), 0.0);
        assert_eq!(parse_f64_or_warn("2.75", "price"), 2.75);
    }

    #[test]
    fn test_order_side_strings() {
        assert_eq!(OrderSide::Buy.as_str(), "buy");
        assert_eq!(OrderSide::Sell.as_str(), "sell");
    }
}
