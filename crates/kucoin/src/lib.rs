//! Asynchronous client for the KuCoin REST API.
//!
//! # Authentication
//!
//! KuCoin signs requests with HMAC-SHA256 over
//! `timestamp + method + requestPath + body`, Base64-encoded, plus an
//! HMAC-hashed passphrase (key version 2). The timestamp is the
//! exchange's own server time, fetched per request from
//! `/api/v1/timestamp` — the exchange rejects requests that drift more
//! than a few seconds from its clock, so there is no local-time fallback.
//!
//! # Response envelope
//!
//! Every response wraps its payload as `{code, data}` on success or
//! `{code, msg}` on failure; `"200000"` is the sole success code.
//! [`validate_response`] maps the failure combinations onto
//! [`KucoinError`].
//!
//! # Pagination
//!
//! List endpoints page through `{items, currentPage, pageSize,
//! totalPage}`. [`auto_paginate`] walks the pages sequentially and
//! collects the batches; [`flatten_batches`] concatenates them.
//!
//! # API Documentation
//!
//! - REST API: <https://www.kucoin.com/docs/rest/introduction>
//! - Signing: <https://www.kucoin.com/docs/basic-info/connection-method/authentication/creating-a-request>

pub mod auth;
pub mod client;
pub mod error;
pub mod paginate;
pub mod response;
pub mod retry;
pub mod spot;

pub use auth::{prehash, Credentials};
pub use client::{
    KucoinRestClient, KUCOIN_FUTURES_REST_URL, KUCOIN_SPOT_REST_URL, SERVER_TIME_ENDPOINT,
};
pub use error::{KucoinError, Result};
pub use paginate::{auto_paginate, auto_paginate_with, flatten_batches, PageQuery, Paginator};
pub use response::{validate_response, SUCCESS_CODE};
pub use retry::retry_async;
pub use spot::{
    AccountBalance, AllTickers, CancelledOrders, Fill, Level1Ticker, OrderDetail, OrderSide, Page,
    PlaceOrderRequest, SymbolInfo, TickerSnapshot,
};
