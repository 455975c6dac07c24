//! KuCoin REST client.
//!
//! Wraps a shared `reqwest::Client` with the exchange's signing scheme and
//! envelope validation. Signed requests fetch the exchange's own timestamp
//! first: KuCoin rejects requests whose timestamp drifts more than a few
//! seconds from server time, so the local clock is never used.

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use crate::auth::Credentials;
use crate::error::{KucoinError, Result};
use crate::response::{validate_response, UNREADABLE_BODY};

// =============================================================================
// API Endpoints
// =============================================================================

/// KuCoin Spot REST API base URL
pub const KUCOIN_SPOT_REST_URL: &str = "https://api.kucoin.com";

/// KuCoin Futures REST API base URL
pub const KUCOIN_FUTURES_REST_URL: &str = "https://api-futures.kucoin.com";

/// Server time endpoint, used as the clock source for request signing
pub const SERVER_TIME_ENDPOINT: &str = "/api/v1/timestamp";

const SERVER_TIME_TIMEOUT: Duration = Duration::from_secs(3);

// =============================================================================
// REST Client
// =============================================================================

/// HTTP client for the KuCoin REST API.
///
/// Public endpoints work without credentials; signed endpoints require
/// [`Credentials`] and return
/// [`KucoinError::InvalidCredentials`] otherwise.
#[derive(Clone)]
pub struct KucoinRestClient {
    client: Client,
    credentials: Option<Credentials>,
    base_url: String,
}

impl KucoinRestClient {
    /// Creates a client for the spot REST API.
    pub fn spot(credentials: Option<Credentials>) -> Self {
        Self::with_base_url(KUCOIN_SPOT_REST_URL, credentials)
    }

    /// Creates a client for the futures REST API.
    pub fn futures(credentials: Option<Credentials>) -> Self {
        Self::with_base_url(KUCOIN_FUTURES_REST_URL, credentials)
    }

    /// Creates a client against an arbitrary base URL.
    pub fn with_base_url(base_url: impl Into<String>, credentials: Option<Credentials>) -> Self {
        let client = Client::builder()
            .pool_max_idle_per_host(10)
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            credentials,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches the exchange's current time in epoch milliseconds.
    pub async fn server_time(&self) -> Result<i64> {
        let url = format!("{}{}", self.base_url, SERVER_TIME_ENDPOINT);
        debug!("Fetching KuCoin server time");

        let response = self
            .client
            .get(&url)
            .timeout(SERVER_TIME_TIMEOUT)
            .send()
            .await?;
        let data = Self::drain_and_validate(response).await?;
        Self::from_data(data)
    }

    /// Builds the full signed header set for one request.
    ///
    /// `endpoint_path` must include the query string exactly as it will
    /// appear on the wire, and `body` the exact serialized request body
    /// (empty string for none). The timestamp is fetched from the exchange
    /// per call; headers are built fresh every time and must not be reused
    /// across requests.
    ///
    /// A failure to obtain server time maps to
    /// [`KucoinError::ClockUnavailable`]; there is no local-clock fallback
    /// and no retry here.
    pub async fn signed_headers(
        &self,
        method: &str,
        endpoint_path: &str,
        body: &str,
    ) -> Result<HeaderMap> {
        let credentials =
            self.credentials
                .as_ref()
                .ok_or(KucoinError::InvalidCredentials {
                    field: "credentials",
                })?;
        credentials.validate()?;

        let timestamp = self
            .server_time()
            .await
            .map_err(|err| KucoinError::ClockUnavailable {
                reason: err.to_string(),
            })?;
        let timestamp_str = timestamp.to_string();

        let method = method.to_uppercase();
        let signature = credentials.sign(&timestamp_str, &method, endpoint_path, body);

        let mut headers = HeaderMap::with_capacity(6);
        headers.insert("KC-API-KEY", credential_header("api_key", &credentials.api_key)?);
        headers.insert("KC-API-SIGN", credential_header("api_secret", &signature)?);
        headers.insert("KC-API-TIMESTAMP", HeaderValue::from(timestamp));
        headers.insert(
            "KC-API-PASSPHRASE",
            credential_header("api_passphrase", credentials.encrypted_passphrase())?,
        );
        headers.insert(
            "KC-API-KEY-VERSION",
            credential_header("key_version", &credentials.key_version)?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(headers)
    }

    /// Makes a GET request to a public endpoint.
    pub async fn get_public<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: Option<HashMap<String, String>>,
    ) -> Result<T> {
        let path = path_with_query(endpoint, params.as_ref());
        let url = format!("{}{}", self.base_url, path);
        debug!("Calling KuCoin endpoint: GET {}", path);

        let response = self.client.get(&url).send().await?;
        let data = Self::drain_and_validate(response).await?;
        Self::from_data(data)
    }

    /// Makes a GET request to a signed endpoint.
    ///
    /// The query string is built with sorted keys and appended to the URL
    /// itself, so the signed path and the path on the wire are one and the
    /// same string.
    pub async fn get_signed<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: Option<HashMap<String, String>>,
    ) -> Result<T> {
        let path = path_with_query(endpoint, params.as_ref());
        let headers = self.signed_headers("GET", &path, "").await?;
        let url = format!("{}{}", self.base_url, path);
        debug!("Calling KuCoin endpoint: GET {} (signed)", path);

        let response = self.client.get(&url).headers(headers).send().await?;
        let data = Self::drain_and_validate(response).await?;
        Self::from_data(data)
    }

    /// Makes a POST request to a signed endpoint.
    ///
    /// `body` is the exact serialized JSON body; it is signed verbatim and
    /// transmitted unchanged.
    pub async fn post_signed<T: DeserializeOwned>(&self, endpoint: &str, body: &str) -> Result<T> {
        let headers = self.signed_headers("POST", endpoint, body).await?;
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("Calling KuCoin endpoint: POST {} (signed)", endpoint);

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .body(body.to_string())
            .send()
            .await?;
        let data = Self::drain_and_validate(response).await?;
        Self::from_data(data)
    }

    /// Makes a DELETE request to a signed endpoint.
    pub async fn delete_signed<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: Option<HashMap<String, String>>,
    ) -> Result<T> {
        let path = path_with_query(endpoint, params.as_ref());
        let headers = self.signed_headers("DELETE", &path, "").await?;
        let url = format!("{}{}", self.base_url, path);
        debug!("Calling KuCoin endpoint: DELETE {} (signed)", path);

        let response = self.client.delete(&url).headers(headers).send().await?;
        let data = Self::drain_and_validate(response).await?;
        Self::from_data(data)
    }

    async fn drain_and_validate(response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        let body = match response.text().await {
            Ok(text) => text,
            // Keep the original HTTP failure even when the body cannot be read.
            Err(err) if status != StatusCode::OK => {
                debug!("Failed to read error response body: {}", err);
                return Err(KucoinError::HttpError {
                    status: status.as_u16(),
                    body: UNREADABLE_BODY.to_string(),
                });
            }
            Err(err) => return Err(KucoinError::Transport(err)),
        };
        validate_response(status, &body)
    }

    fn from_data<T: DeserializeOwned>(data: Value) -> Result<T> {
        serde_json::from_value(data).map_err(|err| KucoinError::MalformedResponse {
            detail: format!("unexpected `data` shape: {}", err),
        })
    }
}

fn credential_header(field: &'static str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|_| KucoinError::InvalidCredentials { field })
}

fn query_string(params: &HashMap<String, String>) -> String {
    let mut pairs: Vec<_> = params.iter().collect();
    pairs.sort_by_key(|(k, _)| *k);
    pairs
        .into_iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

fn path_with_query(endpoint: &str, params: Option<&HashMap<String, String>>) -> String {
    match params {
        Some(p) if !p.is_empty() => format!("{}?{}", endpoint, query_string(p)),
        _ => endpoint.to_string(),
    }
}
