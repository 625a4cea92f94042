//! Authenticated session against Binance USDT-M futures REST API

use crate::defines::*;
use crate::error::VenueError;
use crate::types::{TradingContext, VenueCall};
use crate::util::{encode_params, get_timestamp_ms, signed_query};

use isahc::config::Configurable;
use isahc::{HttpClient, ReadResponseExt, Request};
use log::{debug, info};
use serde_json::Value;
use std::time::Duration;

/// Something that can perform a named remote operation against the venue.
///
/// Implementations must be safe to call repeatedly; a failed call must not
/// affect subsequent ones.
pub trait ExchangeSession {
    fn invoke(&self, call: &VenueCall) -> Result<Value, VenueError>;
}

impl<T: ExchangeSession + ?Sized> ExchangeSession for &T {
    fn invoke(&self, call: &VenueCall) -> Result<Value, VenueError> {
        (**self).invoke(call)
    }
}

/// Session holding credentials, base url and a pooled http client.
/// `HttpClient` is `Send + Sync`, so one session can be shared across threads.
pub struct BinanceFuturesSession {
    api_key: String,
    api_secret: String,
    base_url: String,
    recv_window_ms: u64,
    client: HttpClient,
}

impl BinanceFuturesSession {
    /// Create a session. With `use_testnet` the futures base url points to
    /// testnet, testnet keys are not valid on production.
    pub fn connect(api_key: &str, api_secret: &str, use_testnet: bool, timeout: Duration) -> Result<Self, VenueError> {
        let base_url = if use_testnet { FUTURES_TESTNET_URL } else { FUTURES_MAINNET_URL };
        let client = HttpClient::builder().timeout(timeout).build()?;

        info!("Client initialized (testnet={})", use_testnet);
        Ok(BinanceFuturesSession {
            api_key: api_key.trim().to_string(),
            api_secret: api_secret.trim().to_string(),
            base_url: base_url.to_string(),
            recv_window_ms: DEFAULT_RECV_WINDOW_MS,
            client,
        })
    }

    pub fn from_context(ctx: &TradingContext) -> Result<Self, VenueError> {
        Self::connect(&ctx.api_key, &ctx.api_secret, ctx.use_testnet, Duration::from_secs(ctx.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    fn query_for(&self, call: &VenueCall, signed: bool) -> String {
        if signed {
            signed_query(&self.api_secret, &call.params, self.recv_window_ms, get_timestamp_ms())
        } else {
            encode_params(&call.params)
        }
    }
}

impl ExchangeSession for BinanceFuturesSession {
    fn invoke(&self, call: &VenueCall) -> Result<Value, VenueError> {
        let endpoint = call.operation.endpoint();
        let query = self.query_for(call, endpoint.signed);
        let url = format!("{}{}", self.base_url, endpoint.path);
        debug!("{} {}", endpoint.method, url);

        let mut response = match endpoint.method {
            "POST" => {
                let request = Request::post(&url)
                    .header(API_KEY_HEADER, self.api_key.as_str())
                    .header("Content-Type", "application/x-www-form-urlencoded")
                    .body(query)?;
                self.client.send(request)?
            }
            _ => {
                let url = if query.is_empty() { url } else { format!("{}?{}", url, query) };
                let mut builder = Request::get(&url);
                if endpoint.signed {
                    builder = builder.header(API_KEY_HEADER, self.api_key.as_str());
                }
                self.client.send(builder.body(())?)?
            }
        };

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| VenueError::Transport(format!("cannot read response body: {}", e)))?;
        classify_response(status, &body)
    }
}

/// Turn status code and body of a venue response into a raw result or a
/// classified error.
pub fn classify_response(status: u16, body: &str) -> Result<Value, VenueError> {
    let parsed = serde_json::from_str::<Value>(body);

    if let Ok(value) = &parsed {
        if let Some(code) = value.get("code").and_then(Value::as_i64) {
            if code < 0 {
                let message = value.get("msg").and_then(Value::as_str).unwrap_or_default();
                return Err(VenueError::from_venue(code, message));
            }
        }
    }

    if !(200..300).contains(&status) {
        return Err(VenueError::Transport(format!("HTTP {}: {}", status, body.trim())));
    }

    parsed.map_err(|e| VenueError::Unexpected(format!("malformed response: {} ({})", e, body.trim())))
}
