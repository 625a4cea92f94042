use crate::defines::*;
use crate::error::{ConfigError, RequestError};
use crate::types::*;

use regex::Regex;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

impl TradingContext {
    /// Read credentials from environment variables.
    /// Fails if either BINANCE_API_KEY or BINANCE_API_SECRET is not set.
    pub fn from_env(use_testnet: bool, timeout_secs: u64) -> Result<TradingContext, ConfigError> {
        let api_key = std::env::var(ENV_API_KEY).map_err(|_| ConfigError::MissingCredential(ENV_API_KEY))?;
        let api_secret = std::env::var(ENV_API_SECRET).map_err(|_| ConfigError::MissingCredential(ENV_API_SECRET))?;
        Ok(TradingContext {
            api_key,
            api_secret,
            use_testnet,
            timeout_secs,
        })
    }
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive, venue only accepts the uppercase form on the wire.
impl FromStr for Side {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(Side::Buy),
            "SELL" => Ok(Side::Sell),
            _ => Err(RequestError::InvalidSide(s.to_string())),
        }
    }
}

impl TimeInForce {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeInForce::Gtc => "GTC",
            TimeInForce::Ioc => "IOC",
            TimeInForce::Fok => "FOK",
            TimeInForce::Gtx => "GTX",
        }
    }
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeInForce {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GTC" => Ok(TimeInForce::Gtc),
            "IOC" => Ok(TimeInForce::Ioc),
            "FOK" => Ok(TimeInForce::Fok),
            "GTX" => Ok(TimeInForce::Gtx),
            _ => Err(RequestError::InvalidTimeInForce(s.to_string())),
        }
    }
}

/// Http method, path and whether the call has to be signed.
pub struct Endpoint {
    pub method: &'static str,
    pub path: &'static str,
    pub signed: bool,
}

impl Operation {
    /// Name used in logs and diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            Operation::CreateOrder => "create_order",
            Operation::MarkPrice => "mark_price",
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        match self {
            Operation::CreateOrder => Endpoint { method: "POST", path: CREATE_ORDER_PATH, signed: true },
            Operation::MarkPrice => Endpoint { method: "GET", path: MARK_PRICE_PATH, signed: false },
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn symbol_regex() -> &'static Regex {
    static SYMBOL_RE: OnceLock<Regex> = OnceLock::new();
    SYMBOL_RE.get_or_init(|| Regex::new(r"^[A-Z0-9]+$").expect("symbol regex is valid"))
}

/// Uppercase and check the instrument identifier.
pub fn normalize_symbol(symbol: &str) -> Result<String, RequestError> {
    let symbol = symbol.trim().to_ascii_uppercase();
    if symbol.is_empty() {
        return Err(RequestError::EmptySymbol);
    }
    if !symbol_regex().is_match(&symbol) {
        return Err(RequestError::MalformedSymbol(symbol));
    }
    Ok(symbol)
}

fn ensure_positive(field: &'static str, value: Decimal) -> Result<Decimal, RequestError> {
    if value <= Decimal::ZERO {
        return Err(RequestError::NotPositive { field, value: value.to_string() });
    }
    Ok(value)
}

impl OrderRequest {
    /// Normalize symbol and side, then check that every amount is positive.
    pub fn new(symbol: &str, side: &str, quantity: Decimal, kind: OrderKind) -> Result<OrderRequest, RequestError> {
        let symbol = normalize_symbol(symbol)?;
        let side = side.parse::<Side>()?;
        let quantity = ensure_positive("quantity", quantity)?;
        match &kind {
            OrderKind::Market => {}
            OrderKind::Limit { price, .. } => {
                ensure_positive("price", *price)?;
            }
            OrderKind::StopLimit { stop_price, limit_price, .. } => {
                ensure_positive("stopPrice", *stop_price)?;
                ensure_positive("price", *limit_price)?;
            }
        }
        Ok(OrderRequest { symbol, side, quantity, kind })
    }

    /// Venue name of the order type.
    /// Stop-limit is called "STOP" by the futures API.
    pub fn venue_type(&self) -> &'static str {
        match self.kind {
            OrderKind::Market => "MARKET",
            OrderKind::Limit { .. } => "LIMIT",
            OrderKind::StopLimit { .. } => "STOP",
        }
    }

    /// Human readable description, e.g. "Futures LIMIT SELL ETHUSDT"
    pub fn description(&self) -> String {
        let label = match self.kind {
            OrderKind::Market => "MARKET",
            OrderKind::Limit { .. } => "LIMIT",
            OrderKind::StopLimit { .. } => "STOP-LIMIT",
        };
        format!("Futures {} {} {}", label, self.side, self.symbol)
    }

    /// Build the `create_order` call of this request.
    pub fn to_call(&self) -> VenueCall {
        let mut params = Params::new();
        params.insert("symbol".to_string(), self.symbol.clone());
        params.insert("side".to_string(), self.side.to_string());
        params.insert("type".to_string(), self.venue_type().to_string());
        params.insert("quantity".to_string(), self.quantity.to_string());

        match &self.kind {
            OrderKind::Market => {}
            OrderKind::Limit { price, time_in_force } => {
                params.insert("price".to_string(), price.to_string());
                params.insert("timeInForce".to_string(), time_in_force.to_string());
            }
            // limit price goes into the generic `price` field, trigger into `stopPrice`
            OrderKind::StopLimit { stop_price, limit_price, time_in_force } => {
                params.insert("price".to_string(), limit_price.to_string());
                params.insert("stopPrice".to_string(), stop_price.to_string());
                params.insert("timeInForce".to_string(), time_in_force.to_string());
            }
        }

        VenueCall { operation: Operation::CreateOrder, params }
    }
}

impl VenueCall {
    pub fn mark_price(symbol: &str) -> VenueCall {
        let mut params = Params::new();
        params.insert("symbol".to_string(), symbol.to_string());
        VenueCall { operation: Operation::MarkPrice, params }
    }
}

/// Scalar field of a response as text.
fn field_text(response: &serde_json::Value, key: &str) -> Option<String> {
    match response.get(key)? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

impl OrderSnapshot {
    /// View over a raw order response, `None` if it is not an object.
    pub fn from_response(response: &serde_json::Value) -> Option<OrderSnapshot> {
        if !response.is_object() {
            return None;
        }
        Some(OrderSnapshot {
            order_id: field_text(response, "orderId"),
            client_order_id: field_text(response, "clientOrderId"),
            status: field_text(response, "status"),
            avg_price: field_text(response, "avgPrice"),
            executed_qty: field_text(response, "executedQty"),
        })
    }
}

/// `markPrice` of a mark price response.
// https://binance-docs.github.io/apidocs/futures/en/#mark-price
pub fn mark_price_of(response: &serde_json::Value) -> Option<String> {
    field_text(response, "markPrice")
}

impl fmt::Display for OrderSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== ORDER RESULT ===")?;
        writeln!(f, "Order ID       : {}", self.order_id.as_deref().unwrap_or("None"))?;
        writeln!(f, "Client Order ID: {}", self.client_order_id.as_deref().unwrap_or("None"))?;
        writeln!(f, "Status         : {}", self.status.as_deref().unwrap_or("None"))?;
        writeln!(f, "Avg Price      : {}", self.avg_price.as_deref().unwrap_or("N/A"))?;
        writeln!(f, "Executed Qty   : {}", self.executed_qty.as_deref().unwrap_or("0"))?;
        write!(f, "====================")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn side_parses_any_case() {
        assert_eq!("buy".parse::<Side>(), Ok(Side::Buy));
        assert_eq!(" Sell ".parse::<Side>(), Ok(Side::Sell));
        assert!("hold".parse::<Side>().is_err());
    }

    #[test]
    fn symbol_is_uppercased_and_checked() {
        assert_eq!(normalize_symbol("btcusdt"), Ok("BTCUSDT".to_string()));
        assert_eq!(normalize_symbol("  "), Err(RequestError::EmptySymbol));
        assert!(matches!(normalize_symbol("btc/usdt"), Err(RequestError::MalformedSymbol(_))));
    }

    #[test]
    fn non_ascii_input_is_not_folded_into_valid_identifiers() {
        // 'ß' uppercases to "SS" and 'ſ' to 'S' under full Unicode rules
        assert!(matches!(normalize_symbol("btcß"), Err(RequestError::MalformedSymbol(_))));
        assert!("ſell".parse::<Side>().is_err());
    }

    #[test]
    fn rejects_non_positive_amounts() {
        let err = OrderRequest::new("BTCUSDT", "BUY", dec!(0), OrderKind::Market).unwrap_err();
        assert_eq!(err, RequestError::NotPositive { field: "quantity", value: "0".to_string() });

        let kind = OrderKind::StopLimit {
            stop_price: dec!(-1),
            limit_price: dec!(100),
            time_in_force: TimeInForce::Gtc,
        };
        let err = OrderRequest::new("BTCUSDT", "SELL", dec!(1), kind).unwrap_err();
        assert!(matches!(err, RequestError::NotPositive { field: "stopPrice", .. }));
    }

    #[test]
    fn stop_limit_maps_to_stop_type() {
        let kind = OrderKind::StopLimit {
            stop_price: dec!(59000),
            limit_price: dec!(58900),
            time_in_force: TimeInForce::Ioc,
        };
        let req = OrderRequest::new("btcusdt", "sell", dec!(0.002), kind).unwrap();
        let call = req.to_call();

        assert_eq!(req.description(), "Futures STOP-LIMIT SELL BTCUSDT");
        assert_eq!(call.operation, Operation::CreateOrder);
        assert_eq!(call.params["type"], "STOP");
        assert_eq!(call.params["price"], "58900");
        assert_eq!(call.params["stopPrice"], "59000");
        assert_eq!(call.params["timeInForce"], "IOC");
    }

    #[test]
    fn snapshot_defaults_missing_fields() {
        let response = serde_json::json!({"orderId": 42, "status": "NEW", "clientOrderId": "abc"});
        let snapshot = OrderSnapshot::from_response(&response).unwrap();
        let printed = snapshot.to_string();

        assert!(printed.contains("Order ID       : 42"));
        assert!(printed.contains("Avg Price      : N/A"));
        assert!(printed.contains("Executed Qty   : 0"));
    }

    #[test]
    fn snapshot_accepts_numbers_and_strings() {
        let response = serde_json::json!({"orderId": "42", "avgPrice": 65000.5, "executedQty": "0.010"});
        let snapshot = OrderSnapshot::from_response(&response).unwrap();

        assert_eq!(snapshot.order_id.as_deref(), Some("42"));
        assert_eq!(snapshot.avg_price.as_deref(), Some("65000.5"));
        assert_eq!(snapshot.executed_qty.as_deref(), Some("0.010"));
        assert_eq!(OrderSnapshot::from_response(&serde_json::json!([1, 2])), None);
    }

    #[test]
    fn mark_price_read_without_symbol() {
        let response = serde_json::json!({"markPrice": "65000.10"});
        assert_eq!(mark_price_of(&response).as_deref(), Some("65000.10"));
        assert_eq!(mark_price_of(&serde_json::json!({})), None);
    }
}
