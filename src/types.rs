use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[clap(name="futorder")]
#[clap(about="futorder places MARKET, LIMIT and STOP-LIMIT orders on Binance USDT-M futures", long_about=None)]
pub struct CommandlineArgs {
    /// Execute against production instead of testnet
    #[clap(long)]
    pub mainnet: bool,

    /// File to append log lines to, in addition to stderr
    #[clap(long, parse(from_os_str), default_value=crate::defines::DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// Timeout in seconds of a single HTTP request
    #[clap(long, default_value_t=crate::defines::DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Without subcommand, interactive menu is started
    #[clap(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Place a MARKET order
    Market {
        #[clap(short='s', long)]
        symbol: String,

        /// BUY or SELL
        #[clap(long)]
        side: String,

        #[clap(short='q', long)]
        qty: Decimal,
    },

    /// Place a LIMIT order
    Limit {
        #[clap(short='s', long)]
        symbol: String,

        #[clap(long)]
        side: String,

        #[clap(short='q', long)]
        qty: Decimal,

        #[clap(short='p', long)]
        price: Decimal,

        #[clap(long, default_value="GTC")]
        tif: TimeInForce,
    },

    /// Place a STOP-LIMIT order (triggered at stop price, executed at limit price)
    StopLimit {
        #[clap(short='s', long)]
        symbol: String,

        #[clap(long)]
        side: String,

        #[clap(short='q', long)]
        qty: Decimal,

        #[clap(long)]
        stop_price: Decimal,

        #[clap(long)]
        limit_price: Decimal,

        #[clap(long, default_value="GTC")]
        tif: TimeInForce,
    },

    /// Fetch current mark price
    MarkPrice {
        #[clap(short='s', long)]
        symbol: String,
    },
}

/// `TradingContext` contains information needed to open a session against
/// the venue. It is read once at startup.
pub struct TradingContext {
    /// Set environment variable with name BINANCE_API_KEY
    pub api_key: String,

    /// Set environment variable with name BINANCE_API_SECRET
    pub api_secret: String,

    /// Whether or not to execute API against testnet
    pub use_testnet: bool,

    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimeInForce {
    #[default]
    Gtc,
    Ioc,
    Fok,
    /// Post only
    Gtx,
}

/// Kind-specific part of an order.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderKind {
    Market,
    Limit {
        price: Decimal,
        time_in_force: TimeInForce,
    },
    StopLimit {
        /// Trigger price
        stop_price: Decimal,
        /// Execution price once triggered
        limit_price: Decimal,
        time_in_force: TimeInForce,
    },
}

/// Validated description of an order to place.
/// Construct via `OrderRequest::new()` which normalizes and checks the input.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub symbol: String,
    pub side: Side,
    pub quantity: Decimal,
    pub kind: OrderKind,
}

/// Parameters of a venue call, in the order they are sent on the wire.
pub type Params = BTreeMap<String, String>;

/// Named remote operations a session can perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateOrder,
    MarkPrice,
}

/// A single call to the venue. Built per call and dropped afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct VenueCall {
    pub operation: Operation,
    pub params: Params,
}

/// Read-only view of an order response, used for printing.
/// Fields are taken as text whether the venue sends them as strings or
/// numbers; missing ones stay `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderSnapshot {
    pub order_id: Option<String>,
    pub client_order_id: Option<String>,
    pub status: Option<String>,
    pub avg_price: Option<String>,
    pub executed_qty: Option<String>,
}
