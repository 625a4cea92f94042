/// Production base url of USDT-M futures REST API
pub const FUTURES_MAINNET_URL: &str = "https://fapi.binance.com";

/// Testnet base url of USDT-M futures REST API.
/// Testnet keys are rejected by production endpoint, so this has to be used
/// whenever session is created for testnet.
pub const FUTURES_TESTNET_URL: &str = "https://testnet.binancefuture.com";

pub const CREATE_ORDER_PATH: &str = "/fapi/v1/order";
pub const MARK_PRICE_PATH: &str = "/fapi/v1/premiumIndex";

/// Header carrying api-key for signed endpoints
pub const API_KEY_HEADER: &str = "X-MBX-APIKEY";

/// Milliseconds the request stays valid after its timestamp
pub const DEFAULT_RECV_WINDOW_MS: u64 = 5000;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_LOG_FILE: &str = "trading_bot.log";
pub const DEFAULT_SYMBOL: &str = "BTCUSDT";

pub const ENV_API_KEY: &str = "BINANCE_API_KEY";
pub const ENV_API_SECRET: &str = "BINANCE_API_SECRET";
