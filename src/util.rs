use crate::error::ConfigError;
use crate::types::Params;

use env_logger::{Builder, Target};
use log::LevelFilter;
use ring::hmac;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Current unix timestamp in milliseconds.
pub fn get_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Form-urlencode parameters in the order of the map.
pub fn encode_params(params: &Params) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter())
        .finish()
}

/// Lowercase hex of HMAC-SHA256 over `payload` keyed by `secret`.
pub fn sign(secret: &str, payload: &str) -> String {
    let key = hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes());
    let tag = hmac::sign(&key, payload.as_bytes());
    hex::encode(tag.as_ref())
}

/// Build the final signed query string.
/// `recvWindow` and `timestamp` are appended after the call's own parameters,
/// then the signature over everything before it.
pub fn signed_query(secret: &str, params: &Params, recv_window_ms: u64, timestamp_ms: u64) -> String {
    let mut query = encode_params(params);
    if !query.is_empty() {
        query.push('&');
    }
    query.push_str(&format!("recvWindow={}&timestamp={}", recv_window_ms, timestamp_ms));
    let signature = sign(secret, &query);
    format!("{}&signature={}", query, signature)
}

/// Mark the start of measurement.
pub fn measure_start(start: &mut Instant) {
    *start = Instant::now();
}

/// Print elapsed time since `start` if `print` is set.
pub fn measure_end(start: &Instant, print: bool) {
    if print {
        println!("(elapsed {:.3} secs)", start.elapsed().as_secs_f64());
    }
}

/// Writes every log line to stderr and to the log file.
struct TeeWriter {
    file: File,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.file.flush()
    }
}

/// Install global logger at INFO level, overridable via RUST_LOG.
/// Lines look like `2024-01-01T00:00:00Z [INFO] futorder::session - Client initialized (testnet=true)`.
///
/// If the log file cannot be opened the logger still gets installed writing
/// to stderr only, and the open failure is returned.
pub fn init_logger(log_file: &Path) -> Result<(), ConfigError> {
    let opened = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .map_err(|source| ConfigError::LogFile { path: log_file.to_path_buf(), source });

    let (target, opened) = match opened {
        Ok(file) => (Target::Pipe(Box::new(TeeWriter { file })), Ok(())),
        Err(e) => (Target::Stderr, Err(e)),
    };

    Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .format(|buf, record| {
            writeln!(buf, "{} [{}] {} - {}", buf.timestamp(), record.level(), record.target(), record.args())
        })
        .target(target)
        .try_init()
        .map_err(|e| ConfigError::Logger(e.to_string()))?;

    opened
}

#[cfg(test)]
mod tests {
    use super::*;

    // https://binance-docs.github.io/apidocs/futures/en/#signed-trade-and-user_data-endpoint-security
    const DOC_SECRET: &str = "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j";

    #[test]
    fn sign_matches_documented_vector() {
        let payload = "symbol=LTCBTC&side=BUY&type=LIMIT&timeInForce=GTC&quantity=1&price=0.1&recvWindow=5000&timestamp=1499827319559";
        assert_eq!(
            sign(DOC_SECRET, payload),
            "c8db56825ae71d6d79447849e617115f4a920fa2acdcab2b053c4b2838bd6b71"
        );
    }

    #[test]
    fn signed_query_appends_window_timestamp_and_signature() {
        let mut params = Params::new();
        params.insert("symbol".to_string(), "BTCUSDT".to_string());
        params.insert("side".to_string(), "BUY".to_string());

        let query = signed_query("secret", &params, 5000, 1700000000000);
        let unsigned = "side=BUY&symbol=BTCUSDT&recvWindow=5000&timestamp=1700000000000";

        assert_eq!(query, format!("{}&signature={}", unsigned, sign("secret", unsigned)));
    }

    #[test]
    fn logger_falls_back_to_stderr_when_file_cannot_be_opened() {
        let path = Path::new("/nonexistent_dir/x/trading_bot.log");

        let err = init_logger(path).unwrap_err();
        assert!(matches!(err, ConfigError::LogFile { .. }));
        assert!(err.to_string().contains("/nonexistent_dir/x/trading_bot.log"));

        assert_ne!(log::max_level(), LevelFilter::Off);
        assert!(log::log_enabled!(log::Level::Error));
    }

    #[test]
    fn signed_query_without_params() {
        let query = signed_query("secret", &Params::new(), 5000, 1);
        assert!(query.starts_with("recvWindow=5000&timestamp=1&signature="));
    }
}
