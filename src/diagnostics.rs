//! Diagnostics channels of the facade: structured log entries for the log
//! file, and short messages for the operator at the terminal.

use crate::error::{FailureKind, VenueError};

use log::Level;

/// Guidance shown to the operator for well-known venue error codes.
pub static GUIDANCE: &[(i64, &str)] = &[
    (
        -1022,
        "Invalid signature (-1022).\n\
         Check that:\n  \
         * You are using TESTNET keys\n  \
         * You pasted API key/secret on a single line\n  \
         * System time is correct.",
    ),
    (
        -4164,
        "Order notional too small (-4164).\n\
         Increase quantity so that price * quantity >= 100 USDT\n\
         and ensure you have enough margin in Futures wallet.",
    ),
    (
        -1021,
        "Timestamp outside of recvWindow (-1021).\n\
         Sync your system clock with an internet time server.",
    ),
    (
        -2015,
        "Invalid API key, IP or permissions (-2015).\n\
         Check that the key has Futures enabled and your IP is whitelisted.",
    ),
    (
        -2019,
        "Margin is insufficient (-2019).\n\
         Transfer funds into Futures wallet or reduce quantity.",
    ),
    (
        -1111,
        "Precision is over the maximum defined for this asset (-1111).\n\
         Round quantity/price to the symbol's step and tick size.",
    ),
    (
        -1121,
        "Invalid symbol (-1121).\n\
         Use a USDT-M futures symbol such as BTCUSDT.",
    ),
];

pub fn guidance_for(code: i64) -> Option<&'static str> {
    GUIDANCE.iter().find(|(c, _)| *c == code).map(|(_, text)| *text)
}

/// Short operator message for a failed call described by `description`.
pub fn operator_message(description: &str, err: &VenueError) -> String {
    match err {
        VenueError::Authentication { code, message } | VenueError::Validation { code, message } => {
            match guidance_for(*code) {
                Some(text) => text.to_string(),
                None => format!("{} failed: {} (code {})", description, message, code),
            }
        }
        VenueError::Transport(detail) => format!("Network/HTTP error during {}: {}", description, detail),
        VenueError::Unexpected(detail) => format!("Unexpected error during {}: {}", description, detail),
    }
}

/// Logging capability handed to the facade.
pub trait Diagnostics {
    /// Structured log entry
    fn record(&self, level: Level, message: &str);

    /// Message for the operator, tagged with what went wrong
    fn notify(&self, kind: FailureKind, message: &str);
}

impl<T: Diagnostics + ?Sized> Diagnostics for &T {
    fn record(&self, level: Level, message: &str) {
        (**self).record(level, message)
    }

    fn notify(&self, kind: FailureKind, message: &str) {
        (**self).notify(kind, message)
    }
}

/// Forwards log entries to the `log` facade and prints operator messages
/// to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleDiagnostics;

impl Diagnostics for ConsoleDiagnostics {
    fn record(&self, level: Level, message: &str) {
        log::log!(target: "futorder::facade", level, "{}", message);
    }

    fn notify(&self, _kind: FailureKind, message: &str) {
        println!("[ERROR] {}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_have_guidance() {
        assert!(guidance_for(-1022).unwrap().contains("System time is correct"));
        assert!(guidance_for(-4164).unwrap().contains("price * quantity >= 100 USDT"));
        assert_eq!(guidance_for(-9999), None);
    }

    #[test]
    fn codes_are_unique() {
        let mut codes: Vec<i64> = GUIDANCE.iter().map(|(c, _)| *c).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), GUIDANCE.len());
    }

    #[test]
    fn unknown_code_falls_back_to_generic() {
        let err = VenueError::Validation { code: -1102, message: "Mandatory parameter 'price' was not sent".into() };
        assert_eq!(
            operator_message("Futures LIMIT BUY BTCUSDT", &err),
            "Futures LIMIT BUY BTCUSDT failed: Mandatory parameter 'price' was not sent (code -1102)"
        );
    }

    #[test]
    fn transport_and_unexpected_have_own_category() {
        let msg = operator_message("Get mark price for BTCUSDT", &VenueError::Transport("timed out".into()));
        assert_eq!(msg, "Network/HTTP error during Get mark price for BTCUSDT: timed out");

        let msg = operator_message("Get mark price for BTCUSDT", &VenueError::Unexpected("boom".into()));
        assert_eq!(msg, "Unexpected error during Get mark price for BTCUSDT: boom");
    }
}
