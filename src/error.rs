//! Error types of the order facade and its venue session

use thiserror::Error;

/// Error codes the venue uses when it rejects the credentials, the signature
/// or the timestamp of a request rather than its business parameters.
pub const AUTH_ERROR_CODES: &[i64] = &[-1021, -1022, -2014, -2015];

/// Tag of a failure as seen by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Authentication,
    Validation,
    Transport,
    Unexpected,
    /// Rejected locally, never sent to the venue
    InvalidRequest,
}

/// Classified failure of a single venue call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VenueError {
    #[error("APIError(code={code}): {message}")]
    Authentication { code: i64, message: String },

    #[error("APIError(code={code}): {message}")]
    Validation { code: i64, message: String },

    #[error("{0}")]
    Transport(String),

    #[error("{0}")]
    Unexpected(String),
}

impl VenueError {
    /// Classify an error payload returned by the venue.
    pub fn from_venue(code: i64, message: impl Into<String>) -> Self {
        let message = message.into();
        if AUTH_ERROR_CODES.contains(&code) {
            VenueError::Authentication { code, message }
        } else {
            VenueError::Validation { code, message }
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            VenueError::Authentication { .. } => FailureKind::Authentication,
            VenueError::Validation { .. } => FailureKind::Validation,
            VenueError::Transport(_) => FailureKind::Transport,
            VenueError::Unexpected(_) => FailureKind::Unexpected,
        }
    }

    /// Numeric venue code, only present for errors the venue itself reported.
    pub fn code(&self) -> Option<i64> {
        match self {
            VenueError::Authentication { code, .. } | VenueError::Validation { code, .. } => {
                Some(*code)
            }
            _ => None,
        }
    }
}

impl From<isahc::Error> for VenueError {
    fn from(e: isahc::Error) -> Self {
        VenueError::Transport(e.to_string())
    }
}

impl From<isahc::http::Error> for VenueError {
    fn from(e: isahc::http::Error) -> Self {
        VenueError::Unexpected(format!("cannot build request: {}", e))
    }
}

/// Order request rejected before reaching the venue.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("symbol must not be empty")]
    EmptySymbol,

    #[error("symbol '{0}' contains characters other than A-Z and 0-9")]
    MalformedSymbol(String),

    #[error("side '{0}' is neither BUY nor SELL")]
    InvalidSide(String),

    #[error("time in force '{0}' is not one of GTC, IOC, FOK, GTX")]
    InvalidTimeInForce(String),

    #[error("{field} must be > 0, got {value}")]
    NotPositive { field: &'static str, value: String },
}

/// Errors while assembling the runtime configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("cannot read input: {0}")]
    Input(#[from] std::io::Error),

    #[error("cannot open log file {}: {source}, logging to stderr only", path.display())]
    LogFile {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("cannot install logger: {0}")]
    Logger(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_and_timestamp_codes_are_authentication() {
        for code in [-1021, -1022, -2014, -2015] {
            assert_eq!(
                VenueError::from_venue(code, "rejected").kind(),
                FailureKind::Authentication
            );
        }
    }

    #[test]
    fn business_codes_are_validation() {
        let err = VenueError::from_venue(-4164, "Order's notional must be no smaller than 100");
        assert_eq!(err.kind(), FailureKind::Validation);
        assert_eq!(err.code(), Some(-4164));
        assert_eq!(
            err.to_string(),
            "APIError(code=-4164): Order's notional must be no smaller than 100"
        );
    }

    #[test]
    fn transport_has_no_code() {
        assert_eq!(VenueError::Transport("timed out".into()).code(), None);
    }
}
