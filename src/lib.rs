//! Order submission for Binance USDT-M futures.
//!
//! `OrderFacade` validates and normalizes MARKET, LIMIT and STOP-LIMIT
//! orders, sends them through an `ExchangeSession`, and reports every
//! failure through its `Diagnostics` instead of returning an error.

pub mod defines;
pub mod diagnostics;
pub mod error;
pub mod facade;
pub mod impls;
pub mod session;
pub mod types;
pub mod util;

pub use diagnostics::{ConsoleDiagnostics, Diagnostics};
pub use error::{FailureKind, RequestError, VenueError};
pub use facade::OrderFacade;
pub use session::{BinanceFuturesSession, ExchangeSession};
pub use types::*;
