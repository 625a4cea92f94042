//! Order facade: turns order requests into venue calls and funnels every call
//! through `safe_call`, which never lets a failure escape.
//!
//! A failed call yields `None`. The cause is only visible through the
//! diagnostics channels, not through the return value.

use crate::diagnostics::{operator_message, Diagnostics};
use crate::error::{FailureKind, RequestError};
use crate::impls::normalize_symbol;
use crate::session::ExchangeSession;
use crate::types::{OrderKind, OrderRequest, TimeInForce, VenueCall};

use log::Level;
use rust_decimal::Decimal;
use serde_json::Value;

pub struct OrderFacade<S, D> {
    session: S,
    diagnostics: D,
}

impl<S: ExchangeSession, D: Diagnostics> OrderFacade<S, D> {
    pub fn new(session: S, diagnostics: D) -> Self {
        OrderFacade { session, diagnostics }
    }

    /// Log the attempt, invoke the session, log the outcome.
    /// Any error ends here: it is logged, reported to the operator, and
    /// turned into `None`.
    pub fn safe_call(&self, description: &str, call: &VenueCall) -> Option<Value> {
        self.diagnostics.record(
            Level::Info,
            &format!("API Request: {} | Operation: {} | Params: {:?}", description, call.operation, call.params),
        );

        match self.session.invoke(call) {
            Ok(response) => {
                self.diagnostics
                    .record(Level::Info, &format!("API Response ({}): {}", description, response));
                Some(response)
            }
            Err(e) => {
                self.diagnostics.record(
                    Level::Error,
                    &format!(
                        "{:?} error during {} | Operation: {} | Params: {:?} | Detail: {:?}",
                        e.kind(),
                        description,
                        call.operation,
                        call.params,
                        e
                    ),
                );
                self.diagnostics.notify(e.kind(), &operator_message(description, &e));
                None
            }
        }
    }

    /// Submit an already validated order request.
    pub fn place(&self, request: &OrderRequest) -> Option<Value> {
        self.safe_call(&request.description(), &request.to_call())
    }

    pub fn place_market(&self, symbol: &str, side: &str, quantity: Decimal) -> Option<Value> {
        self.place_checked("MARKET", symbol, side, OrderRequest::new(symbol, side, quantity, OrderKind::Market))
    }

    /// LIMIT order, good till cancel.
    pub fn place_limit(&self, symbol: &str, side: &str, quantity: Decimal, price: Decimal) -> Option<Value> {
        self.place_limit_with(symbol, side, quantity, price, TimeInForce::default())
    }

    pub fn place_limit_with(
        &self,
        symbol: &str,
        side: &str,
        quantity: Decimal,
        price: Decimal,
        time_in_force: TimeInForce,
    ) -> Option<Value> {
        let kind = OrderKind::Limit { price, time_in_force };
        self.place_checked("LIMIT", symbol, side, OrderRequest::new(symbol, side, quantity, kind))
    }

    /// STOP-LIMIT order, good till cancel. Triggered at `stop_price`,
    /// executed at `limit_price`.
    pub fn place_stop_limit(
        &self,
        symbol: &str,
        side: &str,
        quantity: Decimal,
        stop_price: Decimal,
        limit_price: Decimal,
    ) -> Option<Value> {
        self.place_stop_limit_with(symbol, side, quantity, stop_price, limit_price, TimeInForce::default())
    }

    pub fn place_stop_limit_with(
        &self,
        symbol: &str,
        side: &str,
        quantity: Decimal,
        stop_price: Decimal,
        limit_price: Decimal,
        time_in_force: TimeInForce,
    ) -> Option<Value> {
        let kind = OrderKind::StopLimit { stop_price, limit_price, time_in_force };
        self.place_checked("STOP-LIMIT", symbol, side, OrderRequest::new(symbol, side, quantity, kind))
    }

    /// Read-only, the raw response is returned as is.
    pub fn get_mark_price(&self, symbol: &str) -> Option<Value> {
        match normalize_symbol(symbol) {
            Ok(symbol) => self.safe_call(&format!("Get mark price for {}", symbol), &VenueCall::mark_price(&symbol)),
            Err(e) => self.reject(&format!("Get mark price for {}", symbol), &e),
        }
    }

    fn place_checked(
        &self,
        label: &str,
        symbol: &str,
        side: &str,
        request: Result<OrderRequest, RequestError>,
    ) -> Option<Value> {
        match request {
            Ok(request) => self.place(&request),
            Err(e) => self.reject(
                &format!("Futures {} {} {}", label, side.to_ascii_uppercase(), symbol.to_ascii_uppercase()),
                &e,
            ),
        }
    }

    /// Request failed local checks, nothing is sent.
    fn reject(&self, description: &str, err: &RequestError) -> Option<Value> {
        self.diagnostics
            .record(Level::Error, &format!("Rejected {} before sending: {}", description, err));
        self.diagnostics
            .notify(FailureKind::InvalidRequest, &format!("Invalid order request for {}: {}", description, err));
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VenueError;
    use std::cell::RefCell;

    struct FailingSession(VenueError);

    impl ExchangeSession for FailingSession {
        fn invoke(&self, _call: &VenueCall) -> Result<Value, VenueError> {
            Err(self.0.clone())
        }
    }

    #[derive(Default)]
    struct Capture {
        logs: RefCell<Vec<(Level, String)>>,
        notes: RefCell<Vec<(FailureKind, String)>>,
    }

    impl Diagnostics for Capture {
        fn record(&self, level: Level, message: &str) {
            self.logs.borrow_mut().push((level, message.to_string()));
        }

        fn notify(&self, kind: FailureKind, message: &str) {
            self.notes.borrow_mut().push((kind, message.to_string()));
        }
    }

    #[test]
    fn safe_call_absorbs_unexpected_error() {
        let capture = Capture::default();
        let facade = OrderFacade::new(FailingSession(VenueError::Unexpected("boom".into())), &capture);

        assert_eq!(facade.safe_call("probe", &VenueCall::mark_price("BTCUSDT")), None);

        let logs = capture.logs.borrow();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].0, Level::Info);
        assert!(logs[0].1.contains("API Request: probe"));
        assert_eq!(logs[1].0, Level::Error);
        assert_eq!(
            capture.notes.borrow().as_slice(),
            &[(FailureKind::Unexpected, "Unexpected error during probe: boom".to_string())]
        );
    }

    #[test]
    fn invalid_side_never_reaches_session() {
        struct Unreachable;
        impl ExchangeSession for Unreachable {
            fn invoke(&self, _call: &VenueCall) -> Result<Value, VenueError> {
                panic!("session must not be called");
            }
        }

        let capture = Capture::default();
        let facade = OrderFacade::new(Unreachable, &capture);

        assert_eq!(facade.place_market("BTCUSDT", "hold", Decimal::ONE), None);
        let notes = capture.notes.borrow();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].0, FailureKind::InvalidRequest);
        assert!(notes[0].1.contains("'hold'"));
    }
}
