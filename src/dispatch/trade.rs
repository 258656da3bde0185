//! Decoded requests of state-changing actions.

use rust_decimal::Decimal;
use serde_json::Value;

use super::{action::Action, params::decode};
use crate::{
    error::{AppError, Result},
    types::{CancelRequest, OrderRequest},
};

/// A validated state-changing request, ready for risk limits and the safety gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trade {
    Place { order: OrderRequest, notional_usd: Decimal },
    Cancel(CancelRequest),
}

impl Trade {
    /// Decode and validate the parameters of a state-changing action.
    pub fn decode(action: Action, params: Value) -> Result<Self> {
        match action {
            Action::PlaceOrder => {
                let order = decode::<OrderRequest>(params)?.validate()?;
                let notional_usd = order.notional()?;
                Ok(Trade::Place { order, notional_usd })
            }
            Action::CancelOrder => Ok(Trade::Cancel(decode::<CancelRequest>(params)?.validate()?)),
            other => Err(AppError::InvalidParams(format!(
                "{} has no state-changing request form",
                other
            ))),
        }
    }

    /// Notional subject to the order limits. Cancellations carry none.
    pub fn notional(&self) -> Option<Decimal> {
        match self {
            Trade::Place { notional_usd, .. } => Some(*notional_usd),
            Trade::Cancel(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample(action: Action) -> Value {
        match action {
            Action::PlaceOrder => {
                json!({"symbol": "eth/usdt", "side": "buy", "amount": "2", "price": "10"})
            }
            Action::CancelOrder => json!({"symbol": "ETHUSDT", "order_id": " 9 "}),
            other => panic!("no sample request for {}", other),
        }
    }

    #[test]
    fn test_every_state_changing_action_decodes() {
        for action in Action::ALL.into_iter().filter(|a| a.is_state_changing()) {
            assert!(Trade::decode(action, sample(action)).is_ok(), "{} did not decode", action);
        }
    }

    #[test]
    fn test_read_actions_have_no_trade_form() {
        for action in Action::ALL.into_iter().filter(|a| !a.is_state_changing()) {
            let err = Trade::decode(action, Value::Null).unwrap_err();
            assert!(matches!(err, AppError::InvalidParams(_)), "{}", action);
        }
    }

    #[test]
    fn test_place_carries_evaluated_notional() {
        let trade = Trade::decode(Action::PlaceOrder, sample(Action::PlaceOrder)).unwrap();
        assert_eq!(trade.notional(), Some(Decimal::from(20)));
        match trade {
            Trade::Place { order, .. } => assert_eq!(order.symbol, "ETHUSDT"),
            other => panic!("expected an order, got {:?}", other),
        }
    }

    #[test]
    fn test_cancel_has_no_notional() {
        let trade = Trade::decode(Action::CancelOrder, sample(Action::CancelOrder)).unwrap();
        assert_eq!(trade.notional(), None);
        assert!(matches!(trade, Trade::Cancel(ref req) if req.order_id == "9"));
    }
}
