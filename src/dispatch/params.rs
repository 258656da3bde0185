//! Parameter payloads of the non-order actions.

use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;

use crate::error::{AppError, Result};

/// Decode an action's parameters; `null` counts as an empty object.
pub fn decode<T: DeserializeOwned>(params: Value) -> Result<T> {
    let params = match params {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    serde_json::from_value(params).map_err(|e| AppError::InvalidParams(e.to_string()))
}

#[derive(Debug, Deserialize)]
pub struct SymbolParams {
    pub symbol: String,
}

#[derive(Debug, Deserialize)]
pub struct OhlcvParams {
    pub symbol: String,
    #[serde(default)]
    pub timeframe: Option<String>,
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct EthBalanceParams {
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SolBalanceParams {
    #[serde(default)]
    pub pubkey: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateWalletParams {
    pub chain: String,
}

#[derive(Debug, Deserialize)]
pub struct ListWalletsParams {
    #[serde(default)]
    pub chain: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AiQueryParams {
    pub provider: String,
    pub prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct NotificationParams {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct PnlParams {
    pub pnl_usd: Decimal,
}
