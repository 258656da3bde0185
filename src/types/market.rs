//! Exchange market-data and order types.

use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Candle intervals accepted by the exchange.
pub const TIMEFRAMES: &[&str] = &[
    "1s", "1m", "3m", "5m", "15m", "30m", "1h", "2h", "4h", "6h", "8h", "12h", "1d", "3d", "1w",
    "1M",
];

/// Default candle interval.
pub const DEFAULT_TIMEFRAME: &str = "1h";

/// Default and maximum number of candles per request.
pub const DEFAULT_CANDLE_LIMIT: u32 = 100;
pub const MAX_CANDLE_LIMIT: u32 = 1000;

/// Normalize a trading pair to exchange form: `btc/usdt`, `BTC-USDT` → `BTCUSDT`.
pub fn normalize_symbol(raw: &str) -> Result<String> {
    let symbol: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '/' | '-' | '_'))
        .collect::<String>()
        .to_uppercase();

    if symbol.is_empty() {
        return Err(AppError::InvalidParams("symbol cannot be empty".into()));
    }
    if !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AppError::InvalidParams(format!("invalid trading symbol '{}'", raw)));
    }
    Ok(symbol)
}

/// A validated candle interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Timeframe(&'static str);

impl Timeframe {
    /// Interval string as the exchange expects it.
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl Default for Timeframe {
    fn default() -> Self {
        Self(DEFAULT_TIMEFRAME)
    }
}

impl FromStr for Timeframe {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        TIMEFRAMES.iter().find(|tf| **tf == trimmed).map(|tf| Timeframe(*tf)).ok_or_else(|| {
            AppError::InvalidParams(format!(
                "unsupported timeframe '{}', expected one of {}",
                s,
                TIMEFRAMES.join(", ")
            ))
        })
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Latest ticker for a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    pub symbol: String,
    pub price: f64,
    pub bid: f64,
    pub ask: f64,
    /// Base-asset volume over the last 24h.
    pub volume: f64,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

/// One OHLCV candle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Open time in milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Balance of a single asset on the exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetBalance {
    pub asset: String,
    pub free: Decimal,
    pub locked: Decimal,
    pub total: Decimal,
}

/// Non-zero exchange balances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeBalances {
    pub balances: Vec<AssetBalance>,
}

/// Order direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Exchange wire form.
    pub fn as_exchange_str(self) -> &'static str {
        match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        }
    }
}

/// Order type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    #[default]
    Market,
    Limit,
}

impl OrderType {
    /// Exchange wire form.
    pub fn as_exchange_str(self) -> &'static str {
        match self {
            OrderType::Market => "MARKET",
            OrderType::Limit => "LIMIT",
        }
    }
}

/// Parameters for placing an order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderRequest {
    /// Trading pair (normalized by [`OrderRequest::validate`]).
    pub symbol: String,
    pub side: OrderSide,
    #[serde(default)]
    pub order_type: OrderType,
    /// Quantity in base asset units.
    pub amount: Decimal,
    /// Limit price in quote units.
    #[serde(default)]
    pub price: Option<Decimal>,
    /// Caller-supplied notional in USD. Only raises the evaluated notional.
    #[serde(default)]
    pub notional_usd: Option<Decimal>,
}

impl OrderRequest {
    /// Normalize the symbol and check amounts.
    pub fn validate(mut self) -> Result<Self> {
        self.symbol = normalize_symbol(&self.symbol)?;

        if self.amount <= Decimal::ZERO {
            return Err(AppError::InvalidParams("amount must be greater than zero".into()));
        }
        if matches!(self.price, Some(p) if p <= Decimal::ZERO) {
            return Err(AppError::InvalidParams("price must be greater than zero".into()));
        }
        if matches!(self.notional_usd, Some(n) if n <= Decimal::ZERO) {
            return Err(AppError::InvalidParams("notional_usd must be greater than zero".into()));
        }
        if self.order_type == OrderType::Limit && self.price.is_none() {
            return Err(AppError::InvalidParams("limit orders require a price".into()));
        }
        Ok(self)
    }

    /// Notional value used for risk checks.
    ///
    /// With a price the larger of `notional_usd` and `amount * price` counts, so a
    /// declared notional can never understate the order. Market orders without a
    /// price rely on `notional_usd`, which also sizes them on the exchange.
    pub fn notional(&self) -> Result<Decimal> {
        let priced = match self.price {
            Some(price) => Some(self.amount.checked_mul(price).ok_or_else(|| {
                AppError::InvalidParams("order notional overflows decimal range".into())
            })?),
            None => None,
        };

        match (self.notional_usd, priced) {
            (Some(declared), Some(priced)) => Ok(declared.max(priced)),
            (Some(notional), None) | (None, Some(notional)) => Ok(notional),
            (None, None) => Err(AppError::InvalidParams(
                "market orders need either `price` or `notional_usd` to evaluate risk limits"
                    .into(),
            )),
        }
    }
}

/// Outcome of an order placement, real or simulated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderResult {
    pub id: String,
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub amount: Decimal,
    pub price: Option<Decimal>,
    pub notional_usd: Decimal,
    /// Exchange order status in lowercase, or `dry_run`.
    pub status: String,
    pub message: Option<String>,
}

impl OrderResult {
    /// Simulated result carrying the request's details.
    pub fn dry_run(request: &OrderRequest, notional_usd: Decimal) -> Self {
        Self {
            id: "dry_run_order".to_string(),
            symbol: request.symbol.clone(),
            side: request.side,
            order_type: request.order_type,
            amount: request.amount,
            price: request.price,
            notional_usd,
            status: DRY_RUN_STATUS.to_string(),
            message: Some("This was a dry run - no actual order was placed".to_string()),
        }
    }
}

/// Parameters for cancelling an order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CancelRequest {
    pub symbol: String,
    pub order_id: String,
}

impl CancelRequest {
    /// Normalize the symbol and check the order id.
    pub fn validate(mut self) -> Result<Self> {
        self.symbol = normalize_symbol(&self.symbol)?;
        self.order_id = self.order_id.trim().to_string();
        if self.order_id.is_empty() {
            return Err(AppError::InvalidParams("order_id cannot be empty".into()));
        }
        Ok(self)
    }
}

/// Outcome of an order cancellation, real or simulated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelResult {
    pub order_id: String,
    pub symbol: String,
    pub status: String,
    pub message: Option<String>,
}

impl CancelResult {
    /// Simulated result carrying the request's details.
    pub fn dry_run(request: &CancelRequest) -> Self {
        Self {
            order_id: request.order_id.clone(),
            symbol: request.symbol.clone(),
            status: DRY_RUN_STATUS.to_string(),
            message: Some("This was a dry run - no order was cancelled".to_string()),
        }
    }
}

/// Status tag of simulated state-changing results.
pub const DRY_RUN_STATUS: &str = "dry_run";
