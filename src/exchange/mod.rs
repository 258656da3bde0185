//! Centralized exchange module.
//!
//! Contains the exchange connector trait and the Binance implementation.

pub mod binance;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::{
    error::Result,
    types::{
        CancelRequest, CancelResult, Candle, ExchangeBalances, OrderRequest, OrderResult, Ticker,
        Timeframe,
    },
};

pub use binance::BinanceClient;

/// Trading and market-data operations of a centralized exchange.
///
/// Implementations only forward requests; every safety decision is taken by
/// the dispatcher before these methods are called.
#[async_trait]
pub trait ExchangeConnector: Send + Sync {
    /// Venue identifier, e.g. `binance`.
    fn venue(&self) -> &str;

    /// Verify connectivity and credentials.
    async fn ping(&self) -> Result<()>;

    /// Latest ticker for a normalized symbol.
    async fn ticker(&self, symbol: &str) -> Result<Ticker>;

    /// Non-zero account balances.
    async fn balances(&self) -> Result<ExchangeBalances>;

    /// Candles ordered oldest to newest.
    async fn candles(&self, symbol: &str, timeframe: Timeframe, limit: u32) -> Result<Vec<Candle>>;

    /// Submit an order. `notional_usd` is the risk-checked value; it sizes
    /// market orders and is echoed into the result.
    async fn place_order(&self, order: &OrderRequest, notional_usd: Decimal)
        -> Result<OrderResult>;

    /// Cancel an open order.
    async fn cancel_order(&self, request: &CancelRequest) -> Result<CancelResult>;
}
