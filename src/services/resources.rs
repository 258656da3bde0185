//! Read-only resource queries.
//!
//! Resources bypass risk limits and the safety gate. They never fail because a
//! service is missing or unreachable; they yield an empty list instead.

use crate::{
    dispatch::Dispatcher,
    error::{AppError, Result},
    policy::Capability,
    types::{normalize_symbol, Candle, Timeframe},
    wallets::WalletInfo,
};

/// URI of the wallet listing.
pub const WALLETS_URI: &str = "wallets://";

/// Prefix of `candles://{venue}/{symbol}/{timeframe}`.
pub const CANDLES_URI_PREFIX: &str = "candles://";

/// Candles returned per resource read.
pub const CANDLE_RESOURCE_LIMIT: u32 = 100;

/// A parsed candle resource URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandleQuery {
    pub venue: String,
    pub symbol: String,
    pub timeframe: Timeframe,
}

impl CandleQuery {
    /// Parse `candles://binance/BTC-USDT/1h`.
    pub fn from_uri(uri: &str) -> Result<Self> {
        let path = uri
            .strip_prefix(CANDLES_URI_PREFIX)
            .ok_or_else(|| AppError::InvalidParams(format!("not a candles URI: {}", uri)))?;

        let parts: Vec<&str> = path.split('/').collect();
        let [venue, symbol, timeframe] = parts.as_slice() else {
            return Err(AppError::InvalidParams(format!(
                "expected candles://{{venue}}/{{symbol}}/{{timeframe}}, got {}",
                uri
            )));
        };
        if venue.is_empty() {
            return Err(AppError::InvalidParams("venue cannot be empty".into()));
        }

        Ok(Self {
            venue: venue.to_ascii_lowercase(),
            symbol: normalize_symbol(symbol)?,
            timeframe: timeframe.parse()?,
        })
    }
}

/// All wallets, EVM first, in creation order.
pub async fn wallet_listing(dispatcher: &Dispatcher) -> Vec<WalletInfo> {
    dispatcher.wallets().list(None).await
}

/// Up to [`CANDLE_RESOURCE_LIMIT`] candles, oldest first.
pub async fn candle_listing(dispatcher: &Dispatcher, query: &CandleQuery) -> Vec<Candle> {
    if !dispatcher.registry().is_available(Capability::ExchangeTrading) {
        tracing::info!(venue = %query.venue, "Exchange not configured; empty candle resource");
        return Vec::new();
    }
    let Some(exchange) = &dispatcher.collaborators().exchange else {
        return Vec::new();
    };
    if exchange.venue() != query.venue {
        tracing::warn!(venue = %query.venue, "Candle resource requested for unsupported venue");
        return Vec::new();
    }

    match exchange.candles(&query.symbol, query.timeframe, CANDLE_RESOURCE_LIMIT).await {
        Ok(candles) => candles,
        Err(err) => {
            tracing::error!(
                venue = %query.venue,
                symbol = %query.symbol,
                timeframe = %query.timeframe,
                error = %err,
                "Failed to fetch candles for resource"
            );
            Vec::new()
        }
    }
}
