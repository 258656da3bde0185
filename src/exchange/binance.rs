//! Binance spot REST client.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::{Client, Method, Url};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use sha2::Sha256;

use super::ExchangeConnector;
use crate::{
    config::Config,
    error::{AppError, Result},
    types::{
        AssetBalance, CancelRequest, CancelResult, Candle, ExchangeBalances, OrderRequest,
        OrderResult, OrderType, Ticker, Timeframe,
    },
};

/// Production REST endpoint.
pub const BINANCE_API_URL: &str = "https://api.binance.com";

/// Spot testnet endpoint, used outside live mode.
pub const BINANCE_TESTNET_URL: &str = "https://testnet.binance.vision";

const RECV_WINDOW_MS: u64 = 5_000;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TickerResponse {
    symbol: String,
    last_price: String,
    bid_price: String,
    ask_price: String,
    volume: String,
    close_time: i64,
}

#[derive(Debug, Deserialize)]
struct AccountResponse {
    balances: Vec<BalanceEntry>,
}

#[derive(Debug, Deserialize)]
struct BalanceEntry {
    asset: String,
    free: Decimal,
    locked: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderResponse {
    order_id: u64,
    symbol: String,
    status: String,
    orig_qty: Decimal,
    #[serde(default)]
    price: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CancelResponse {
    order_id: u64,
    symbol: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: i64,
    msg: String,
}

/// Binance spot client.
pub struct BinanceClient {
    client: Client,
    base_url: String,
    api_key: SecretString,
    secret: SecretString,
}

impl BinanceClient {
    /// Create a client when exchange credentials are configured.
    ///
    /// Outside live mode requests go to the spot testnet.
    pub fn from_config(config: &Config) -> Result<Option<Self>> {
        let Some(creds) = config.exchange_credentials() else {
            tracing::warn!("Binance API key not configured");
            return Ok(None);
        };

        let base_url = if config.mode.is_live() { BINANCE_API_URL } else { BINANCE_TESTNET_URL };
        let client =
            Self::new(base_url, creds.api_key.expose_secret(), creds.secret.expose_secret())?;

        tracing::info!(base_url = %base_url, "Binance exchange initialized");
        Ok(Some(client))
    }

    /// Create a client against an explicit base URL.
    pub fn new(base_url: &str, api_key: &str, secret: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: SecretString::from(api_key.to_string()),
            secret: SecretString::from(secret.to_string()),
        })
    }

    /// Unauthenticated GET.
    async fn public<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url).query(query).send().await?;
        decode(response).await
    }

    /// Request signed with HMAC-SHA256 over the query string.
    async fn signed<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = self.signed_url(path, params, Utc::now().timestamp_millis())?;
        let response = self
            .client
            .request(method, url)
            .header("X-MBX-APIKEY", self.api_key.expose_secret())
            .send()
            .await?;
        decode(response).await
    }

    /// Endpoint URL with `params`, `recvWindow`, `timestamp` and the signature
    /// of everything before it.
    fn signed_url(&self, path: &str, params: &[(&str, String)], timestamp: i64) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| AppError::Config(format!("Invalid Binance URL: {}", e)))?;

        url.query_pairs_mut()
            .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())))
            .append_pair("recvWindow", &RECV_WINDOW_MS.to_string())
            .append_pair("timestamp", &timestamp.to_string());

        let signature = sign(self.secret.expose_secret(), url.query().unwrap_or_default())?;
        url.query_pairs_mut().append_pair("signature", &signature);
        Ok(url)
    }
}

#[async_trait]
impl ExchangeConnector for BinanceClient {
    fn venue(&self) -> &str {
        "binance"
    }

    async fn ping(&self) -> Result<()> {
        let _: AccountResponse = self.signed(Method::GET, "/api/v3/account", &[]).await?;
        tracing::info!("Exchange connection test successful");
        Ok(())
    }

    async fn ticker(&self, symbol: &str) -> Result<Ticker> {
        let raw: TickerResponse =
            self.public("/api/v3/ticker/24hr", &[("symbol", symbol.to_string())]).await?;

        Ok(Ticker {
            symbol: raw.symbol,
            price: parse_f64(&raw.last_price)?,
            bid: parse_f64(&raw.bid_price)?,
            ask: parse_f64(&raw.ask_price)?,
            volume: parse_f64(&raw.volume)?,
            timestamp: raw.close_time,
        })
    }

    async fn balances(&self) -> Result<ExchangeBalances> {
        let account: AccountResponse = self.signed(Method::GET, "/api/v3/account", &[]).await?;

        let balances = account
            .balances
            .into_iter()
            .map(|b| AssetBalance {
                total: b.free + b.locked,
                asset: b.asset,
                free: b.free,
                locked: b.locked,
            })
            .filter(|b| b.total > Decimal::ZERO)
            .collect();

        Ok(ExchangeBalances { balances })
    }

    async fn candles(&self, symbol: &str, timeframe: Timeframe, limit: u32) -> Result<Vec<Candle>> {
        let rows: Vec<Vec<Value>> = self
            .public(
                "/api/v3/klines",
                &[
                    ("symbol", symbol.to_string()),
                    ("interval", timeframe.as_str().to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;

        rows.iter().map(|row| parse_kline(row)).collect()
    }

    async fn place_order(
        &self,
        order: &OrderRequest,
        notional_usd: Decimal,
    ) -> Result<OrderResult> {
        let params = order_params(order, notional_usd);
        let raw: OrderResponse = self.signed(Method::POST, "/api/v3/order", &params).await?;
        tracing::info!(order_id = raw.order_id, status = %raw.status, "Order placed");

        Ok(OrderResult {
            id: raw.order_id.to_string(),
            symbol: raw.symbol,
            side: order.side,
            order_type: order.order_type,
            amount: raw.orig_qty,
            // Market orders report a zero price.
            price: raw.price.filter(|p| !p.is_zero()).or(order.price),
            notional_usd,
            status: raw.status.to_lowercase(),
            message: None,
        })
    }

    async fn cancel_order(&self, request: &CancelRequest) -> Result<CancelResult> {
        let params = [("symbol", request.symbol.clone()), ("orderId", request.order_id.clone())];
        let raw: CancelResponse = self.signed(Method::DELETE, "/api/v3/order", &params).await?;
        tracing::info!(order_id = raw.order_id, status = %raw.status, "Order cancelled");

        Ok(CancelResult {
            order_id: raw.order_id.to_string(),
            symbol: raw.symbol,
            status: raw.status.to_lowercase(),
            message: None,
        })
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(match serde_json::from_str::<ApiError>(&body) {
            Ok(err) => AppError::Exchange(format!("{} (code {})", err.msg, err.code)),
            Err(_) => AppError::Exchange(format!("HTTP {}: {}", status, body)),
        });
    }

    Ok(serde_json::from_str(&body)?)
}

/// Order parameters. Market orders are sized by the risk-checked notional
/// (`quoteOrderQty`) so the exchange never spends more than was evaluated.
fn order_params(order: &OrderRequest, notional_usd: Decimal) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("symbol", order.symbol.clone()),
        ("side", order.side.as_exchange_str().to_string()),
        ("type", order.order_type.as_exchange_str().to_string()),
    ];
    match (order.order_type, order.price) {
        (OrderType::Limit, Some(price)) => {
            params.push(("quantity", order.amount.normalize().to_string()));
            params.push(("price", price.normalize().to_string()));
            params.push(("timeInForce", "GTC".to_string()));
        }
        _ => params.push(("quoteOrderQty", notional_usd.normalize().to_string())),
    }
    params.push(("newOrderRespType", "RESULT".to_string()));
    params
}

fn sign(secret: &str, payload: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Config(format!("Invalid Binance secret: {}", e)))?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

fn parse_f64(raw: &str) -> Result<f64> {
    raw.parse::<f64>().map_err(|e| AppError::Parse(format!("invalid number '{}': {}", raw, e)))
}

/// Kline rows are `[openTime, open, high, low, close, volume, closeTime, ...]`
/// with prices encoded as strings.
fn parse_kline(row: &[Value]) -> Result<Candle> {
    let number = |idx: usize| -> Result<f64> {
        match row.get(idx) {
            Some(Value::String(s)) => parse_f64(s),
            Some(Value::Number(n)) => n
                .as_f64()
                .ok_or_else(|| AppError::Parse(format!("kline field {} out of range", idx))),
            _ => Err(AppError::Parse(format!("kline field {} missing", idx))),
        }
    };

    let timestamp = row
        .first()
        .and_then(Value::as_i64)
        .ok_or_else(|| AppError::Parse("kline open time missing".into()))?;

    Ok(Candle {
        timestamp,
        open: number(1)?,
        high: number(2)?,
        low: number(3)?,
        close: number(4)?,
        volume: number(5)?,
    })
}
