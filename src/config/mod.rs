//! Configuration management module.
//!
//! Loads the immutable configuration snapshot from environment variables once at
//! startup. Absent optional credentials disable the matching capability; malformed
//! values are rejected here so they never surface at runtime.

use std::{env, fmt, str::FromStr};

use rust_decimal::Decimal;
use secrecy::SecretString;

use crate::error::AppError;

/// Default Solana endpoint, used unless `SOLANA_RPC_URL` is set (an empty value disables Solana).
pub const DEFAULT_SOLANA_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// Whether state-changing actions may reach real infrastructure at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TradingMode {
    /// Simulation only.
    #[default]
    Test,
    /// Live infrastructure, still subject to the confirmation token.
    Live,
}

impl TradingMode {
    /// Whether this is live mode.
    pub fn is_live(self) -> bool {
        matches!(self, TradingMode::Live)
    }
}

impl fmt::Display for TradingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradingMode::Test => write!(f, "TEST"),
            TradingMode::Live => write!(f, "LIVE"),
        }
    }
}

impl FromStr for TradingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "0" | "false" | "no" | "off" => Ok(TradingMode::Test),
            "1" | "true" | "yes" | "on" => Ok(TradingMode::Live),
            other => Err(format!("unrecognised LIVE value '{}'", other)),
        }
    }
}

/// Numeric risk limits checked before any trade, in both modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskLimits {
    /// Maximum notional of a single order in USD.
    pub max_order_usd: Decimal,
    /// Maximum cumulative realized loss per UTC day in USD.
    pub daily_loss_limit_usd: Decimal,
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self { max_order_usd: Decimal::from(100), daily_loss_limit_usd: Decimal::from(200) }
    }
}

/// Binance API credentials borrowed from the snapshot.
#[derive(Debug, Clone, Copy)]
pub struct ExchangeCredentials<'a> {
    pub api_key: &'a SecretString,
    pub secret: &'a SecretString,
}

/// Telegram bot settings borrowed from the snapshot.
#[derive(Debug, Clone, Copy)]
pub struct TelegramSettings<'a> {
    pub bot_token: &'a SecretString,
    pub owner_chat_id: i64,
}

/// Application configuration snapshot.
///
/// Built once and shared behind an `Arc`; there are no setters.
#[derive(Debug)]
pub struct Config {
    /// Global live/test mode.
    pub mode: TradingMode,
    /// Raw confirmation token (`AM_I_SURE`), compared exactly by the safety gate.
    pub confirmation: String,
    /// Risk limits.
    pub risk: RiskLimits,
    /// Binance API key, if configured.
    pub binance_api_key: Option<SecretString>,
    /// Binance API secret, if configured.
    pub binance_secret: Option<SecretString>,
    /// Ethereum JSON-RPC endpoint URL.
    pub ethereum_rpc_url: Option<String>,
    /// Private key of the configured EVM account (hex).
    pub evm_private_key: Option<SecretString>,
    /// Solana JSON-RPC endpoint URL.
    pub solana_rpc_url: Option<String>,
    /// Private key of the configured Solana account (hex).
    pub solana_private_key: Option<SecretString>,
    /// OpenAI API key.
    pub openai_api_key: Option<SecretString>,
    /// Google AI (Gemini) API key.
    pub google_api_key: Option<SecretString>,
    /// DeepSeek API key.
    pub deepseek_api_key: Option<SecretString>,
    /// Telegram bot token.
    pub telegram_bot_token: Option<SecretString>,
    /// Telegram chat id of the owner.
    pub owner_telegram_id: Option<i64>,
    /// Logging level (default: info).
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    /// See [`Config::from_lookup`] for the recognised variables.
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Variables: `LIVE`, `AM_I_SURE`, `MAX_ORDER_USD`, `DAILY_LOSS_LIMIT_USD`,
    /// `BINANCE_API_KEY`, `BINANCE_SECRET`, `ETHEREUM_RPC_URL`, `EVM_PRIVATE_KEY`,
    /// `SOLANA_RPC_URL`, `SOLANA_PRIVATE_KEY`, `OPENAI_API_KEY`, `GOOGLE_API_KEY`,
    /// `DEEPSEEK_API_KEY`, `TELEGRAM_BOT_TOKEN`, `OWNER_TELEGRAM_ID`, `LOG_LEVEL`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional =
            |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let secret = |key: &str| optional(key).map(SecretString::from);

        let mode = match lookup("LIVE") {
            Some(raw) => raw.parse::<TradingMode>().map_err(AppError::Config)?,
            None => TradingMode::Test,
        };

        let confirmation = lookup("AM_I_SURE").unwrap_or_else(|| "NO".to_string());

        let defaults = RiskLimits::default();
        let risk = RiskLimits {
            max_order_usd: parse_limit("MAX_ORDER_USD", optional("MAX_ORDER_USD"))?
                .unwrap_or(defaults.max_order_usd),
            daily_loss_limit_usd: parse_limit(
                "DAILY_LOSS_LIMIT_USD",
                optional("DAILY_LOSS_LIMIT_USD"),
            )?
            .unwrap_or(defaults.daily_loss_limit_usd),
        };

        let ethereum_rpc_url = optional("ETHEREUM_RPC_URL")
            .map(|url| validate_url("ETHEREUM_RPC_URL", url))
            .transpose()?;

        let solana_rpc_url = match lookup("SOLANA_RPC_URL") {
            Some(raw) => {
                let raw = raw.trim().to_string();
                if raw.is_empty() {
                    None
                } else {
                    Some(validate_url("SOLANA_RPC_URL", raw)?)
                }
            }
            None => Some(DEFAULT_SOLANA_RPC_URL.to_string()),
        };

        let owner_telegram_id = optional("OWNER_TELEGRAM_ID")
            .map(|raw| {
                raw.parse::<i64>().map_err(|e| {
                    AppError::Config(format!("OWNER_TELEGRAM_ID must be an integer chat id: {}", e))
                })
            })
            .transpose()?;

        let log_level = optional("LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        Ok(Self {
            mode,
            confirmation,
            risk,
            binance_api_key: secret("BINANCE_API_KEY"),
            binance_secret: secret("BINANCE_SECRET"),
            ethereum_rpc_url,
            evm_private_key: secret("EVM_PRIVATE_KEY"),
            solana_rpc_url,
            solana_private_key: secret("SOLANA_PRIVATE_KEY"),
            openai_api_key: secret("OPENAI_API_KEY"),
            google_api_key: secret("GOOGLE_API_KEY"),
            deepseek_api_key: secret("DEEPSEEK_API_KEY"),
            telegram_bot_token: secret("TELEGRAM_BOT_TOKEN"),
            owner_telegram_id,
            log_level,
        })
    }

    /// Exchange credentials, when both key and secret are present.
    pub fn exchange_credentials(&self) -> Option<ExchangeCredentials<'_>> {
        match (&self.binance_api_key, &self.binance_secret) {
            (Some(api_key), Some(secret)) => Some(ExchangeCredentials { api_key, secret }),
            _ => None,
        }
    }

    /// Telegram settings, when both token and owner chat id are present.
    pub fn telegram(&self) -> Option<TelegramSettings<'_>> {
        match (&self.telegram_bot_token, self.owner_telegram_id) {
            (Some(bot_token), Some(owner_chat_id)) => {
                Some(TelegramSettings { bot_token, owner_chat_id })
            }
            _ => None,
        }
    }
}

fn parse_limit(key: &str, raw: Option<String>) -> Result<Option<Decimal>, AppError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let value = Decimal::from_str(&raw)
        .map_err(|e| AppError::Config(format!("{} must be a decimal number: {}", key, e)))?;
    if value <= Decimal::ZERO {
        return Err(AppError::Config(format!("{} must be greater than zero", key)));
    }
    Ok(Some(value))
}

fn validate_url(key: &str, raw: String) -> Result<String, AppError> {
    reqwest::Url::parse(&raw)
        .map_err(|e| AppError::Config(format!("{} is not a valid URL ({}): {}", key, e, raw)))?;
    Ok(raw)
}
