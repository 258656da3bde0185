//! Status, configuration and connectivity reports.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    config::Config,
    dispatch::Collaborators,
    error::Result,
    policy::{CapabilityRegistry, DailyRiskReport, SafetyGate, CONFIRMATION_TOKEN},
};

/// Output of `get_status`.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub status: &'static str,
    pub version: &'static str,
    /// `LIVE` or `TEST`.
    pub environment: String,
    /// Whether state-changing actions reach the exchange.
    pub trading_enabled: bool,
    pub features: BTreeMap<String, bool>,
}

/// Output of `get_config`. Never carries secrets.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigReport {
    pub live_trading: bool,
    pub safety_confirmed: bool,
    pub max_order_usd: Decimal,
    pub daily_loss_limit_usd: Decimal,
    pub daily_risk: DailyRiskReport,
    pub log_level: String,
    pub features_configured: BTreeMap<String, bool>,
}

/// Connection state of one service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Connected,
    Failed,
    NotConfigured,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceCheck {
    pub status: ConnectionStatus,
    pub error: Option<String>,
}

impl ServiceCheck {
    fn from_outcome<T>(outcome: Option<Result<T>>) -> Self {
        match outcome {
            None => Self { status: ConnectionStatus::NotConfigured, error: None },
            Some(Ok(_)) => Self { status: ConnectionStatus::Connected, error: None },
            Some(Err(err)) => {
                Self { status: ConnectionStatus::Failed, error: Some(err.to_string()) }
            }
        }
    }
}

/// Output of `test_connection`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionReport {
    pub binance: ServiceCheck,
    pub ethereum: ServiceCheck,
    pub solana: ServiceCheck,
}

pub fn status_report(
    config: &Config,
    registry: &CapabilityRegistry,
    gate: &SafetyGate,
) -> StatusReport {
    StatusReport {
        status: "running",
        version: env!("CARGO_PKG_VERSION"),
        environment: config.mode.to_string(),
        trading_enabled: gate.may_execute_live(),
        features: registry.snapshot(),
    }
}

pub fn config_report(
    config: &Config,
    registry: &CapabilityRegistry,
    daily_risk: DailyRiskReport,
) -> ConfigReport {
    ConfigReport {
        live_trading: config.mode.is_live(),
        safety_confirmed: config.confirmation == CONFIRMATION_TOKEN,
        max_order_usd: config.risk.max_order_usd,
        daily_loss_limit_usd: config.risk.daily_loss_limit_usd,
        daily_risk,
        log_level: config.log_level.clone(),
        features_configured: registry.snapshot(),
    }
}

/// Probe every configured service concurrently.
///
/// A failed probe is reported in the result, never returned as an error.
pub async fn test_connections(collaborators: &Collaborators) -> ConnectionReport {
    let binance = async {
        match &collaborators.exchange {
            Some(exchange) => Some(exchange.ping().await),
            None => None,
        }
    };
    let ethereum = async {
        match &collaborators.evm {
            Some(evm) => Some(evm.latest_block().await),
            None => None,
        }
    };
    let solana = async {
        match &collaborators.solana {
            Some(solana) => Some(solana.block_height().await),
            None => None,
        }
    };

    let (binance, ethereum, solana) = tokio::join!(binance, ethereum, solana);

    ConnectionReport {
        binance: ServiceCheck::from_outcome(binance),
        ethereum: ServiceCheck::from_outcome(ethereum),
        solana: ServiceCheck::from_outcome(solana),
    }
}
