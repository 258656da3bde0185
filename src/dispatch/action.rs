//! Action descriptors.
//!
//! The set of action names is fixed. Each action declares the capability it
//! needs and whether it changes external state.

use std::{fmt, str::FromStr};

use serde_json::Value;

use crate::{
    ai::AiProvider,
    error::{AppError, Result},
    policy::Capability,
};

/// Every action the dispatcher accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    GetStatus,
    GetConfig,
    TestConnection,
    GetPrice,
    GetBalance,
    GetOhlcv,
    PlaceOrder,
    CancelOrder,
    GetEthBalance,
    GetSolBalance,
    CreateWallet,
    ListWallets,
    AiQuery,
    SendNotification,
    RecordPnl,
}

impl Action {
    pub const ALL: [Action; 15] = [
        Action::GetStatus,
        Action::GetConfig,
        Action::TestConnection,
        Action::GetPrice,
        Action::GetBalance,
        Action::GetOhlcv,
        Action::PlaceOrder,
        Action::CancelOrder,
        Action::GetEthBalance,
        Action::GetSolBalance,
        Action::CreateWallet,
        Action::ListWallets,
        Action::AiQuery,
        Action::SendNotification,
        Action::RecordPnl,
    ];

    /// Registered action name.
    pub fn name(self) -> &'static str {
        match self {
            Action::GetStatus => "get_status",
            Action::GetConfig => "get_config",
            Action::TestConnection => "test_connection",
            Action::GetPrice => "get_price",
            Action::GetBalance => "get_balance",
            Action::GetOhlcv => "get_ohlcv",
            Action::PlaceOrder => "place_order",
            Action::CancelOrder => "cancel_order",
            Action::GetEthBalance => "get_eth_balance",
            Action::GetSolBalance => "get_sol_balance",
            Action::CreateWallet => "create_wallet",
            Action::ListWallets => "list_wallets",
            Action::AiQuery => "ai_query",
            Action::SendNotification => "send_notification",
            Action::RecordPnl => "record_pnl",
        }
    }

    /// Whether the action can move funds or alter open orders.
    ///
    /// Only these actions pass through risk limits and the safety gate.
    pub fn is_state_changing(self) -> bool {
        matches!(self, Action::PlaceOrder | Action::CancelOrder)
    }

    /// Capability the action needs, if any.
    ///
    /// `ai_query` depends on the provider named in its parameters, so the
    /// parameters are consulted for that action only.
    pub fn required_capability(self, params: &Value) -> Result<Option<Capability>> {
        let capability = match self {
            Action::GetPrice
            | Action::GetBalance
            | Action::GetOhlcv
            | Action::PlaceOrder
            | Action::CancelOrder => Capability::ExchangeTrading,
            Action::GetEthBalance => Capability::EvmChain,
            Action::GetSolBalance => Capability::SolanaChain,
            Action::SendNotification => Capability::ChatNotify,
            Action::AiQuery => {
                let provider = params.get("provider").and_then(Value::as_str).ok_or_else(|| {
                    AppError::InvalidParams("missing field `provider`".into())
                })?;
                Capability::AiProvider(provider.parse::<AiProvider>()?)
            }
            Action::GetStatus
            | Action::GetConfig
            | Action::TestConnection
            | Action::CreateWallet
            | Action::ListWallets
            | Action::RecordPnl => return Ok(None),
        };
        Ok(Some(capability))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Action {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        Action::ALL
            .iter()
            .copied()
            .find(|action| action.name() == s)
            .ok_or_else(|| AppError::UnknownAction(s.to_string()))
    }
}
