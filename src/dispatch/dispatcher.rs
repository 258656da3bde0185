//! Action dispatcher.
//!
//! Resolves an action name, checks its capability, applies risk limits and the
//! safety gate to state-changing actions, invokes the collaborator and folds
//! the outcome into a [`ResponseEnvelope`].

use std::sync::Arc;

use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use serde::Serialize;
use serde_json::{json, Value};

use super::{
    action::Action,
    envelope::{normalize, ResponseEnvelope},
    params::{self, decode},
    trade::Trade,
};
use crate::{
    ai::{AiEngine, AiProvider, TextGenerator},
    config::Config,
    error::{AppError, Result},
    ethereum::{parse_address, EvmAccount, EvmChain, EvmClient},
    exchange::{BinanceClient, ExchangeConnector},
    notify::{Notifier, TelegramNotifier},
    policy::{Capability, CapabilityRegistry, RiskGuard, SafetyGate},
    services::status,
    solana::{parse_pubkey, SolanaAccount, SolanaChain, SolanaRpcClient},
    types::{
        CancelRequest, CancelResult, OrderRequest, OrderResult, Timeframe, DEFAULT_CANDLE_LIMIT,
        MAX_CANDLE_LIMIT,
    },
    wallets::{WalletChain, WalletStore},
};

/// External services the dispatcher forwards to.
///
/// A collaborator is present only when its settings are configured.
#[derive(Default, Clone)]
pub struct Collaborators {
    pub exchange: Option<Arc<dyn ExchangeConnector>>,
    pub evm: Option<Arc<dyn EvmChain>>,
    pub evm_account: Option<EvmAccount>,
    pub solana: Option<Arc<dyn SolanaChain>>,
    pub solana_account: Option<SolanaAccount>,
    pub ai: Option<Arc<dyn TextGenerator>>,
    pub notifier: Option<Arc<dyn Notifier>>,
}

impl Collaborators {
    /// Build the real clients for every configured service.
    ///
    /// No network calls are made here.
    pub fn from_config(config: &Config) -> Result<Self> {
        let exchange = BinanceClient::from_config(config)?
            .map(|client| Arc::new(client) as Arc<dyn ExchangeConnector>);

        let evm = match &config.ethereum_rpc_url {
            Some(url) => Some(Arc::new(EvmClient::new(url)?) as Arc<dyn EvmChain>),
            None => None,
        };
        let solana = match &config.solana_rpc_url {
            Some(url) => Some(Arc::new(SolanaRpcClient::new(url)?) as Arc<dyn SolanaChain>),
            None => None,
        };

        let evm_account = config
            .evm_private_key
            .as_ref()
            .map(|key| EvmAccount::from_private_key(key.expose_secret()))
            .transpose()?;
        let solana_account = config
            .solana_private_key
            .as_ref()
            .map(|key| SolanaAccount::from_private_key(key.expose_secret()))
            .transpose()?;

        let ai = AiEngine::from_config(config)?.map(|e| Arc::new(e) as Arc<dyn TextGenerator>);
        let notifier =
            TelegramNotifier::from_config(config)?.map(|n| Arc::new(n) as Arc<dyn Notifier>);

        Ok(Self { exchange, evm, evm_account, solana, solana_account, ai, notifier })
    }
}

/// The dispatch core.
pub struct Dispatcher {
    config: Arc<Config>,
    registry: CapabilityRegistry,
    gate: SafetyGate,
    risk: RiskGuard,
    wallets: WalletStore,
    collaborators: Collaborators,
}

impl Dispatcher {
    pub fn new(config: Arc<Config>, collaborators: Collaborators) -> Self {
        Self {
            registry: CapabilityRegistry::from_config(&config),
            gate: SafetyGate::new(config.clone()),
            risk: RiskGuard::new(config.risk.clone()),
            wallets: WalletStore::new(),
            collaborators,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    pub fn gate(&self) -> &SafetyGate {
        &self.gate
    }

    pub fn wallets(&self) -> &WalletStore {
        &self.wallets
    }

    pub fn collaborators(&self) -> &Collaborators {
        &self.collaborators
    }

    /// Run an action by name. Always returns an envelope.
    pub async fn dispatch(&self, name: &str, params: Value) -> ResponseEnvelope {
        tracing::debug!(action = %name, "Dispatching action");

        let result = self.execute(name, params).await;
        match &result {
            Ok(_) => tracing::debug!(action = %name, "Action completed"),
            Err(err @ AppError::Collaborator { .. }) => {
                tracing::error!(action = %name, error = %err, "Action failed")
            }
            Err(err) => tracing::warn!(action = %name, error = %err, "Action rejected"),
        }
        normalize(result)
    }

    async fn execute(&self, name: &str, params: Value) -> Result<Value> {
        let action: Action = name.parse()?;

        if let Some(capability) = action.required_capability(&params)? {
            if !self.registry.is_available(capability) {
                tracing::info!(
                    action = %action,
                    capability = %capability,
                    "Capability not configured"
                );
                return Ok(not_configured(action, capability));
            }
        }

        if action.is_state_changing() {
            return self.execute_trade(Trade::decode(action, params)?).await;
        }

        match action {
            Action::GetStatus => {
                to_data(status::status_report(&self.config, &self.registry, &self.gate))
            }
            Action::GetConfig => to_data(status::config_report(
                &self.config,
                &self.registry,
                self.risk.daily_report(),
            )),
            Action::TestConnection => {
                to_data(status::test_connections(&self.collaborators).await)
            }
            Action::GetPrice => self.get_price(decode(params)?).await,
            Action::GetBalance => self.get_balance().await,
            Action::GetOhlcv => self.get_ohlcv(decode(params)?).await,
            Action::PlaceOrder | Action::CancelOrder => Err(AppError::InvalidParams(format!(
                "{} must pass the safety gate",
                action
            ))),
            Action::GetEthBalance => self.get_eth_balance(decode(params)?).await,
            Action::GetSolBalance => self.get_sol_balance(decode(params)?).await,
            Action::CreateWallet => {
                let params: params::CreateWalletParams = decode(params)?;
                let chain: WalletChain = params.chain.parse()?;
                to_data(self.wallets.create(chain).await)
            }
            Action::ListWallets => {
                let params: params::ListWalletsParams = decode(params)?;
                let chain = params.chain.as_deref().map(str::parse::<WalletChain>).transpose()?;
                let wallets = self.wallets.list(chain).await;
                Ok(json!({ "count": wallets.len(), "wallets": wallets }))
            }
            Action::AiQuery => self.ai_query(decode(params)?).await,
            Action::SendNotification => self.send_notification(decode(params)?).await,
            Action::RecordPnl => {
                let params: params::PnlParams = decode(params)?;
                to_data(self.risk.record_pnl(params.pnl_usd))
            }
        }
    }

    fn exchange(&self) -> Result<&Arc<dyn ExchangeConnector>> {
        self.collaborators
            .exchange
            .as_ref()
            .ok_or_else(|| AppError::Config("exchange connector not initialized".into()))
    }

    async fn get_price(&self, params: params::SymbolParams) -> Result<Value> {
        let symbol = crate::types::normalize_symbol(&params.symbol)?;
        let exchange = self.exchange()?;
        let ticker = exchange.ticker(&symbol).await.map_err(wrap(exchange.venue()))?;
        to_data(ticker)
    }

    async fn get_balance(&self) -> Result<Value> {
        let exchange = self.exchange()?;
        let balances = exchange.balances().await.map_err(wrap(exchange.venue()))?;
        to_data(balances)
    }

    async fn get_ohlcv(&self, params: params::OhlcvParams) -> Result<Value> {
        let symbol = crate::types::normalize_symbol(&params.symbol)?;
        let timeframe = match params.timeframe.as_deref() {
            Some(tf) => tf.parse::<Timeframe>()?,
            None => Timeframe::default(),
        };
        let limit = params.limit.unwrap_or(DEFAULT_CANDLE_LIMIT);
        if limit == 0 || limit > MAX_CANDLE_LIMIT {
            return Err(AppError::InvalidParams(format!(
                "limit must be between 1 and {}, got {}",
                MAX_CANDLE_LIMIT, limit
            )));
        }

        let exchange = self.exchange()?;
        let candles = exchange
            .candles(&symbol, timeframe, limit)
            .await
            .map_err(wrap(exchange.venue()))?;

        Ok(json!({
            "venue": exchange.venue(),
            "symbol": symbol,
            "timeframe": timeframe,
            "candles": candles,
        }))
    }

    /// Risk limits, then the safety gate, then the exchange.
    async fn execute_trade(&self, trade: Trade) -> Result<Value> {
        if let Some(notional) = trade.notional() {
            self.risk.check_order(notional)?;
        }

        if !self.gate.may_execute_live() {
            return dry_run(&trade);
        }

        match trade {
            Trade::Place { order, notional_usd } => self.place_order(order, notional_usd).await,
            Trade::Cancel(request) => self.cancel_order(request).await,
        }
    }

    async fn place_order(&self, request: OrderRequest, notional: Decimal) -> Result<Value> {
        let exchange = self.exchange()?;
        tracing::warn!(symbol = %request.symbol, notional = %notional, "Placing LIVE order");
        let result =
            exchange.place_order(&request, notional).await.map_err(wrap(exchange.venue()))?;

        self.notify_best_effort(&order_message(&result)).await;
        to_data(result)
    }

    async fn cancel_order(&self, request: CancelRequest) -> Result<Value> {
        let exchange = self.exchange()?;
        tracing::warn!(
            symbol = %request.symbol,
            order_id = %request.order_id,
            "Cancelling LIVE order"
        );
        let result = exchange.cancel_order(&request).await.map_err(wrap(exchange.venue()))?;

        self.notify_best_effort(&format!(
            "Order {} on {} cancelled ({})",
            result.order_id, result.symbol, result.status
        ))
        .await;
        to_data(result)
    }

    async fn get_eth_balance(&self, params: params::EthBalanceParams) -> Result<Value> {
        let address = match params.address.as_deref() {
            Some(raw) => parse_address(raw)?,
            None => self
                .collaborators
                .evm_account
                .as_ref()
                .map(EvmAccount::address)
                .ok_or_else(|| {
                    AppError::InvalidParams(
                        "address is required when no EVM account is configured".into(),
                    )
                })?,
        };

        let evm = self
            .collaborators
            .evm
            .as_ref()
            .ok_or_else(|| AppError::Config("EVM client not initialized".into()))?;
        to_data(evm.eth_balance(address).await.map_err(wrap("ethereum"))?)
    }

    async fn get_sol_balance(&self, params: params::SolBalanceParams) -> Result<Value> {
        let pubkey = match params.pubkey.as_deref() {
            Some(raw) => parse_pubkey(raw)?,
            None => self
                .collaborators
                .solana_account
                .as_ref()
                .map(|account| account.pubkey().to_string())
                .ok_or_else(|| {
                    AppError::InvalidParams(
                        "pubkey is required when no Solana account is configured".into(),
                    )
                })?,
        };

        let solana = self
            .collaborators
            .solana
            .as_ref()
            .ok_or_else(|| AppError::Config("Solana client not initialized".into()))?;
        to_data(solana.balance(&pubkey).await.map_err(wrap("solana"))?)
    }

    async fn ai_query(&self, params: params::AiQueryParams) -> Result<Value> {
        let provider: AiProvider = params.provider.parse()?;
        if params.prompt.trim().is_empty() {
            return Err(AppError::InvalidParams("prompt cannot be empty".into()));
        }

        let ai = self
            .collaborators
            .ai
            .as_ref()
            .ok_or_else(|| AppError::Config("AI engine not initialized".into()))?;
        let completion =
            ai.generate(provider, &params.prompt).await.map_err(wrap(provider.as_str()))?;
        to_data(completion)
    }

    async fn send_notification(&self, params: params::NotificationParams) -> Result<Value> {
        if params.message.trim().is_empty() {
            return Err(AppError::InvalidParams("message cannot be empty".into()));
        }

        let notifier = self
            .collaborators
            .notifier
            .as_ref()
            .ok_or_else(|| AppError::Config("notifier not initialized".into()))?;
        to_data(notifier.notify(&params.message).await.map_err(wrap("telegram"))?)
    }

    /// Send `text` to the owner if chat-notify is available. Failures are logged only.
    pub async fn notify_best_effort(&self, text: &str) {
        if !self.registry.is_available(Capability::ChatNotify) {
            return;
        }
        let Some(notifier) = &self.collaborators.notifier else {
            return;
        };
        if let Err(err) = notifier.notify(text).await {
            tracing::error!(error = %err, "Failed to send owner notification");
        }
    }
}

fn not_configured(action: Action, capability: Capability) -> Value {
    json!({
        "status": "not_configured",
        "capability": capability.to_string(),
        "action": action.name(),
        "message": format!("{} is not configured", capability),
    })
}

fn dry_run(trade: &Trade) -> Result<Value> {
    match trade {
        Trade::Place { order, notional_usd } => {
            tracing::info!(
                symbol = %order.symbol,
                side = ?order.side,
                amount = %order.amount,
                notional = %notional_usd,
                "DRY RUN: order not sent"
            );
            to_data(OrderResult::dry_run(order, *notional_usd))
        }
        Trade::Cancel(request) => {
            tracing::info!(
                symbol = %request.symbol,
                order_id = %request.order_id,
                "DRY RUN: cancellation not sent"
            );
            to_data(CancelResult::dry_run(request))
        }
    }
}

fn to_data<T: Serialize>(value: T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

fn wrap(service: &str) -> impl FnOnce(AppError) -> AppError + '_ {
    move |err| AppError::collaborator(service, err)
}

fn order_message(result: &OrderResult) -> String {
    let price = result.price.map(|p| p.to_string()).unwrap_or_else(|| "market".to_string());
    format!(
        "Order {} {} {} {} @ {} (${} notional): {}",
        result.id,
        result.side.as_exchange_str(),
        result.amount,
        result.symbol,
        price,
        result.notional_usd.round_dp(2),
        result.status
    )
}
