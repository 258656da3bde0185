//! Common utilities for integration tests.

#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use mcp_crypto_bot::{
    ai::{AiCompletion, AiProvider, TextGenerator},
    error::{AppError, Result},
    ethereum::EvmChain,
    exchange::ExchangeConnector,
    notify::{Delivery, Notifier},
    solana::SolanaChain,
    types::{
        AssetBalance, CancelRequest, CancelResult, Candle, EvmBalance, ExchangeBalances,
        OrderRequest, OrderResult, SolBalance, Ticker, Timeframe,
    },
    Collaborators, Config, CryptoBotServer, Dispatcher,
};
use rust_decimal::Decimal;

/// Exchange credentials that make the exchange-trading capability available.
pub const EXCHANGE_ENV: [(&str, &str); 2] =
    [("BINANCE_API_KEY", "test-key"), ("BINANCE_SECRET", "test-secret")];

/// Build a configuration from key/value pairs, ignoring the process environment.
pub fn config(pairs: &[(&str, &str)]) -> Config {
    let vars: HashMap<String, String> =
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    Config::from_lookup(|key| vars.get(key).cloned()).expect("test config should load")
}

/// Shared call log of a fake collaborator.
#[derive(Default)]
pub struct CallLog(Mutex<Vec<String>>);

impl CallLog {
    fn record(&self, call: impl Into<String>) {
        self.0.lock().unwrap().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.0.lock().unwrap().len()
    }
}

/// Exchange double returning canned data.
#[derive(Default)]
pub struct FakeExchange {
    pub log: CallLog,
    pub fail: bool,
}

impl FakeExchange {
    pub fn failing() -> Self {
        Self { fail: true, ..Default::default() }
    }

    fn check(&self, call: &str) -> Result<()> {
        self.log.record(call);
        if self.fail {
            return Err(AppError::Exchange("-1003: Too many requests".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ExchangeConnector for FakeExchange {
    fn venue(&self) -> &str {
        "binance"
    }

    async fn ping(&self) -> Result<()> {
        self.check("ping")
    }

    async fn ticker(&self, symbol: &str) -> Result<Ticker> {
        self.check("ticker")?;
        Ok(Ticker {
            symbol: symbol.to_string(),
            price: 50_000.0,
            bid: 49_999.5,
            ask: 50_000.5,
            volume: 1_234.5,
            timestamp: 1_700_000_000_000,
        })
    }

    async fn balances(&self) -> Result<ExchangeBalances> {
        self.check("balances")?;
        Ok(ExchangeBalances {
            balances: vec![AssetBalance {
                asset: "USDT".to_string(),
                free: Decimal::new(1000, 0),
                locked: Decimal::ZERO,
                total: Decimal::new(1000, 0),
            }],
        })
    }

    async fn candles(&self, _symbol: &str, _tf: Timeframe, limit: u32) -> Result<Vec<Candle>> {
        self.check("candles")?;
        Ok((0..limit.min(3))
            .map(|i| Candle {
                timestamp: 1_700_000_000_000 + i64::from(i) * 3_600_000,
                open: 100.0,
                high: 110.0,
                low: 90.0,
                close: 105.0,
                volume: 10.0,
            })
            .collect())
    }

    async fn place_order(
        &self,
        order: &OrderRequest,
        notional_usd: Decimal,
    ) -> Result<OrderResult> {
        self.check("place_order")?;
        Ok(OrderResult {
            id: "123456".to_string(),
            symbol: order.symbol.clone(),
            side: order.side,
            order_type: order.order_type,
            amount: order.amount,
            price: order.price,
            notional_usd,
            status: "filled".to_string(),
            message: None,
        })
    }

    async fn cancel_order(&self, request: &CancelRequest) -> Result<CancelResult> {
        self.check("cancel_order")?;
        Ok(CancelResult {
            order_id: request.order_id.clone(),
            symbol: request.symbol.clone(),
            status: "canceled".to_string(),
            message: None,
        })
    }
}

#[derive(Default)]
pub struct FakeEvm {
    pub log: CallLog,
}

#[async_trait]
impl EvmChain for FakeEvm {
    async fn eth_balance(&self, address: Address) -> Result<EvmBalance> {
        self.log.record("eth_balance");
        let wei = U256::from(1_500_000_000_000_000_000u128);
        Ok(EvmBalance::from_wei(address.to_checksum(None), wei))
    }

    async fn latest_block(&self) -> Result<u64> {
        self.log.record("latest_block");
        Ok(19_000_000)
    }
}

#[derive(Default)]
pub struct FakeSolana {
    pub log: CallLog,
    pub fail: bool,
}

#[async_trait]
impl SolanaChain for FakeSolana {
    async fn balance(&self, pubkey: &str) -> Result<SolBalance> {
        self.log.record("balance");
        Ok(SolBalance::from_lamports(pubkey.to_string(), 2_500_000_000))
    }

    async fn block_height(&self) -> Result<u64> {
        self.log.record("block_height");
        if self.fail {
            return Err(AppError::Rpc("connection refused".into()));
        }
        Ok(250_000_000)
    }
}

#[derive(Default)]
pub struct FakeAi {
    pub log: CallLog,
}

#[async_trait]
impl TextGenerator for FakeAi {
    async fn generate(&self, provider: AiProvider, prompt: &str) -> Result<AiCompletion> {
        self.log.record(provider.as_str());
        Ok(AiCompletion {
            provider,
            model: "fake-model".to_string(),
            response: format!("echo: {}", prompt),
        })
    }
}

/// Notifier double that keeps every message.
#[derive(Default)]
pub struct FakeNotifier {
    pub log: CallLog,
    pub fail: bool,
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn notify(&self, text: &str) -> Result<Delivery> {
        self.log.record(text);
        if self.fail {
            return Err(AppError::Transport("telegram unreachable".into()));
        }
        Ok(Delivery { delivered: true, chat_id: 42 })
    }
}

/// A dispatcher wired to fakes, with handles to inspect them.
pub struct Harness {
    pub dispatcher: Arc<Dispatcher>,
    pub exchange: Arc<FakeExchange>,
    pub evm: Arc<FakeEvm>,
    pub solana: Arc<FakeSolana>,
    pub ai: Arc<FakeAi>,
    pub notifier: Arc<FakeNotifier>,
}

impl Harness {
    /// Total calls made to any fake collaborator.
    pub fn collaborator_calls(&self) -> usize {
        self.exchange.log.count()
            + self.evm.log.count()
            + self.solana.log.count()
            + self.ai.log.count()
            + self.notifier.log.count()
    }

    pub fn server(&self) -> CryptoBotServer {
        CryptoBotServer::with_dispatcher(self.dispatcher.clone())
    }
}

/// Build a harness. Capabilities still follow `pairs`; the fakes are always wired.
pub fn harness(pairs: &[(&str, &str)]) -> Harness {
    harness_with(pairs, FakeExchange::default(), FakeNotifier::default())
}

pub fn harness_with(
    pairs: &[(&str, &str)],
    exchange: FakeExchange,
    notifier: FakeNotifier,
) -> Harness {
    let exchange = Arc::new(exchange);
    let evm = Arc::new(FakeEvm::default());
    let solana = Arc::new(FakeSolana::default());
    let ai = Arc::new(FakeAi::default());
    let notifier = Arc::new(notifier);

    let collaborators = Collaborators {
        exchange: Some(exchange.clone()),
        evm: Some(evm.clone()),
        evm_account: None,
        solana: Some(solana.clone()),
        solana_account: None,
        ai: Some(ai.clone()),
        notifier: Some(notifier.clone()),
    };
    let dispatcher = Arc::new(Dispatcher::new(Arc::new(config(pairs)), collaborators));

    Harness { dispatcher, exchange, evm, solana, ai, notifier }
}

/// Concatenate pair lists.
pub fn env(groups: &[&[(&'static str, &'static str)]]) -> Vec<(&'static str, &'static str)> {
    groups.iter().flat_map(|g| g.iter().copied()).collect()
}

/// Helper to create a server with real collaborators from environment variables.
pub fn create_env_server() -> Option<CryptoBotServer> {
    let config = Config::from_env().ok()?;
    CryptoBotServer::new(config).ok()
}

/// Skip test if server cannot be created (missing or invalid env vars).
#[macro_export]
macro_rules! skip_if_no_server {
    () => {
        match common::create_env_server() {
            Some(server) => server,
            None => {
                eprintln!("Skipping test: environment configuration could not be loaded");
                return;
            }
        }
    };
}
