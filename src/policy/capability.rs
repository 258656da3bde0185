//! Capability registry.
//!
//! A capability is available iff every setting it needs is present in the
//! configuration snapshot. No network checks are made.

use std::{
    collections::{BTreeMap, HashSet},
    fmt,
};

use crate::{ai::AiProvider, config::Config};

/// Optional integration that may or may not be configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    /// Centralized exchange trading and market data.
    ExchangeTrading,
    /// EVM chain RPC access.
    EvmChain,
    /// Solana chain RPC access.
    SolanaChain,
    /// A specific AI text-generation provider.
    AiProvider(AiProvider),
    /// Owner notifications through the chat bot.
    ChatNotify,
}

impl Capability {
    /// Every capability the registry knows about.
    pub fn all() -> Vec<Capability> {
        let mut all =
            vec![Capability::ExchangeTrading, Capability::EvmChain, Capability::SolanaChain];
        all.extend(AiProvider::ALL.iter().copied().map(Capability::AiProvider));
        all.push(Capability::ChatNotify);
        all
    }

    /// Whether the configuration carries everything this capability needs.
    fn is_configured(self, config: &Config) -> bool {
        match self {
            Capability::ExchangeTrading => config.exchange_credentials().is_some(),
            Capability::EvmChain => config.ethereum_rpc_url.is_some(),
            Capability::SolanaChain => config.solana_rpc_url.is_some(),
            Capability::AiProvider(AiProvider::OpenAi) => config.openai_api_key.is_some(),
            Capability::AiProvider(AiProvider::Gemini) => config.google_api_key.is_some(),
            Capability::AiProvider(AiProvider::DeepSeek) => config.deepseek_api_key.is_some(),
            Capability::ChatNotify => config.telegram().is_some(),
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::ExchangeTrading => write!(f, "exchange-trading"),
            Capability::EvmChain => write!(f, "evm-chain"),
            Capability::SolanaChain => write!(f, "solana-chain"),
            Capability::AiProvider(provider) => write!(f, "ai-provider:{}", provider),
            Capability::ChatNotify => write!(f, "chat-notify"),
        }
    }
}

/// Availability of every capability, computed once from the configuration.
#[derive(Debug, Clone)]
pub struct CapabilityRegistry {
    available: HashSet<Capability>,
}

impl CapabilityRegistry {
    /// Evaluate all capabilities against a configuration snapshot.
    pub fn from_config(config: &Config) -> Self {
        let available =
            Capability::all().into_iter().filter(|c| c.is_configured(config)).collect();
        Self { available }
    }

    /// Whether a capability is configured.
    pub fn is_available(&self, capability: Capability) -> bool {
        self.available.contains(&capability)
    }

    /// Availability keyed by capability name, in a stable order.
    pub fn snapshot(&self) -> BTreeMap<String, bool> {
        Capability::all().into_iter().map(|c| (c.to_string(), self.is_available(c))).collect()
    }

    /// Log the availability of every capability.
    pub fn log_summary(&self) {
        for capability in Capability::all() {
            if self.is_available(capability) {
                tracing::info!(capability = %capability, "Capability available");
            } else {
                tracing::warn!(capability = %capability, "Capability not configured");
            }
        }
    }
}
