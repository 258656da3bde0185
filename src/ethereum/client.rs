//! Ethereum RPC client.

use alloy::{
    network::Ethereum,
    primitives::Address,
    providers::{Provider, ProviderBuilder, RootProvider},
};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::OnceCell;

use super::EvmChain;
use crate::{
    error::{AppError, Result},
    types::EvmBalance,
};

/// Type alias for the HTTP provider.
pub type HttpProvider = RootProvider<Ethereum>;

/// EVM RPC client wrapper with lazy initialization.
#[derive(Clone)]
pub struct EvmClient {
    /// The underlying provider.
    provider: Arc<HttpProvider>,
    /// RPC URL for logging.
    rpc_url: String,
    /// Lazily initialized chain ID.
    chain_id: Arc<OnceCell<u64>>,
}

impl EvmClient {
    /// Create a new EVM client.
    ///
    /// Note: This does NOT make any network calls. The connection is
    /// established lazily when the first operation is performed.
    pub fn new(rpc_url: &str) -> Result<Self> {
        let url = rpc_url
            .parse()
            .map_err(|_| AppError::Config(format!("Invalid RPC URL: {}", rpc_url)))?;

        #[allow(deprecated)]
        let provider = ProviderBuilder::new().connect_http(url).root().clone();

        tracing::info!(rpc_url = %rpc_url, "EVM client created (lazy initialization)");

        Ok(Self {
            provider: Arc::new(provider),
            rpc_url: rpc_url.to_string(),
            chain_id: Arc::new(OnceCell::new()),
        })
    }

    /// Get the chain ID (fetches from network on first call).
    pub async fn chain_id(&self) -> Result<u64> {
        self.chain_id
            .get_or_try_init(|| async {
                let chain_id = self.provider.get_chain_id().await?;
                tracing::info!(
                    chain_id = chain_id,
                    rpc_url = %self.rpc_url,
                    "Connected to EVM node"
                );
                Ok(chain_id)
            })
            .await
            .copied()
    }
}

#[async_trait]
impl EvmChain for EvmClient {
    async fn eth_balance(&self, address: Address) -> Result<EvmBalance> {
        tracing::debug!(address = %address, "Querying ETH balance");

        let wei = self.provider.get_balance(address).await?;
        Ok(EvmBalance::from_wei(address.to_checksum(None), wei))
    }

    async fn latest_block(&self) -> Result<u64> {
        let chain_id = self.chain_id().await?;
        let block = self.provider.get_block_number().await?;
        tracing::info!(chain_id = chain_id, block = block, "EVM connection test successful");
        Ok(block)
    }
}
