//! Solana chain module.
//!
//! Contains the JSON-RPC client, the configured account and key generation.

pub mod client;
pub mod keypair;

use async_trait::async_trait;

use crate::{error::Result, types::SolBalance};

pub use client::SolanaRpcClient;
pub use keypair::{parse_pubkey, SolanaAccount};

/// Read-only Solana chain operations.
#[async_trait]
pub trait SolanaChain: Send + Sync {
    /// Native balance of a base58 public key.
    async fn balance(&self, pubkey: &str) -> Result<SolBalance>;

    /// Current block height; doubles as a connectivity check.
    async fn block_height(&self) -> Result<u64>;
}
