//! EVM chain module.
//!
//! Contains the EVM RPC client, the configured account and key generation.

pub mod client;
pub mod wallet;

use alloy::primitives::Address;
use async_trait::async_trait;

use crate::{error::Result, types::EvmBalance};

pub use client::{EvmClient, HttpProvider};
pub use wallet::{parse_address, EvmAccount};

/// Read-only EVM chain operations.
#[async_trait]
pub trait EvmChain: Send + Sync {
    /// Native balance of an address.
    async fn eth_balance(&self, address: Address) -> Result<EvmBalance>;

    /// Latest block number; doubles as a connectivity check.
    async fn latest_block(&self) -> Result<u64>;
}
