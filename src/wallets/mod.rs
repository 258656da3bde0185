//! In-memory wallet records.
//!
//! Wallets live for the lifetime of the process. Creation is append-only, so
//! identifiers are stable and listing order is creation order.

use std::{fmt, str::FromStr};

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::{
    error::{AppError, Result},
    ethereum::wallet as evm_keys,
    solana::keypair as solana_keys,
};

/// Chain a wallet belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletChain {
    Evm,
    Solana,
}

impl WalletChain {
    pub fn as_str(self) -> &'static str {
        match self {
            WalletChain::Evm => "evm",
            WalletChain::Solana => "solana",
        }
    }

    fn id_prefix(self) -> &'static str {
        match self {
            WalletChain::Evm => "evm",
            WalletChain::Solana => "sol",
        }
    }
}

impl fmt::Display for WalletChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WalletChain {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "evm" | "ethereum" | "eth" => Ok(WalletChain::Evm),
            "solana" | "sol" => Ok(WalletChain::Solana),
            other => Err(AppError::InvalidParams(format!(
                "Unknown chain '{}': expected 'evm' or 'solana'",
                other
            ))),
        }
    }
}

/// A generated wallet. Key material never leaves this struct through serde.
pub struct WalletRecord {
    id: String,
    chain: WalletChain,
    address: String,
    private_key: SecretString,
}

impl WalletRecord {
    /// Public view of the record.
    pub fn info(&self) -> WalletInfo {
        WalletInfo { id: self.id.clone(), chain: self.chain, address: self.address.clone() }
    }

    /// Private key material, hex encoded.
    pub fn private_key(&self) -> &SecretString {
        &self.private_key
    }
}

impl fmt::Debug for WalletRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletRecord")
            .field("id", &self.id)
            .field("chain", &self.chain)
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// What callers see of a wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletInfo {
    pub id: String,
    pub chain: WalletChain,
    pub address: String,
}

#[derive(Default)]
struct Records {
    evm: Vec<WalletRecord>,
    solana: Vec<WalletRecord>,
}

impl Records {
    fn chain_mut(&mut self, chain: WalletChain) -> &mut Vec<WalletRecord> {
        match chain {
            WalletChain::Evm => &mut self.evm,
            WalletChain::Solana => &mut self.solana,
        }
    }
}

/// Process-lifetime wallet store.
#[derive(Default)]
pub struct WalletStore {
    records: RwLock<Records>,
}

impl WalletStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a new wallet on `chain` and return its public view.
    pub async fn create(&self, chain: WalletChain) -> WalletInfo {
        let (address, private_key) = match chain {
            WalletChain::Evm => {
                let key = evm_keys::generate_key();
                (key.address, key.private_key)
            }
            WalletChain::Solana => {
                let key = solana_keys::generate_key();
                (key.address, key.private_key)
            }
        };

        let mut records = self.records.write().await;
        let wallets = records.chain_mut(chain);
        let record = WalletRecord {
            id: format!("{}_{}", chain.id_prefix(), wallets.len() + 1),
            chain,
            address,
            private_key,
        };
        let info = record.info();
        wallets.push(record);

        tracing::info!(id = %info.id, chain = %chain, address = %info.address, "Wallet created");
        info
    }

    /// Wallets on `chain`, or all wallets (EVM first) when `chain` is `None`.
    pub async fn list(&self, chain: Option<WalletChain>) -> Vec<WalletInfo> {
        let records = self.records.read().await;
        let evm = records.evm.iter();
        let solana = records.solana.iter();
        match chain {
            Some(WalletChain::Evm) => evm.map(WalletRecord::info).collect(),
            Some(WalletChain::Solana) => solana.map(WalletRecord::info).collect(),
            None => evm.chain(solana).map(WalletRecord::info).collect(),
        }
    }

    /// Run `f` against the record with `id`, if any.
    pub async fn with_record<T>(&self, id: &str, f: impl FnOnce(&WalletRecord) -> T) -> Option<T> {
        let records = self.records.read().await;
        records.evm.iter().chain(records.solana.iter()).find(|r| r.id == id).map(f)
    }
}
