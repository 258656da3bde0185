//! EVM key handling.

use alloy::{primitives::Address, signers::local::PrivateKeySigner};
use secrecy::SecretString;

use crate::error::{AppError, Result};

/// The account configured through `EVM_PRIVATE_KEY`.
///
/// Only the address is exposed; the signer stays private.
#[derive(Clone)]
pub struct EvmAccount {
    address: Address,
}

impl EvmAccount {
    /// Load an account from a private key string (with or without 0x prefix).
    pub fn from_private_key(private_key: &str) -> Result<Self> {
        let key = private_key.strip_prefix("0x").unwrap_or(private_key);

        let signer: PrivateKeySigner =
            key.parse().map_err(|e: alloy::signers::local::LocalSignerError| {
                AppError::Wallet(e.to_string())
            })?;

        let address = signer.address();

        tracing::info!(address = %address, "EVM account initialized");

        Ok(Self { address })
    }

    /// Get the account address.
    pub fn address(&self) -> Address {
        self.address
    }
}

impl std::fmt::Debug for EvmAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvmAccount").field("address", &self.address).finish()
    }
}

/// A freshly generated EVM key pair.
pub struct GeneratedEvmKey {
    /// Checksummed address.
    pub address: String,
    /// Hex private key with 0x prefix.
    pub private_key: SecretString,
}

/// Generate a random EVM key pair.
pub fn generate_key() -> GeneratedEvmKey {
    let signer = PrivateKeySigner::random();
    GeneratedEvmKey {
        address: signer.address().to_checksum(None),
        private_key: SecretString::from(format!("0x{}", hex::encode(signer.to_bytes()))),
    }
}

/// Parse and validate an EVM address from a string.
///
/// Requires the 0x prefix and exactly 40 hex characters.
pub fn parse_address(s: &str) -> Result<Address> {
    let trimmed = s.trim();

    if trimmed.is_empty() {
        return Err(AppError::InvalidAddress("Address cannot be empty".into()));
    }

    if !trimmed.starts_with("0x") && !trimmed.starts_with("0X") {
        return Err(AppError::InvalidAddress(format!("Address must start with '0x': {}", s)));
    }

    // 0x + 40 hex chars = 42 total
    if trimmed.len() != 42 {
        return Err(AppError::InvalidAddress(format!(
            "Address must be 42 characters (0x + 40 hex chars), got {}: {}",
            trimmed.len(),
            s
        )));
    }

    trimmed
        .parse::<Address>()
        .map_err(|e| AppError::InvalidAddress(format!("Invalid address format '{}': {}", s, e)))
}
