//! On-chain balance types and unit formatting.

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

/// Decimals of native ETH (wei per ETH = 10^18).
pub const ETH_DECIMALS: u8 = 18;

/// Decimals of native SOL (lamports per SOL = 10^9).
pub const SOL_DECIMALS: u8 = 9;

/// Native ETH balance of an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvmBalance {
    /// Checksummed address.
    pub address: String,
    /// Balance in wei, as a decimal string.
    pub balance_wei: String,
    /// Balance in ETH, human-readable.
    pub balance_eth: String,
    pub currency: String,
}

impl EvmBalance {
    /// Build from a raw wei amount.
    pub fn from_wei(address: String, wei: U256) -> Self {
        Self {
            address,
            balance_wei: wei.to_string(),
            balance_eth: format_units(wei, ETH_DECIMALS),
            currency: "ETH".to_string(),
        }
    }
}

/// Native SOL balance of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolBalance {
    /// Base58 public key.
    pub pubkey: String,
    pub balance_lamports: u64,
    /// Balance in SOL, human-readable.
    pub balance_sol: String,
    pub currency: String,
}

impl SolBalance {
    /// Build from a raw lamport amount.
    pub fn from_lamports(pubkey: String, lamports: u64) -> Self {
        Self {
            pubkey,
            balance_lamports: lamports,
            balance_sol: format_units(U256::from(lamports), SOL_DECIMALS),
            currency: "SOL".to_string(),
        }
    }
}

/// Render an integer amount of smallest units with `decimals` places,
/// dropping trailing zeros (`1500000000` at 9 decimals → `"1.5"`).
pub fn format_units(value: U256, decimals: u8) -> String {
    let digits = value.to_string();
    let decimals = decimals as usize;

    if value == U256::ZERO || decimals == 0 {
        return digits;
    }

    let padded = if digits.len() <= decimals {
        format!("{}{}", "0".repeat(decimals + 1 - digits.len()), digits)
    } else {
        digits
    };

    let (integer, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        integer.to_string()
    } else {
        format!("{}.{}", integer, fraction)
    }
}
