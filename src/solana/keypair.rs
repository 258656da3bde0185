//! Solana key handling.

use ed25519_dalek::{SigningKey, SECRET_KEY_LENGTH};
use rand::rngs::OsRng;
use secrecy::SecretString;

use crate::error::{AppError, Result};

const PUBKEY_LENGTH: usize = 32;
const KEYPAIR_LENGTH: usize = 64;

/// The account configured through `SOLANA_PRIVATE_KEY`.
#[derive(Clone)]
pub struct SolanaAccount {
    pubkey: String,
}

impl SolanaAccount {
    /// Load an account from a hex encoded 32-byte seed or 64-byte keypair.
    pub fn from_private_key(private_key: &str) -> Result<Self> {
        let raw = private_key.trim();
        let raw = raw.strip_prefix("0x").unwrap_or(raw);
        let bytes =
            hex::decode(raw).map_err(|e| AppError::Wallet(format!("Invalid Solana key: {}", e)))?;

        let signing_key = match bytes.len() {
            SECRET_KEY_LENGTH => {
                let mut seed = [0u8; SECRET_KEY_LENGTH];
                seed.copy_from_slice(&bytes);
                SigningKey::from_bytes(&seed)
            }
            KEYPAIR_LENGTH => {
                let mut keypair = [0u8; KEYPAIR_LENGTH];
                keypair.copy_from_slice(&bytes);
                SigningKey::from_keypair_bytes(&keypair).map_err(|e| {
                    AppError::Wallet(format!("Solana keypair does not match its public key: {}", e))
                })?
            }
            n => {
                return Err(AppError::Wallet(format!(
                    "Solana key must be 32 or 64 bytes, got {}",
                    n
                )))
            }
        };

        let pubkey = encode_pubkey(&signing_key);
        tracing::info!(pubkey = %pubkey, "Solana account initialized");

        Ok(Self { pubkey })
    }

    /// Base58 public key.
    pub fn pubkey(&self) -> &str {
        &self.pubkey
    }
}

impl std::fmt::Debug for SolanaAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolanaAccount").field("pubkey", &self.pubkey).finish()
    }
}

/// A freshly generated Solana key pair.
pub struct GeneratedSolanaKey {
    /// Base58 public key.
    pub address: String,
    /// Hex encoded 64-byte keypair (seed followed by public key).
    pub private_key: SecretString,
}

/// Generate a random Solana key pair.
pub fn generate_key() -> GeneratedSolanaKey {
    let signing_key = SigningKey::generate(&mut OsRng);
    GeneratedSolanaKey {
        address: encode_pubkey(&signing_key),
        private_key: SecretString::from(hex::encode(signing_key.to_keypair_bytes())),
    }
}

/// Validate a base58 Solana public key.
pub fn parse_pubkey(s: &str) -> Result<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidAddress("Public key cannot be empty".into()));
    }

    let decoded = bs58::decode(trimmed).into_vec().map_err(|e| {
        AppError::InvalidAddress(format!("Invalid base58 public key '{}': {}", s, e))
    })?;

    if decoded.len() != PUBKEY_LENGTH {
        return Err(AppError::InvalidAddress(format!(
            "Public key must decode to 32 bytes, got {}: {}",
            decoded.len(),
            s
        )));
    }

    Ok(trimmed.to_string())
}

fn encode_pubkey(signing_key: &SigningKey) -> String {
    bs58::encode(signing_key.verifying_key().as_bytes()).into_string()
}
