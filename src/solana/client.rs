//! Solana JSON-RPC client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};

use super::SolanaChain;
use crate::{
    error::{AppError, Result},
    types::SolBalance,
};

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

/// `getBalance` wraps the value in an RPC context.
#[derive(Debug, Deserialize)]
struct WithContext<T> {
    value: T,
}

/// Solana RPC client over HTTP.
#[derive(Clone)]
pub struct SolanaRpcClient {
    client: Client,
    rpc_url: String,
}

impl SolanaRpcClient {
    /// Create a client; no network call is made until the first request.
    pub fn new(rpc_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(rpc_url = %rpc_url, "Solana client created");

        Ok(Self { client, rpc_url: rpc_url.to_string() })
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let request = RpcRequest { jsonrpc: "2.0", id: 1, method, params };

        let response: RpcResponse<T> =
            self.client.post(&self.rpc_url).json(&request).send().await?.json().await?;

        if let Some(err) = response.error {
            return Err(AppError::Rpc(format!("{} failed ({}): {}", method, err.code, err.message)));
        }
        response.result.ok_or_else(|| AppError::Rpc(format!("{} returned no result", method)))
    }
}

#[async_trait]
impl SolanaChain for SolanaRpcClient {
    async fn balance(&self, pubkey: &str) -> Result<SolBalance> {
        tracing::debug!(pubkey = %pubkey, "Querying SOL balance");

        let lamports: WithContext<u64> = self.call("getBalance", json!([pubkey])).await?;
        Ok(SolBalance::from_lamports(pubkey.to_string(), lamports.value))
    }

    async fn block_height(&self) -> Result<u64> {
        let height: u64 = self.call("getBlockHeight", json!([])).await?;
        tracing::info!(block_height = height, "Solana connection test successful");
        Ok(height)
    }
}
