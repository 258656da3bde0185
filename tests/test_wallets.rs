//! Integration tests for wallet creation and listing.
//!
//! Run with: `cargo test --test test_wallets`

mod common;

use common::harness;
use mcp_crypto_bot::mcp::{CreateWalletInput, ListWalletsInput};
use rmcp::handler::server::wrapper::Parameters;
use serde_json::{json, Value};

#[tokio::test]
async fn test_create_wallet_returns_public_view_only() {
    let h = harness(&[]);

    let envelope = h.dispatcher.dispatch("create_wallet", json!({"chain": "evm"})).await;

    let data = envelope.data().unwrap();
    assert_eq!(data["id"], "evm_1");
    assert_eq!(data["chain"], "evm");
    assert!(data["address"].as_str().unwrap().starts_with("0x"));
    assert!(data.get("private_key").is_none());
}

#[tokio::test]
async fn test_wallets_listed_in_creation_order() {
    let h = harness(&[]);
    let server = h.server();

    for chain in ["solana", "evm", "evm"] {
        let input = CreateWalletInput { chain: chain.to_string() };
        server.create_wallet(Parameters(input)).await.unwrap();
    }

    let output = server.list_wallets(Parameters(ListWalletsInput::default())).await.unwrap();
    assert!(!output.contains("private_key"));

    let envelope: Value = serde_json::from_str(&output).unwrap();
    let ids: Vec<&str> = envelope["data"]["wallets"]
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["evm_1", "evm_2", "sol_1"]);
    assert_eq!(envelope["data"]["count"], 3);
}

#[tokio::test]
async fn test_list_wallets_by_chain() {
    let h = harness(&[]);
    h.dispatcher.dispatch("create_wallet", json!({"chain": "evm"})).await;
    h.dispatcher.dispatch("create_wallet", json!({"chain": "sol"})).await;

    let envelope = h.dispatcher.dispatch("list_wallets", json!({"chain": "solana"})).await;

    let wallets = envelope.data().unwrap()["wallets"].as_array().unwrap().clone();
    assert_eq!(wallets.len(), 1);
    assert_eq!(wallets[0]["chain"], "solana");
}

#[tokio::test]
async fn test_create_wallet_unknown_chain() {
    let h = harness(&[]);

    let envelope = h.dispatcher.dispatch("create_wallet", json!({"chain": "bitcoin"})).await;

    assert!(!envelope.success());
    assert!(envelope.error().unwrap().contains("bitcoin"));
}

#[tokio::test]
async fn test_wallet_resource_matches_listing() {
    let h = harness(&[]);
    let server = h.server();
    h.dispatcher.dispatch("create_wallet", json!({"chain": "solana"})).await;

    let json = server.read_resource_json("wallets://").await.unwrap();
    let wallets: Vec<Value> = serde_json::from_str(&json).unwrap();

    assert_eq!(wallets.len(), 1);
    assert_eq!(wallets[0]["id"], "sol_1");
    assert!(!json.contains("private_key"));
}
