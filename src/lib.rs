//! MCP Crypto Bot Library
//!
//! A Model Context Protocol server for crypto trading operations.
//! Every request is routed through a single dispatcher that checks which
//! integrations are configured, enforces risk limits, and simulates
//! state-changing actions unless live trading is explicitly confirmed.
//!
//! # Features
//!
//! - **Exchange Trading**: Prices, balances, candles and orders on Binance
//! - **Chain Queries**: Native balances on EVM chains and Solana
//! - **Wallets**: In-memory EVM and Solana wallet generation
//! - **AI and Notifications**: Provider queries and Telegram owner messages
//!
//! # Example
//!
//! ```rust,ignore
//! use mcp_crypto_bot::{Config, CryptoBotServer};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let server = CryptoBotServer::new(config)?;
//!     // Run server...
//!     Ok(())
//! }
//! ```

pub mod ai;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod ethereum;
pub mod exchange;
pub mod mcp;
pub mod notify;
pub mod policy;
pub mod services;
pub mod solana;
pub mod types;
pub mod wallets;

pub use config::Config;
pub use dispatch::{Action, Collaborators, Dispatcher, ResponseEnvelope};
pub use error::{AppError, Result};
pub use mcp::CryptoBotServer;
