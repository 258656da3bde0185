//! MCP server module.
//!
//! Contains the MCP server implementation with tool and resource handlers.

pub mod server;

pub use server::CryptoBotServer;
pub use server::{
    AiQueryInput, CancelOrderInput, CreateWalletInput, GetEthBalanceInput, GetOhlcvInput,
    GetPriceInput, GetSolBalanceInput, ListWalletsInput, PlaceOrderInput, RecordPnlInput,
    SendNotificationInput,
};
