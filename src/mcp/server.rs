//! MCP server implementation.

use std::sync::Arc;

use rmcp::{
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{
        AnnotateAble, Implementation, ListResourcesResult, PaginatedRequestParam, RawResource,
        ReadResourceRequestParam, ReadResourceResult, Resource, ResourceContents,
        ServerCapabilities, ServerInfo,
    },
    schemars,
    service::RequestContext,
    tool, tool_handler, tool_router, ErrorData as McpError, RoleServer, ServerHandler,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    config::Config,
    dispatch::{Action, Collaborators, Dispatcher},
    error::AppError,
    services::{resources, CandleQuery, CANDLES_URI_PREFIX, WALLETS_URI},
};

/// Crypto trading bot MCP server.
///
/// Every tool goes through the [`Dispatcher`] and returns a JSON response
/// envelope, so tool calls never fail at the protocol level.
#[derive(Clone)]
pub struct CryptoBotServer {
    dispatcher: Arc<Dispatcher>,
    tool_router: ToolRouter<Self>,
}

impl CryptoBotServer {
    /// Create a server with real collaborators for every configured service.
    ///
    /// Note: No network calls are made during startup. Connections are
    /// established when the first tool needing them is invoked.
    pub fn new(config: Config) -> Result<Self, AppError> {
        tracing::info!("Initializing MCP Crypto Bot server");

        let config = Arc::new(config);
        let collaborators = Collaborators::from_config(&config)?;
        let dispatcher = Arc::new(Dispatcher::new(config, collaborators));

        tracing::info!("MCP Crypto Bot server initialized successfully");

        Ok(Self::with_dispatcher(dispatcher))
    }

    /// Create a server around an existing dispatcher.
    pub fn with_dispatcher(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher, tool_router: Self::tool_router() }
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    async fn run(&self, action: Action, params: Value) -> Result<String, McpError> {
        tracing::info!(action = %action, "Tool called");
        Ok(self.dispatcher.dispatch(action.name(), params).await.to_json_pretty())
    }

    /// Resources advertised to clients.
    pub fn resource_list(&self) -> Vec<Resource> {
        let mut list = vec![RawResource::new(WALLETS_URI, "wallets").no_annotation()];
        if let Some(exchange) = &self.dispatcher.collaborators().exchange {
            let uri = format!("{}{}/BTCUSDT/1h", CANDLES_URI_PREFIX, exchange.venue());
            list.push(RawResource::new(uri, "candles").no_annotation());
        }
        list
    }

    /// Read a resource as JSON text.
    pub async fn read_resource_json(&self, uri: &str) -> Result<String, McpError> {
        tracing::info!(uri = %uri, "Resource read");

        let value = if uri == WALLETS_URI {
            serde_json::to_value(resources::wallet_listing(&self.dispatcher).await)
        } else if uri.starts_with(CANDLES_URI_PREFIX) {
            let query = CandleQuery::from_uri(uri)?;
            serde_json::to_value(resources::candle_listing(&self.dispatcher, &query).await)
        } else {
            return Err(McpError::resource_not_found(
                format!("Unknown resource: {}", uri),
                Some(json!({ "uri": uri })),
            ));
        };

        let value = value.map_err(|e| McpError::internal_error(e.to_string(), None))?;
        serde_json::to_string_pretty(&value)
            .map_err(|e| McpError::internal_error(e.to_string(), None))
    }
}

fn to_params<T: Serialize>(input: &T) -> Result<Value, McpError> {
    serde_json::to_value(input).map_err(|e| McpError::internal_error(e.to_string(), None))
}

/// Input parameters for the get_price tool.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GetPriceInput {
    /// Trading pair, e.g. "BTCUSDT", "BTC/USDT" or "btc-usdt".
    pub symbol: String,
}

/// Input parameters for the get_ohlcv tool.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GetOhlcvInput {
    /// Trading pair, e.g. "ETHUSDT".
    pub symbol: String,
    /// Candle interval such as "1m", "15m", "1h", "4h" or "1d". Default: "1h".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<String>,
    /// Number of candles (1-1000). Default: 100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// Input parameters for the place_order tool.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PlaceOrderInput {
    /// Trading pair, e.g. "BTCUSDT".
    pub symbol: String,
    /// "buy" or "sell".
    pub side: String,
    /// "market" or "limit". Default: "market".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_type: Option<String>,
    /// Quantity in base asset units (e.g., "0.001").
    pub amount: String,
    /// Limit price in quote units. Required for limit orders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    /// Order value in USD. Sizes market orders; never lowers amount * price for risk checks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notional_usd: Option<String>,
}

/// Input parameters for the cancel_order tool.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CancelOrderInput {
    /// Trading pair the order belongs to.
    pub symbol: String,
    /// Exchange order id.
    pub order_id: String,
}

/// Input parameters for the get_eth_balance tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GetEthBalanceInput {
    /// Address to query (0x...). Defaults to the configured EVM account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Input parameters for the get_sol_balance tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GetSolBalanceInput {
    /// Base58 public key. Defaults to the configured Solana account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pubkey: Option<String>,
}

/// Input parameters for the create_wallet tool.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CreateWalletInput {
    /// "evm" or "solana".
    pub chain: String,
}

/// Input parameters for the list_wallets tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ListWalletsInput {
    /// Only list wallets of this chain ("evm" or "solana").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain: Option<String>,
}

/// Input parameters for the ai_query tool.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct AiQueryInput {
    /// "openai", "gemini" or "deepseek".
    pub provider: String,
    pub prompt: String,
}

/// Input parameters for the send_notification tool.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SendNotificationInput {
    /// Message text for the owner.
    pub message: String,
}

/// Input parameters for the record_pnl tool.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct RecordPnlInput {
    /// Realized profit (positive) or loss (negative) in USD, e.g. "-25.5".
    pub pnl_usd: String,
}

#[tool_router]
impl CryptoBotServer {
    #[tool(description = "Get bot status: environment, whether trading is enabled, and features")]
    pub async fn get_status(&self) -> Result<String, McpError> {
        self.run(Action::GetStatus, Value::Null).await
    }

    #[tool(description = "Get the current configuration without sensitive data")]
    pub async fn get_config(&self) -> Result<String, McpError> {
        self.run(Action::GetConfig, Value::Null).await
    }

    #[tool(description = "Test connections to Binance, Ethereum and Solana")]
    pub async fn test_connection(&self) -> Result<String, McpError> {
        self.run(Action::TestConnection, Value::Null).await
    }

    #[tool(description = "Get the latest price, bid, ask and 24h volume for a trading pair")]
    pub async fn get_price(
        &self,
        Parameters(input): Parameters<GetPriceInput>,
    ) -> Result<String, McpError> {
        self.run(Action::GetPrice, to_params(&input)?).await
    }

    #[tool(description = "Get non-zero exchange account balances")]
    pub async fn get_balance(&self) -> Result<String, McpError> {
        self.run(Action::GetBalance, Value::Null).await
    }

    #[tool(description = "Get OHLCV candles for a trading pair, oldest first")]
    pub async fn get_ohlcv(
        &self,
        Parameters(input): Parameters<GetOhlcvInput>,
    ) -> Result<String, McpError> {
        self.run(Action::GetOhlcv, to_params(&input)?).await
    }

    /// Place an order on the exchange.
    ///
    /// Checked against the order size and daily loss limits first. Unless the
    /// bot runs in live mode with the safety confirmation set, the order is
    /// only simulated and the result has status "dry_run".
    #[tool(
        description = "Place a market or limit order. Subject to risk limits; simulated (dry_run) unless live trading is enabled and confirmed."
    )]
    pub async fn place_order(
        &self,
        Parameters(input): Parameters<PlaceOrderInput>,
    ) -> Result<String, McpError> {
        self.run(Action::PlaceOrder, to_params(&input)?).await
    }

    #[tool(
        description = "Cancel an open order. Simulated (dry_run) unless live trading is enabled and confirmed."
    )]
    pub async fn cancel_order(
        &self,
        Parameters(input): Parameters<CancelOrderInput>,
    ) -> Result<String, McpError> {
        self.run(Action::CancelOrder, to_params(&input)?).await
    }

    #[tool(description = "Get the native ETH balance of an address")]
    pub async fn get_eth_balance(
        &self,
        Parameters(input): Parameters<GetEthBalanceInput>,
    ) -> Result<String, McpError> {
        self.run(Action::GetEthBalance, to_params(&input)?).await
    }

    #[tool(description = "Get the native SOL balance of a public key")]
    pub async fn get_sol_balance(
        &self,
        Parameters(input): Parameters<GetSolBalanceInput>,
    ) -> Result<String, McpError> {
        self.run(Action::GetSolBalance, to_params(&input)?).await
    }

    #[tool(description = "Create a new in-memory EVM or Solana wallet and return its address")]
    pub async fn create_wallet(
        &self,
        Parameters(input): Parameters<CreateWalletInput>,
    ) -> Result<String, McpError> {
        self.run(Action::CreateWallet, to_params(&input)?).await
    }

    #[tool(description = "List wallets created in this session")]
    pub async fn list_wallets(
        &self,
        Parameters(input): Parameters<ListWalletsInput>,
    ) -> Result<String, McpError> {
        self.run(Action::ListWallets, to_params(&input)?).await
    }

    #[tool(description = "Ask an AI provider (openai, gemini or deepseek) a trading question")]
    pub async fn ai_query(
        &self,
        Parameters(input): Parameters<AiQueryInput>,
    ) -> Result<String, McpError> {
        self.run(Action::AiQuery, to_params(&input)?).await
    }

    #[tool(description = "Send a message to the owner through the Telegram bot")]
    pub async fn send_notification(
        &self,
        Parameters(input): Parameters<SendNotificationInput>,
    ) -> Result<String, McpError> {
        self.run(Action::SendNotification, to_params(&input)?).await
    }

    #[tool(description = "Record realized profit or loss in USD against today's loss limit")]
    pub async fn record_pnl(
        &self,
        Parameters(input): Parameters<RecordPnlInput>,
    ) -> Result<String, McpError> {
        self.run(Action::RecordPnl, to_params(&input)?).await
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for CryptoBotServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities::builder().enable_resources().enable_tools().build(),
            server_info: Implementation {
                name: "mcp-crypto-bot".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "MCP Crypto Bot. Market data, balances and orders on Binance, EVM and Solana \
                 balances, in-memory wallets, AI queries and Telegram notifications. Orders \
                 are simulated unless live trading is enabled and confirmed. Resources: \
                 wallets:// and candles://{venue}/{symbol}/{timeframe}."
                    .to_string(),
            ),
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult::with_all_items(self.resource_list()))
    }

    async fn read_resource(
        &self,
        ReadResourceRequestParam { uri }: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        let text = self.read_resource_json(&uri).await?;
        Ok(ReadResourceResult { contents: vec![ResourceContents::text(text, uri)] })
    }
}
