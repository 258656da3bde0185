//! Error types and handling module.
//!
//! Defines all application-specific error types and conversions.

use rmcp::ErrorData as McpError;
use thiserror::Error;

/// Application-wide error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The requested action is not in the action registry.
    #[error("UnknownAction: '{0}' is not a registered action")]
    UnknownAction(String),

    /// Action parameters could not be decoded or failed validation.
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// Invalid chain address.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// A state-changing action breached a configured risk limit.
    #[error("RiskLimitExceeded: {0}")]
    RiskLimitExceeded(String),

    /// Failure raised by an external collaborator, wrapped at the dispatch boundary.
    #[error("CollaboratorError: {service}: {message}")]
    Collaborator { service: String, message: String },

    /// Transport errors.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Blockchain RPC errors.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Exchange API rejected the request.
    #[error("Exchange error: {0}")]
    Exchange(String),

    /// Wallet-related errors.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Parse error.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl AppError {
    /// Wrap a collaborator failure, keeping only its human-readable message.
    pub fn collaborator(service: impl Into<String>, err: AppError) -> Self {
        match err {
            // Already wrapped further down; do not nest.
            AppError::Collaborator { .. } => err,
            other => AppError::Collaborator { service: service.into(), message: other.to_string() },
        }
    }
}

impl From<alloy::transports::TransportError> for AppError {
    fn from(err: alloy::transports::TransportError) -> Self {
        AppError::Transport(err.to_string())
    }
}

impl From<alloy::signers::local::LocalSignerError> for AppError {
    fn from(err: alloy::signers::local::LocalSignerError) -> Self {
        AppError::Wallet(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        // Request URLs may carry API keys in the query string.
        AppError::Transport(err.without_url().to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Parse(err.to_string())
    }
}

impl From<AppError> for McpError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::InvalidAddress(_)
            | AppError::InvalidParams(_)
            | AppError::UnknownAction(_)
            | AppError::Parse(_) => McpError::invalid_params(err.to_string(), None),
            AppError::Config(_) => McpError::invalid_request(err.to_string(), None),
            _ => McpError::internal_error(err.to_string(), None),
        }
    }
}

/// Result type alias using AppError.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::ErrorCode;

    #[test]
    fn test_app_error_config_display() {
        let err = AppError::Config("MAX_ORDER_USD must be positive".to_string());
        assert_eq!(err.to_string(), "Configuration error: MAX_ORDER_USD must be positive");
    }

    #[test]
    fn test_unknown_action_display() {
        let err = AppError::UnknownAction("withdraw_all".to_string());
        assert_eq!(err.to_string(), "UnknownAction: 'withdraw_all' is not a registered action");
    }

    #[test]
    fn test_risk_limit_display_starts_with_taxonomy_name() {
        let err = AppError::RiskLimitExceeded("order notional 150 exceeds 100".to_string());
        assert!(err.to_string().starts_with("RiskLimitExceeded"));
    }

    #[test]
    fn test_collaborator_display() {
        let err = AppError::Collaborator {
            service: "exchange".to_string(),
            message: "Transport error: timed out".to_string(),
        };
        assert_eq!(err.to_string(), "CollaboratorError: exchange: Transport error: timed out");
    }

    #[test]
    fn test_collaborator_wraps_message() {
        let err = AppError::collaborator("solana", AppError::Rpc("node is behind".to_string()));
        match err {
            AppError::Collaborator { service, message } => {
                assert_eq!(service, "solana");
                assert_eq!(message, "RPC error: node is behind");
            }
            _ => panic!("Expected Collaborator error"),
        }
    }

    #[test]
    fn test_collaborator_does_not_nest() {
        let inner = AppError::collaborator("exchange", AppError::Exchange("-2010".to_string()));
        let outer = AppError::collaborator("dispatcher", inner);
        assert_eq!(outer.to_string(), "CollaboratorError: exchange: Exchange error: -2010");
    }

    #[test]
    fn test_from_serde_json_error() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let app_err: AppError = parse_err.into();
        assert!(matches!(app_err, AppError::Parse(_)));
    }

    #[test]
    fn test_app_error_to_mcp_error_invalid_params() {
        let err = AppError::InvalidAddress("bad address".to_string());
        let mcp_err: McpError = err.into();
        assert_eq!(mcp_err.code, ErrorCode::INVALID_PARAMS);

        let err = AppError::InvalidParams("missing symbol".to_string());
        let mcp_err: McpError = err.into();
        assert_eq!(mcp_err.code, ErrorCode::INVALID_PARAMS);

        let err = AppError::UnknownAction("nope".to_string());
        let mcp_err: McpError = err.into();
        assert_eq!(mcp_err.code, ErrorCode::INVALID_PARAMS);
    }

    #[test]
    fn test_app_error_to_mcp_error_invalid_request() {
        let err = AppError::Config("config error".to_string());
        let mcp_err: McpError = err.into();
        assert_eq!(mcp_err.code, ErrorCode::INVALID_REQUEST);
    }

    #[test]
    fn test_app_error_to_mcp_error_internal_error() {
        let err = AppError::Rpc("rpc failed".to_string());
        let mcp_err: McpError = err.into();
        assert_eq!(mcp_err.code, ErrorCode::INTERNAL_ERROR);

        let err = AppError::RiskLimitExceeded("too large".to_string());
        let mcp_err: McpError = err.into();
        assert_eq!(mcp_err.code, ErrorCode::INTERNAL_ERROR);
    }

    #[test]
    fn test_mcp_error_message_preserved() {
        let err = AppError::Transport("Connection refused".to_string());
        let mcp_err: McpError = err.into();
        assert!(mcp_err.message.contains("Connection refused"));
        assert!(mcp_err.data.is_none());
    }
}
