//! Error types and result aliases for the concierge.
//!
//! [`ConciergeError`] is the single error type used below the orchestrator. Tool
//! failures are caught at the dispatcher and reasoning failures at the orchestrator,
//! so these errors never reach the transport layer as-is.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConciergeError {
    #[error("LLM gateway error: {0}")]
    GatewayError(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Tool error: {0}")]
    ToolError(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Timeout error: {0}")]
    TimeoutError(String),
}

pub type Result<T> = std::result::Result<T, ConciergeError>;
