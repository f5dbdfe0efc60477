use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors a tool dispatch can recover from. These are serialized into the
/// conversation as tool results so the model gets a chance to self-correct.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Tool execution failed: {0}")]
    ExecutionError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ToolResult<T> = Result<T, ToolError>;

/// Errors that end an orchestration run. None of these produce a partial
/// reply; transports map them to a single failure response.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("no final reply after {0} tool rounds")]
    RoundsExhausted(usize),

    #[error("protocol mismatch: {0}")]
    ProtocolMismatch(String),
}

impl AgentError {
    /// Short category string suitable for a failure payload, without
    /// internal detail.
    pub fn category(&self) -> &'static str {
        match self {
            AgentError::UpstreamUnavailable(_) => "upstream unavailable",
            AgentError::RoundsExhausted(_) => "tool rounds exhausted",
            AgentError::ProtocolMismatch(_) => "protocol mismatch",
        }
    }
}

pub type AgentResult<T> = Result<T, AgentError>;
