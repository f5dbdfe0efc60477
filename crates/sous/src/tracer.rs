//! Structured records of every tool invocation the agent performs.
//!
//! The tracer writes to the `tracing` diagnostics stream, never to
//! user-visible output, and behaves identically under the HTTP and CLI
//! adapters. Result payloads are previewed rather than logged whole so a
//! large recipe dump does not flood the log.

use serde_json::Value;

use crate::errors::ToolResult;

pub const TARGET: &str = "sous::tool";

/// Result previews are truncated to this many characters.
pub const MAX_PREVIEW_LEN: usize = 200;

/// Record a tool call about to be dispatched.
pub fn tool_call(name: &str, arguments: &Value) {
    tracing::info!(
        target: "sous::tool",
        event = "tool_call",
        tool = name,
        args = %arguments,
    );
}

/// Record the outcome of a dispatched tool call, success or error.
pub fn tool_result(name: &str, result: &ToolResult<Value>) {
    match result {
        Ok(value) => tracing::info!(
            target: "sous::tool",
            event = "tool_result",
            tool = name,
            preview = %preview(&value.to_string()),
        ),
        Err(error) => tracing::info!(
            target: "sous::tool",
            event = "tool_result",
            tool = name,
            error = %preview(&error.to_string()),
        ),
    }
}

/// Truncate to `MAX_PREVIEW_LEN` characters, on a character boundary.
pub fn preview(text: &str) -> String {
    if text.chars().count() <= MAX_PREVIEW_LEN {
        return text.to_string();
    }
    let cut: String = text.chars().take(MAX_PREVIEW_LEN).collect();
    format!("{}...", cut)
}
