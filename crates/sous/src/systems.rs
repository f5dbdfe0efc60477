use async_trait::async_trait;
use serde_json::Value;

use crate::errors::ToolResult;
use crate::models::tool::{Tool, ToolCall};

/// Core trait for a system that exposes tools the agent can dispatch to.
///
/// A system owns its tool catalog and whatever state backs it; from the
/// agent's point of view it is a registry of named, schema-typed
/// operations. Implementations must convert their own failures into
/// `ToolError` values rather than panicking, so a failed tool never takes
/// down the orchestration run.
#[async_trait]
pub trait System: Send + Sync {
    /// Get the name of the system
    fn name(&self) -> &str;

    /// Get the system description
    fn description(&self) -> &str;

    /// Instructions injected into the system prompt for this system's tools
    fn instructions(&self) -> &str;

    /// Get available tools
    fn tools(&self) -> &[Tool];

    /// Call a tool with the given arguments
    async fn call(&self, tool_call: ToolCall) -> ToolResult<Value>;
}
