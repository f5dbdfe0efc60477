use std::collections::HashSet;
use std::time::Duration;

use serde_json::Value;

use crate::errors::{AgentError, AgentResult, ToolError, ToolResult};
use crate::models::message::{Message, MessageContent, ToolRequest};
use crate::models::tool::{Tool, ToolCall};
use crate::prompt::build_system_prompt;
use crate::providers::base::Provider;
use crate::systems::System;
use crate::tracer;

pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 8;
pub const DEFAULT_DISPATCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Agent integrates a completion provider with the systems it can operate.
///
/// One `reply` call is one orchestration run: a bounded sequence of
/// completion rounds, each followed by the tool dispatches the model
/// requested, ending in exactly one final assistant reply. The caller's
/// history is never mutated; the run extends its own copy.
pub struct Agent {
    systems: Vec<Box<dyn System>>,
    provider: Box<dyn Provider>,
    max_tool_rounds: usize,
    dispatch_timeout: Duration,
}

impl Agent {
    /// Create a new Agent with the specified provider
    pub fn new(provider: Box<dyn Provider>) -> Self {
        Self {
            systems: Vec::new(),
            provider,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            dispatch_timeout: DEFAULT_DISPATCH_TIMEOUT,
        }
    }

    /// Cap on completion rounds before the run fails with RoundsExhausted
    pub fn with_max_tool_rounds(mut self, rounds: usize) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    /// Per-dispatch timeout; exceeding it aborts the run as upstream loss
    pub fn with_dispatch_timeout(mut self, timeout: Duration) -> Self {
        self.dispatch_timeout = timeout;
        self
    }

    /// Add a system to the agent
    pub fn add_system(&mut self, system: Box<dyn System>) {
        self.systems.push(system);
    }

    /// The combined tool catalog across all systems
    fn tools(&self) -> Vec<Tool> {
        self.systems
            .iter()
            .flat_map(|system| system.tools().iter().cloned())
            .collect()
    }

    /// Find the system and declaration owning a tool name
    fn lookup(&self, name: &str) -> Option<(&dyn System, &Tool)> {
        for system in &self.systems {
            if let Some(tool) = system.tools().iter().find(|t| t.name == name) {
                return Some((system.as_ref(), tool));
            }
        }
        None
    }

    /// Run one orchestration to a final reply.
    pub async fn reply(&self, messages: &[Message]) -> AgentResult<Message> {
        verify_history(messages)?;

        let mut messages = messages.to_vec();
        let tools = self.tools();
        let system_prompt = build_system_prompt(&self.systems);

        for _ in 0..self.max_tool_rounds {
            let (response, _usage) = self
                .provider
                .complete(&system_prompt, &messages, &tools)
                .await
                .map_err(|e| AgentError::UpstreamUnavailable(e.to_string()))?;

            let requests: Vec<ToolRequest> =
                response.tool_requests().into_iter().cloned().collect();
            if requests.is_empty() {
                return Ok(response);
            }

            messages.push(response);

            // Dispatch sequentially, in the order the model emitted the
            // calls; the model may rely on earlier results when it ordered
            // later calls.
            let mut tool_responses = Message::user();
            for request in &requests {
                let output = self.dispatch_tool_call(&request.tool_call).await?;
                tool_responses = tool_responses.with_tool_response(request.id.clone(), output);
            }
            messages.push(tool_responses);
        }

        Err(AgentError::RoundsExhausted(self.max_tool_rounds))
    }

    /// Dispatch a single tool call.
    ///
    /// The outer error aborts the run (dispatch timeout); the inner one is
    /// a structured result fed back to the model, which never crashes the
    /// round. Every dispatch and its outcome is traced, failures included.
    async fn dispatch_tool_call(
        &self,
        tool_call: &ToolResult<ToolCall>,
    ) -> AgentResult<ToolResult<Value>> {
        let call = match tool_call {
            Ok(call) => call.clone(),
            Err(e) => {
                // The model emitted a call we could not interpret; reflect
                // the parse error back as the result.
                tracer::tool_result("unparsed", &Err(e.clone()));
                return Ok(Err(e.clone()));
            }
        };

        tracer::tool_call(&call.name, &call.arguments);
        let name = call.name.clone();

        let result = match self.lookup(&name) {
            None => Err(ToolError::ToolNotFound(name.clone())),
            Some((system, tool)) => match tool.validate_arguments(&call.arguments) {
                Err(e) => Err(e),
                Ok(()) => {
                    match tokio::time::timeout(self.dispatch_timeout, system.call(call)).await {
                        Ok(result) => result,
                        Err(_) => {
                            let timed_out = ToolError::ExecutionError(format!(
                                "tool '{}' timed out",
                                name
                            ));
                            tracer::tool_result(&name, &Err(timed_out));
                            return Err(AgentError::UpstreamUnavailable(format!(
                                "tool '{}' timed out after {}s",
                                name,
                                self.dispatch_timeout.as_secs()
                            )));
                        }
                    }
                }
            },
        };

        tracer::tool_result(&name, &result);
        Ok(result)
    }
}

/// Check the tool-result pairing invariant over a history.
///
/// Every tool response id must match a tool request id of the immediately
/// preceding message; anything else means the caller (or a completion
/// client) broke the conversation contract.
fn verify_history(messages: &[Message]) -> AgentResult<()> {
    let mut prior_request_ids: HashSet<&str> = HashSet::new();
    for message in messages {
        for content in &message.content {
            if let MessageContent::ToolResponse(response) = content {
                if !prior_request_ids.contains(response.id.as_str()) {
                    return Err(AgentError::ProtocolMismatch(format!(
                        "tool result '{}' has no matching call in the preceding message",
                        response.id
                    )));
                }
            }
        }
        prior_request_ids = message
            .tool_requests()
            .into_iter()
            .map(|r| r.id.as_str())
            .collect();
    }
    Ok(())
}
