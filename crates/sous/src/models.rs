//! These models represent the objects passed around by the agent.
//!
//! There are a few related formats in play:
//! - transport messages, sent from the HTTP or CLI adapter to the agent
//! - openai-style messages/tools, sent from the agent to the LLM
//! - tool calls, sent from the agent to the systems providing capabilities
//!
//! Wire formats are converted at the boundary (see providers::utils); the
//! internal structs here are not an exact match to any single one of them.
pub mod message;
pub mod role;
pub mod tool;
