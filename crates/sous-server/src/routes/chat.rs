use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sous::{
    agent::Agent,
    errors::AgentError,
    models::message::Message,
    providers::ollama::OllamaProvider,
    recipes::RecipeSystem,
};

use crate::state::AppState;

// Types matching the incoming JSON structure
#[derive(Debug, Deserialize)]
struct ChatRequest {
    messages: Vec<IncomingMessage>,
}

#[derive(Debug, Deserialize)]
struct IncomingMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    content: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    detail: String,
}

// Convert incoming messages to our internal Message type
fn convert_messages(incoming: Vec<IncomingMessage>) -> Vec<Message> {
    let mut messages = Vec::new();

    for msg in incoming {
        match msg.role.as_str() {
            "user" => messages.push(Message::user().with_text(msg.content)),
            "assistant" => messages.push(Message::assistant().with_text(msg.content)),
            other => {
                tracing::warn!("skipping message with unknown role: {}", other);
            }
        }
    }

    messages
}

fn bad_gateway(detail: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_GATEWAY,
        Json(ErrorResponse {
            detail: detail.to_string(),
        }),
    )
}

/// Run one assistant turn over the supplied history and return the final
/// reply. Tool traffic produced during the run stays internal; the tracer
/// is the place to observe it.
async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ErrorResponse>)> {
    let provider = OllamaProvider::new(state.provider_config.clone())
        .map_err(|e| {
            tracing::error!("failed to build completion client: {}", e);
            bad_gateway("upstream unavailable")
        })?;

    let mut agent = Agent::new(Box::new(provider))
        .with_max_tool_rounds(state.max_tool_rounds)
        .with_dispatch_timeout(state.dispatch_timeout);
    agent.add_system(Box::new(RecipeSystem::new(state.store.clone())));

    let messages = convert_messages(request.messages);

    match agent.reply(&messages).await {
        Ok(reply) => Ok(Json(ChatResponse {
            content: reply.text(),
        })),
        Err(error) => {
            // RoundsExhausted maps to the same failure response but is
            // logged under its own name for diagnosis.
            match &error {
                AgentError::RoundsExhausted(cap) => {
                    tracing::error!("chat failed: rounds exhausted at {}", cap)
                }
                other => tracing::error!("chat failed: {}", other),
            }
            Err(bad_gateway(error.category()))
        }
    }
}

// Configure routes for this module
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(chat_handler))
        .with_state(state)
}
