mod prompt;
mod session;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use sous::agent::{Agent, DEFAULT_MAX_TOOL_ROUNDS};
use sous::providers::configs::{OllamaProviderConfig, OLLAMA_HOST, OLLAMA_MODEL};
use sous::providers::ollama::OllamaProvider;
use sous::recipes::store::RecipeStore;
use sous::recipes::RecipeSystem;

use crate::prompt::rustyline::RustylinePrompt;
use crate::session::Session;

#[derive(Parser)]
#[command(author, version, about = "Chat with your pantry and recipe store", long_about = None)]
struct Cli {
    /// Ollama host serving completions
    #[arg(long, default_value = OLLAMA_HOST)]
    host: String,

    /// Model to use
    #[arg(short, long, default_value = OLLAMA_MODEL)]
    model: String,

    /// Path to the recipe database (created if absent)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Maximum tool rounds per reply
    #[arg(long, default_value_t = DEFAULT_MAX_TOOL_ROUNDS)]
    max_tool_rounds: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    // Tool traces go to stderr so they never mix with rendered replies.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let provider = OllamaProvider::new(OllamaProviderConfig {
        host: cli.host,
        model: cli.model,
        ..Default::default()
    })?;

    let db_path = cli.db.unwrap_or_else(RecipeStore::default_path);
    let store = RecipeStore::open(&db_path)?;

    let mut agent = Agent::new(Box::new(provider)).with_max_tool_rounds(cli.max_tool_rounds);
    agent.add_system(Box::new(RecipeSystem::new(Arc::new(store))));

    let mut session = Session::new(agent, Box::new(RustylinePrompt::new()));
    session.start().await
}
