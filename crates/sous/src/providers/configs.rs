pub const OLLAMA_HOST: &str = "http://localhost:11434";
pub const OLLAMA_MODEL: &str = "llama3.1";
pub const OLLAMA_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct OllamaProviderConfig {
    pub host: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<i32>,
    /// Per-request timeout for completion calls; exceeding it is treated
    /// as upstream unavailability for the round.
    pub timeout_secs: u64,
}

impl Default for OllamaProviderConfig {
    fn default() -> Self {
        Self {
            host: OLLAMA_HOST.to_string(),
            model: OLLAMA_MODEL.to_string(),
            temperature: None,
            max_tokens: None,
            timeout_secs: OLLAMA_TIMEOUT_SECS,
        }
    }
}
