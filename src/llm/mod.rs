//! Language model access
//!
//! The planner only needs one capability from a model: turn an instruction
//! and a prompt into text. Providers implement [`TextGenerator`]; the agents
//! of the LLM strategy hold an `Arc<dyn TextGenerator>`.

use std::sync::Arc;

use async_trait::async_trait;

mod azure;

pub use azure::AzureOpenAiClient;

use crate::config::LlmConfig;

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a reply to `prompt` following the `system` instruction
    async fn generate(&self, system: &str, prompt: &str) -> crate::Result<String>;
}

/// Create the configured text generator. Fails with a configuration error
/// when credentials are missing.
pub fn create_generator(config: &LlmConfig) -> crate::Result<Arc<dyn TextGenerator>> {
    Ok(Arc::new(AzureOpenAiClient::from_config(config)?))
}
