//! Azure OpenAI chat completions client

use async_trait::async_trait;
use reqwest::Url;
use reqwest::header::CONTENT_TYPE;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument, warn};

use super::TextGenerator;
use crate::PlannerError;
use crate::config::LlmConfig;
use crate::services::http_client;

/// Retries for transient model endpoint failures
const MAX_RETRIES: u32 = 2;

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct AzureOpenAiClient {
    url: Url,
    api_key: String,
    temperature: f32,
    http: ClientWithMiddleware,
}

impl std::fmt::Debug for AzureOpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureOpenAiClient")
            .field("url", &self.url.as_str())
            .field("temperature", &self.temperature)
            .finish_non_exhaustive()
    }
}

fn required<'a>(value: Option<&'a String>, name: &str) -> crate::Result<&'a str> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| PlannerError::configuration(format!("Missing {name}")))
}

impl AzureOpenAiClient {
    /// Create a client from configuration
    pub fn from_config(config: &LlmConfig) -> crate::Result<Self> {
        let deployment = required(config.deployment.as_ref(), "AZURE_OPENAI_DEPLOYMENT")?;
        let endpoint = required(config.endpoint.as_ref(), "AZURE_OPENAI_ENDPOINT")?;
        let api_key = required(config.api_key.as_ref(), "AZURE_OPENAI_API_KEY")?;

        let url = Url::parse_with_params(
            &format!(
                "{}/openai/deployments/{}/chat/completions",
                endpoint.trim_end_matches('/'),
                urlencoding::encode(deployment)
            ),
            &[("api-version", config.api_version.as_str())],
        )
        .map_err(|e| PlannerError::configuration(format!("Invalid Azure OpenAI endpoint: {e}")))?;

        debug!(%url, "Created Azure OpenAI client");
        Ok(Self {
            url,
            api_key: api_key.to_string(),
            temperature: config.temperature,
            http: http_client(config.timeout_seconds, MAX_RETRIES)?,
        })
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    fn request_body(&self, system: &str, prompt: &str) -> serde_json::Value {
        json!({
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": prompt },
            ],
            "temperature": self.temperature,
        })
    }
}

#[async_trait]
impl TextGenerator for AzureOpenAiClient {
    #[instrument(level = "debug", skip_all, fields(prompt_len = prompt.len()))]
    async fn generate(&self, system: &str, prompt: &str) -> crate::Result<String> {
        let body = serde_json::to_vec(&self.request_body(system, prompt))
            .map_err(|e| PlannerError::general(format!("Failed to encode request: {e}")))?;

        let response = self
            .http
            .post(self.url.clone())
            .header("api-key", &self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(%status, "Model endpoint returned an error");
            return Err(PlannerError::downstream("llm", format!("{status}: {text}")));
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| PlannerError::downstream("llm", format!("Unexpected response: {e}")))?;

        reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| PlannerError::downstream("llm", "Model returned no content"))
    }
}
