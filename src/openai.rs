use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::env;
use std::time::Duration;
use tracing::{debug, warn};

use expert_match::config::LlmConfig;
use expert_match::llm::{extract_json, TextGenerator};

const TEXT_TEMPERATURE: f64 = 0.7;
const JSON_TEMPERATURE: f64 = 0.4;

/// OpenAI-compatible chat completions client.
#[derive(Clone)]
pub struct LlmClient {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
}

impl LlmClient {
    /// `None` when `OPENAI_API_KEY` is unset, which leaves every stage on its
    /// deterministic path.
    pub fn from_env(config: &LlmConfig, model_override: Option<String>) -> Option<Self> {
        let api_key = env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())?;
        let model = model_override.unwrap_or_else(|| config.model.clone());
        let client = match reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
        {
            Ok(client) => client,
            Err(err) => {
                warn!("failed to build LLM HTTP client: {}", err);
                return None;
            }
        };
        Some(Self {
            client,
            api_key,
            api_base: config.api_base.clone(),
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
        temperature: f64,
    ) -> Result<String, String> {
        let url = format!("{}/chat/completions", self.api_base.trim_end_matches('/'));
        let request = ChatRequest {
            model: self.model.clone(),
            temperature,
            max_tokens,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_prompt.to_string(),
                },
            ],
        };

        let response = self
            .client
            .post(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|err| format!("LLM request failed: {}", err))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            let detail = error_body.trim();
            if detail.is_empty() {
                return Err(format!("LLM API error: {}", status));
            }
            return Err(format!("LLM API error: {} {}", status, detail));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|err| format!("LLM response parse failed: {}", err))?;

        let content = body
            .choices
            .first()
            .ok_or_else(|| "LLM response missing choices".to_string())?
            .message
            .content
            .trim()
            .to_string();
        debug!(model = %self.model, chars = content.len(), "LLM completion received");
        Ok(content)
    }
}

impl TextGenerator for LlmClient {
    fn is_available(&self) -> bool {
        true
    }

    async fn generate_text(&self, system: &str, user: &str, max_tokens: u32) -> Option<String> {
        match self.complete(system, user, max_tokens, TEXT_TEMPERATURE).await {
            Ok(content) => Some(content),
            Err(err) => {
                warn!("{}", err);
                None
            }
        }
    }

    async fn generate_json(&self, system: &str, user: &str, max_tokens: u32) -> Option<Value> {
        let system = format!("{} Respond with JSON only, no markdown or commentary.", system);
        let content = match self.complete(&system, user, max_tokens, JSON_TEMPERATURE).await {
            Ok(content) => content,
            Err(err) => {
                warn!("{}", err);
                return None;
            }
        };
        let Some(json) = extract_json(&content) else {
            warn!("LLM response missing JSON");
            return None;
        };
        match serde_json::from_str(&json) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!("LLM JSON parse failed: {}", err);
                None
            }
        }
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: String,
}
