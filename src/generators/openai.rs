use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use super::TextGenerator;
use crate::error::{ItineraryError, Result};
use crate::services::openai_client::{first_message_content, ChatCompletionRequest, OpenAIClient};

const DEFAULT_MODEL: &str = "openai/gpt-4.1-mini";

const SYSTEM_PROMPT: &str = "You are a meticulous travel planner. Answer only with the itinerary in the requested markdown format, without introductions or closing remarks.";

/// Text generator backed by an OpenAI-compatible chat completions endpoint
#[derive(Debug, Clone)]
pub struct OpenAiGenerator {
    client: OpenAIClient,
    model: String,
    system_prompt: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    timeout: Duration,
}

impl OpenAiGenerator {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: OpenAIClient::new(api_key.into()),
            model: DEFAULT_MODEL.to_string(),
            system_prompt: Some(SYSTEM_PROMPT.to_string()),
            max_tokens: Some(4000),
            temperature: Some(0.7),
            timeout: Duration::from_secs(120),
        }
    }

    /// Reads `OPENAI_API_KEY`, `OPENAI_BASE_URL` (or `OPENROUTER_BASE_URL`)
    /// and `ITINERARY_MODEL`
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            ItineraryError::Config(
                "OPENAI_API_KEY environment variable must be set before creating a generator"
                    .to_string(),
            )
        })?;

        let mut generator = Self::new(api_key);
        if let Ok(base_url) =
            std::env::var("OPENAI_BASE_URL").or_else(|_| std::env::var("OPENROUTER_BASE_URL"))
        {
            generator.client.set_base_url(base_url);
        }
        if let Ok(model) = std::env::var("ITINERARY_MODEL") {
            if !model.trim().is_empty() {
                generator.model = model;
            }
        }
        Ok(generator)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.client.set_base_url(base_url);
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: Option<String>) -> Self {
        self.system_prompt = system_prompt;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Initial wait used by the HTTP-level 429/5xx retry loop
    pub fn with_http_backoff(mut self, backoff: Duration) -> Self {
        self.client.set_initial_backoff(backoff);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system_prompt) = &self.system_prompt {
            messages.push(json!({ "role": "system", "content": system_prompt }));
        }
        messages.push(json!({ "role": "user", "content": prompt }));

        let body = ChatCompletionRequest::new(self.model.clone(), messages)
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature)
            .into_value();

        let response = self.client.chat_completion(&body, self.timeout).await?;

        if let Some(usage) = response.get("usage") {
            debug!(target: "itinerary::generator", model = %self.model, %usage, "completion usage");
        }

        match first_message_content(&response) {
            Some(content) if !content.trim().is_empty() => Ok(content.to_string()),
            _ => Err(ItineraryError::EmptyResponse),
        }
    }

    fn name(&self) -> &str {
        "openai"
    }
}
