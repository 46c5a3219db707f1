use std::time::Duration;

use reqwest::StatusCode;
use serde_json::{json, Value};
use tracing::warn;

use crate::error::{ItineraryError, Result};

pub(crate) const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
const MAX_HTTP_RETRIES: usize = 3;

#[derive(Clone, Debug)]
pub struct OpenAIClient {
    api_key: String,
    base_url: String,
    initial_backoff: Duration,
}

impl OpenAIClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            initial_backoff: Duration::from_millis(250),
        }
    }

    pub fn set_base_url(&mut self, base_url: impl Into<String>) {
        self.base_url = base_url.into();
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_initial_backoff(&mut self, backoff: Duration) {
        self.initial_backoff = backoff;
    }

    pub async fn chat_completion(&self, body: &Value, timeout: Duration) -> Result<Value> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ItineraryError::Config(format!("Failed to build HTTP client: {err}")))?;

        let mut attempt = 0;
        let mut backoff = self.initial_backoff;

        loop {
            let request_url = build_chat_url(&self.base_url);

            let response = client
                .post(&request_url)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("Content-Type", "application/json")
                .header("X-Title", "tiny-itinerary-rs")
                .json(body)
                .send()
                .await
                .map_err(map_transport_error)?;

            let status = response.status();
            let headers = response.headers().clone();
            let response_text = response.text().await.map_err(map_transport_error)?;

            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after_duration = headers
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.parse::<u64>().ok())
                    .map(Duration::from_secs)
                    .unwrap_or(backoff);

                if attempt < MAX_HTTP_RETRIES {
                    warn!(
                        target: "itinerary::generator",
                        attempt,
                        wait_ms = retry_after_duration.as_millis() as u64,
                        "rate limited, waiting before retry"
                    );
                    tokio::time::sleep(retry_after_duration).await;
                    attempt += 1;
                    backoff *= 2;
                    continue;
                }

                return Err(ItineraryError::RateLimit {
                    retry_after: retry_after_duration.as_secs().max(1),
                });
            }

            if status.is_server_error() && attempt < MAX_HTTP_RETRIES {
                warn!(target: "itinerary::generator", attempt, %status, "server error, retrying");
                tokio::time::sleep(backoff).await;
                attempt += 1;
                backoff *= 2;
                continue;
            }

            let response_json: Value = match serde_json::from_str(&response_text) {
                Ok(value) => value,
                Err(_) if !status.is_success() => {
                    return Err(ItineraryError::Generator(format!(
                        "HTTP {} error: {}",
                        status, response_text
                    )))
                }
                Err(err) => {
                    return Err(ItineraryError::Generator(format!(
                        "Failed to parse JSON: {err}"
                    )))
                }
            };

            if !status.is_success() {
                let api_message = response_json
                    .get("error")
                    .and_then(|error| error.get("message"))
                    .and_then(|value| value.as_str())
                    .map(|s| s.to_string())
                    .unwrap_or(response_text.clone());

                return Err(ItineraryError::Generator(format!(
                    "HTTP {} error: {}",
                    status, api_message
                )));
            }

            if let Some(error) = response_json.get("error") {
                let error_message = error
                    .get("message")
                    .and_then(|value| value.as_str())
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| error.to_string());
                return Err(ItineraryError::Generator(format!("API error: {}", error_message)));
            }

            return Ok(response_json);
        }
    }
}

fn map_transport_error(err: reqwest::Error) -> ItineraryError {
    if err.is_timeout() {
        ItineraryError::Timeout(err.to_string())
    } else {
        ItineraryError::Generator(format!("HTTP request failed: {err}"))
    }
}

pub(crate) fn build_chat_url(base_url: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    if trimmed.ends_with("/chat/completions") {
        trimmed.to_string()
    } else {
        format!("{}/chat/completions", trimmed)
    }
}

/// Text of the first choice of a chat completion response
pub(crate) fn first_message_content(response: &Value) -> Option<&str> {
    response
        .get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
}

#[derive(Clone, Debug)]
pub struct ChatCompletionRequest {
    model: String,
    messages: Vec<Value>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

impl ChatCompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Value>) -> Self {
        Self {
            model: model.into(),
            messages,
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn into_value(self) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": self.messages,
        });

        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }

        if let Some(temperature) = self.temperature {
            body["temperature"] = json!(temperature);
        }

        body
    }
}
