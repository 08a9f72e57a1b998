//! OpenAI-style `chat/completions` providers (OpenAI and OpenRouter).

use omniflow_core::OmniflowError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::join_url;
use crate::{Provider, ProviderRequest, ProviderStrategy};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api";
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const OPENROUTER_DEFAULT_MODEL: &str = "google/gemini-2.0-flash-001";
pub const OPENROUTER_APP_TITLE: &str = "OmniFlow Traffic App";
const TEMPERATURE: f64 = 0.2;
const MAX_TOKENS: u32 = 2000;

#[derive(Serialize, Debug, Clone)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize, Debug, Clone)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize, Debug, Default)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize, Debug, Default)]
struct Choice {
    #[serde(default)]
    message: Option<ResponseMessage>,
}

#[derive(Deserialize, Debug, Default)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Bearer-authenticated `messages` request against `/v1/chat/completions`.
#[derive(Clone, Debug)]
pub struct ChatCompletionsStrategy {
    provider: Provider,
    base_url: String,
    model: String,
    extra_headers: Vec<(String, String)>,
}

impl ChatCompletionsStrategy {
    pub fn openai() -> Self {
        Self {
            provider: Provider::OpenAi,
            base_url: OPENAI_BASE_URL.to_string(),
            model: OPENAI_DEFAULT_MODEL.to_string(),
            extra_headers: Vec::new(),
        }
    }

    /// OpenRouter identifies the calling app through `HTTP-Referer` and
    /// `X-Title`.
    pub fn openrouter(referer: impl Into<String>) -> Self {
        Self {
            provider: Provider::OpenRouter,
            base_url: OPENROUTER_BASE_URL.to_string(),
            model: OPENROUTER_DEFAULT_MODEL.to_string(),
            extra_headers: vec![
                ("HTTP-Referer".to_string(), referer.into()),
                ("X-Title".to_string(), OPENROUTER_APP_TITLE.to_string()),
            ],
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

impl ProviderStrategy for ChatCompletionsStrategy {
    fn provider(&self) -> Provider {
        self.provider
    }

    fn build_request(&self, prompt: &str, api_key: &str) -> Result<ProviderRequest, OmniflowError> {
        let body = serde_json::to_value(ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        })?;

        let mut headers = vec![("Authorization".to_string(), format!("Bearer {api_key}"))];
        headers.extend(self.extra_headers.iter().cloned());

        Ok(ProviderRequest {
            url: join_url(&self.base_url, "v1/chat/completions"),
            headers,
            body,
        })
    }

    fn extract_text(&self, body: &Value) -> String {
        ChatCompletionResponse::deserialize(body)
            .ok()
            .and_then(|response| response.choices.into_iter().next())
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .unwrap_or_default()
    }
}
