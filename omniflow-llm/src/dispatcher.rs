use std::fmt;

use omniflow_core::{OmniflowError, TextLlm};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::Instrument;

use crate::providers::chat_completions::ChatCompletionsStrategy;
use crate::providers::gemini::GeminiStrategy;
use crate::{Provider, ProviderRequest, ProviderStrategy};

pub const DEFAULT_REFERER: &str = "http://localhost";

/// Maps a non-success HTTP status onto the error taxonomy.
pub fn error_for_status(status: u16, body: String) -> OmniflowError {
    match status {
        401 => OmniflowError::Auth,
        402 | 429 => OmniflowError::QuotaExceeded { status },
        _ => OmniflowError::Provider { status, body },
    }
}

fn redact_query(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[derive(Default)]
pub struct ProviderDispatcherBuilder {
    provider: Provider,
    api_key: Option<SecretString>,
    shared_key: Option<SecretString>,
    model: Option<String>,
    base_url: Option<String>,
    referer: Option<String>,
    http: Option<Client>,
}

impl fmt::Debug for ProviderDispatcherBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted = |key: &Option<SecretString>| if key.is_some() { "<redacted>" } else { "<none>" };
        f.debug_struct("ProviderDispatcherBuilder")
            .field("provider", &self.provider)
            .field("api_key", &redacted(&self.api_key))
            .field("shared_key", &redacted(&self.shared_key))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("referer", &self.referer)
            .finish()
    }
}

impl ProviderDispatcherBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn provider(mut self, provider: Provider) -> Self {
        self.provider = provider;
        self
    }

    /// The caller's own key. Blank values count as absent.
    pub fn api_key(mut self, value: impl Into<String>) -> Self {
        self.api_key = non_empty(value.into()).map(SecretString::new);
        self
    }

    /// Built-in key used by the default provider when the caller has none.
    pub fn shared_key(mut self, value: impl Into<String>) -> Self {
        self.shared_key = non_empty(value.into()).map(SecretString::new);
        self
    }

    pub fn model(mut self, value: impl Into<String>) -> Self {
        self.model = non_empty(value.into());
        self
    }

    pub fn base_url(mut self, value: impl Into<String>) -> Self {
        self.base_url = non_empty(value.into());
        self
    }

    pub fn referer(mut self, value: impl Into<String>) -> Self {
        self.referer = non_empty(value.into());
        self
    }

    pub fn http_client(mut self, client: Client) -> Self {
        self.http = Some(client);
        self
    }

    /// Resolves the credential and the provider strategy. Fails with
    /// [`OmniflowError::MissingCredential`] when no usable key exists, so no
    /// request is ever sent without one.
    pub fn build(self) -> Result<ProviderDispatcher, OmniflowError> {
        let api_key = match (self.api_key, self.shared_key) {
            (Some(key), _) => key,
            (None, Some(shared)) if self.provider.allows_shared_key() => {
                tracing::debug!(provider = %self.provider, "using shared credential");
                shared
            }
            _ => {
                return Err(OmniflowError::MissingCredential {
                    provider: self.provider.to_string(),
                })
            }
        };

        let strategy: Box<dyn ProviderStrategy> = match self.provider {
            Provider::OpenRouter => {
                let referer = self.referer.unwrap_or_else(|| DEFAULT_REFERER.to_string());
                let mut strategy = ChatCompletionsStrategy::openrouter(referer);
                if let Some(base_url) = self.base_url {
                    strategy = strategy.with_base_url(base_url);
                }
                if let Some(model) = self.model {
                    strategy = strategy.with_model(model);
                }
                Box::new(strategy)
            }
            Provider::OpenAi => {
                let mut strategy = ChatCompletionsStrategy::openai();
                if let Some(base_url) = self.base_url {
                    strategy = strategy.with_base_url(base_url);
                }
                if let Some(model) = self.model {
                    strategy = strategy.with_model(model);
                }
                Box::new(strategy)
            }
            Provider::Gemini => {
                let mut strategy = GeminiStrategy::new();
                if let Some(base_url) = self.base_url {
                    strategy = strategy.with_base_url(base_url);
                }
                if let Some(model) = self.model {
                    strategy = strategy.with_model(model);
                }
                Box::new(strategy)
            }
        };

        Ok(ProviderDispatcher {
            strategy,
            api_key,
            http: self.http.unwrap_or_default(),
        })
    }
}

/// Sends a prompt to the selected provider and returns the reply text.
///
/// Each call is a single attempt: there is no retry and no timeout beyond
/// the HTTP client's own.
pub struct ProviderDispatcher {
    strategy: Box<dyn ProviderStrategy>,
    api_key: SecretString,
    http: Client,
}

impl fmt::Debug for ProviderDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderDispatcher")
            .field("provider", &self.strategy.provider())
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl ProviderDispatcher {
    pub fn builder() -> ProviderDispatcherBuilder {
        ProviderDispatcherBuilder::new()
    }

    /// Uses a custom strategy, e.g. a provider not built in.
    pub fn with_strategy(
        strategy: Box<dyn ProviderStrategy>,
        api_key: SecretString,
        http: Client,
    ) -> Self {
        Self {
            strategy,
            api_key,
            http,
        }
    }

    pub fn provider(&self) -> Provider {
        self.strategy.provider()
    }

    async fn send(&self, request: ProviderRequest) -> Result<String, OmniflowError> {
        tracing::debug!(url = %redact_query(&request.url), "posting prompt");

        let mut call = self.http.post(&request.url).json(&request.body);
        for (name, value) in &request.headers {
            call = call.header(name.as_str(), value.as_str());
        }

        let response = call
            .send()
            .await
            .map_err(|err| OmniflowError::Transport(err.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), body = %body, "provider returned an error");
            return Err(error_for_status(status.as_u16(), body));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|err| OmniflowError::Transport(err.without_url().to_string()))?;
        let text = self.strategy.extract_text(&body);
        if text.is_empty() {
            tracing::warn!("provider response carried no text payload");
        }
        Ok(text)
    }
}

#[async_trait::async_trait]
impl TextLlm for ProviderDispatcher {
    async fn complete(&self, prompt: &str) -> Result<String, OmniflowError> {
        let request = self
            .strategy
            .build_request(prompt, self.api_key.expose_secret())?;
        let span = tracing::info_span!(
            "llm_dispatch",
            provider = %self.strategy.provider(),
            prompt_chars = prompt.len(),
        );
        self.send(request).instrument(span).await
    }
}
