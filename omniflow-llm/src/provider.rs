use std::fmt;
use std::str::FromStr;

use omniflow_core::OmniflowError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Supported completion backends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    OpenRouter,
    OpenAi,
    Gemini,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::OpenRouter, Provider::OpenAi, Provider::Gemini];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenRouter => "openrouter",
            Provider::OpenAi => "openai",
            Provider::Gemini => "gemini",
        }
    }

    /// Only the default provider may fall back to a shared credential.
    pub fn allows_shared_key(&self) -> bool {
        matches!(self, Provider::OpenRouter)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = OmniflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        Self::ALL
            .into_iter()
            .find(|provider| provider.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| {
                OmniflowError::InvalidConfig(format!(
                    "unknown provider '{value}', expected one of openrouter, openai, gemini"
                ))
            })
    }
}

/// A fully prepared HTTP call to a provider.
#[derive(Clone, Debug, PartialEq)]
pub struct ProviderRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

/// Per-provider request shape and response envelope.
pub trait ProviderStrategy: Send + Sync {
    fn provider(&self) -> Provider;

    fn build_request(&self, prompt: &str, api_key: &str) -> Result<ProviderRequest, OmniflowError>;

    /// The reply text, or an empty string when the envelope has none.
    fn extract_text(&self, body: &Value) -> String;
}
