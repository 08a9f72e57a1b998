//! Google Gemini `generateContent` provider.

use omniflow_core::OmniflowError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use super::join_url;
use crate::{Provider, ProviderRequest, ProviderStrategy};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const GEMINI_DEFAULT_MODEL: &str = "gemini-1.5-flash";

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize, Default)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize, Default)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize, Default)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize, Default)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

/// `contents` request authenticated with a `key` query parameter.
#[derive(Clone, Debug)]
pub struct GeminiStrategy {
    base_url: String,
    model: String,
}

impl Default for GeminiStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl GeminiStrategy {
    pub fn new() -> Self {
        Self {
            base_url: GEMINI_BASE_URL.to_string(),
            model: GEMINI_DEFAULT_MODEL.to_string(),
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

    fn model_name(&self) -> &str {
        let model = self.model.trim();
        model.strip_prefix("models/").unwrap_or(model)
    }
}

impl ProviderStrategy for GeminiStrategy {
    fn provider(&self) -> Provider {
        Provider::Gemini
    }

    fn build_request(&self, prompt: &str, api_key: &str) -> Result<ProviderRequest, OmniflowError> {
        let endpoint = join_url(
            &self.base_url,
            &format!("v1beta/models/{}:generateContent", self.model_name()),
        );
        let mut url = Url::parse(&endpoint)
            .map_err(|err| OmniflowError::InvalidConfig(format!("invalid Gemini URL: {err}")))?;
        url.query_pairs_mut().append_pair("key", api_key);

        let body = serde_json::to_value(GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        })?;

        Ok(ProviderRequest {
            url: url.into(),
            headers: Vec::new(),
            body,
        })
    }

    fn extract_text(&self, body: &Value) -> String {
        GenerateContentResponse::deserialize(body)
            .ok()
            .and_then(|response| response.candidates.into_iter().next())
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().next())
            .and_then(|part| part.text)
            .unwrap_or_default()
    }
}
