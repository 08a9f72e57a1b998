use thiserror::Error;

#[derive(Debug, Error)]
pub enum OmniflowError {
    #[error("API Key Invalid (401).")]
    Auth,
    #[error("API Limit Reached ({status}). Add your own API key in the settings to continue.")]
    QuotaExceeded { status: u16 },
    #[error("API Provider Error: {status}")]
    Provider { status: u16, body: String },
    #[error("Please enter a valid API Key for {provider} in the settings.")]
    MissingCredential { provider: String },
    #[error("Request to LLM provider failed: {0}")]
    Transport(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Could not locate {role}: \"{query}\". Try adding a city or zip code.")]
    LocationNotFound { role: String, query: String },
    #[error("Settings storage failed: {0}")]
    Settings(String),
    #[error("Serialization/deserialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl OmniflowError {
    /// Errors the user can resolve by entering or replacing an API key.
    pub fn is_user_fixable(&self) -> bool {
        matches!(
            self,
            OmniflowError::Auth
                | OmniflowError::QuotaExceeded { .. }
                | OmniflowError::MissingCredential { .. }
        )
    }

    /// HTTP status carried by provider failures, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            OmniflowError::Auth => Some(401),
            OmniflowError::QuotaExceeded { status } | OmniflowError::Provider { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}
