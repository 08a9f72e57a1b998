use crate::OmniflowError;

/// A single-shot text completion backend.
///
/// Implementations return the raw text of the model's reply. A reply without
/// any text is `Ok(String::new())`; only transport and provider failures are
/// errors.
#[async_trait::async_trait]
pub trait TextLlm: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, OmniflowError>;
}

#[async_trait::async_trait]
impl<T> TextLlm for std::sync::Arc<T>
where
    T: TextLlm + ?Sized,
{
    async fn complete(&self, prompt: &str) -> Result<String, OmniflowError> {
        (**self).complete(prompt).await
    }
}
