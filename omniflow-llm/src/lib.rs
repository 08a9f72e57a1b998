mod dispatcher;
mod provider;

pub mod providers;

pub use dispatcher::{error_for_status, ProviderDispatcher, ProviderDispatcherBuilder, DEFAULT_REFERER};
pub use provider::{Provider, ProviderRequest, ProviderStrategy};
pub use providers::chat_completions::ChatCompletionsStrategy;
pub use providers::gemini::GeminiStrategy;
