//! Request shapes for each supported provider.

pub mod chat_completions;
pub mod gemini;

fn join_url(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}
