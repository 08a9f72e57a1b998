use std::collections::{BTreeSet, HashMap};
use std::sync::OnceLock;

use omniflow_core::OmniflowError;
use regex::Regex;
use serde_json::Value;

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{\{\s*(\w+)\s*\}\}").expect("placeholder pattern is valid"))
}

/// Text with `{{name}}` placeholders.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Names of all placeholders, sorted and deduplicated.
    pub fn placeholders(&self) -> BTreeSet<String> {
        placeholder_pattern()
            .captures_iter(&self.template)
            .map(|caps| caps[1].to_string())
            .collect()
    }

    /// Substitutes every placeholder. Strings are inserted verbatim, other
    /// values as JSON. A placeholder without a value is an error.
    pub fn render(&self, vars: &HashMap<String, Value>) -> Result<String, OmniflowError> {
        if let Some(missing) = self.placeholders().into_iter().find(|key| !vars.contains_key(key)) {
            return Err(OmniflowError::InvalidInput(format!(
                "prompt variable '{missing}' has no value"
            )));
        }

        let rendered = placeholder_pattern().replace_all(&self.template, |caps: &regex::Captures| {
            match &vars[&caps[1]] {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            }
        });
        Ok(rendered.into_owned())
    }
}
