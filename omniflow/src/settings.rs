use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use omniflow_core::OmniflowError;
use omniflow_llm::{Provider, ProviderDispatcher};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

pub const ENV_PROVIDER: &str = "OMNIFLOW_PROVIDER";
pub const ENV_API_KEY: &str = "OMNIFLOW_API_KEY";
pub const ENV_SHARED_KEY: &str = "OMNIFLOW_SHARED_OPENROUTER_KEY";
pub const ENV_MODEL: &str = "OMNIFLOW_MODEL";
pub const ENV_BASE_URL: &str = "OMNIFLOW_BASE_URL";
pub const ENV_REFERER: &str = "OMNIFLOW_REFERER";

fn secret(value: String) -> Option<SecretString> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| SecretString::new(trimmed.to_string()))
}

fn text(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Provider selection and credentials for one session.
///
/// Loaded once at startup and passed explicitly to every prediction.
#[derive(Default)]
pub struct Settings {
    pub provider: Provider,
    pub api_key: Option<SecretString>,
    pub shared_openrouter_key: Option<SecretString>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub referer: Option<String>,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted = |key: &Option<SecretString>| if key.is_some() { "<redacted>" } else { "<none>" };
        f.debug_struct("Settings")
            .field("provider", &self.provider)
            .field("api_key", &redacted(&self.api_key))
            .field("shared_openrouter_key", &redacted(&self.shared_openrouter_key))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("referer", &self.referer)
            .finish()
    }
}

impl Settings {
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            ..Self::default()
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = secret(key.into());
        self
    }

    pub fn with_shared_key(mut self, key: impl Into<String>) -> Self {
        self.shared_openrouter_key = secret(key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = text(model.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = text(base_url.into());
        self
    }

    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = text(referer.into());
        self
    }

    /// Overlays the user's saved provider and key.
    pub fn apply_stored(mut self, stored: &StoredSettings) -> Self {
        self.provider = stored.provider;
        if let Some(key) = stored.api_key.clone().and_then(secret) {
            self.api_key = Some(key);
        }
        self
    }

    /// Overlays values from the process environment.
    pub fn apply_env(self) -> Result<Self, OmniflowError> {
        self.apply_lookup(|name| std::env::var(name).ok())
    }

    /// Overlays values from an arbitrary variable source; unset or blank
    /// variables leave the current value alone.
    pub fn apply_lookup<F>(mut self, lookup: F) -> Result<Self, OmniflowError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(provider) = lookup(ENV_PROVIDER).and_then(text) {
            self.provider = provider.parse()?;
        }
        if let Some(key) = lookup(ENV_API_KEY).and_then(secret) {
            self.api_key = Some(key);
        }
        if let Some(key) = lookup(ENV_SHARED_KEY).and_then(secret) {
            self.shared_openrouter_key = Some(key);
        }
        if let Some(model) = lookup(ENV_MODEL).and_then(text) {
            self.model = Some(model);
        }
        if let Some(base_url) = lookup(ENV_BASE_URL).and_then(text) {
            self.base_url = Some(base_url);
        }
        if let Some(referer) = lookup(ENV_REFERER).and_then(text) {
            self.referer = Some(referer);
        }
        Ok(self)
    }

    pub fn from_env() -> Result<Self, OmniflowError> {
        Self::default().apply_env()
    }

    /// Builds the dispatcher for the selected provider, failing with
    /// [`OmniflowError::MissingCredential`] when no usable key exists.
    pub fn dispatcher(&self) -> Result<ProviderDispatcher, OmniflowError> {
        let mut builder = ProviderDispatcher::builder().provider(self.provider);
        if let Some(key) = &self.api_key {
            builder = builder.api_key(key.expose_secret().as_str());
        }
        if let Some(key) = &self.shared_openrouter_key {
            builder = builder.shared_key(key.expose_secret().as_str());
        }
        if let Some(model) = &self.model {
            builder = builder.model(model.as_str());
        }
        if let Some(base_url) = &self.base_url {
            builder = builder.base_url(base_url.as_str());
        }
        if let Some(referer) = &self.referer {
            builder = builder.referer(referer.as_str());
        }
        builder.build()
    }
}

/// The part of [`Settings`] the user saves explicitly.
#[derive(Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StoredSettings {
    #[serde(default)]
    pub provider: Provider,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl fmt::Debug for StoredSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredSettings")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// JSON file holding [`StoredSettings`].
#[derive(Clone, Debug)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/omniflow/settings.json`.
    pub fn default_location() -> Result<Self, OmniflowError> {
        let dir = dirs::config_dir().ok_or_else(|| {
            OmniflowError::Settings("no configuration directory on this platform".to_string())
        })?;
        Ok(Self::new(dir.join("omniflow").join("settings.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Saved settings, or the defaults when nothing was saved yet.
    pub fn load(&self) -> Result<StoredSettings, OmniflowError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(StoredSettings::default()),
            Err(err) => Err(OmniflowError::Settings(format!(
                "failed to read {}: {err}",
                self.path.display()
            ))),
        }
    }

    pub fn save(&self, settings: &StoredSettings) -> Result<(), OmniflowError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| {
                OmniflowError::Settings(format!("failed to create {}: {err}", parent.display()))
            })?;
        }
        let contents = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, contents).map_err(|err| {
            OmniflowError::Settings(format!("failed to write {}: {err}", self.path.display()))
        })?;
        restrict_permissions(&self.path)?;
        tracing::info!(path = %self.path.display(), provider = %settings.provider, "settings saved");
        Ok(())
    }

    pub fn clear(&self) -> Result<(), OmniflowError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(OmniflowError::Settings(format!(
                "failed to remove {}: {err}",
                self.path.display()
            ))),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<(), OmniflowError> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(|err| {
        OmniflowError::Settings(format!("failed to restrict {}: {err}", path.display()))
    })
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<(), OmniflowError> {
    Ok(())
}
