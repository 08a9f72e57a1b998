use std::collections::HashMap;

use omniflow::{
    OmniflowError, Provider, Settings, SettingsStore, StoredSettings, ENV_API_KEY, ENV_MODEL,
    ENV_PROVIDER, ENV_SHARED_KEY,
};
use secrecy::ExposeSecret;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();
    move |name| vars.get(name).cloned()
}

#[test]
fn store_round_trips_provider_and_key() {
    let dir = tempfile::tempdir().unwrap();
    let store = SettingsStore::new(dir.path().join("nested").join("settings.json"));
    let saved = StoredSettings {
        provider: Provider::Gemini,
        api_key: Some("gm-key".to_string()),
    };

    store.save(&saved).unwrap();

    assert!(store.path().exists());
    assert_eq!(store.load().unwrap(), saved);
    let raw = std::fs::read_to_string(store.path()).unwrap();
    assert!(raw.contains("\"provider\": \"gemini\""));
    assert!(raw.contains("\"apiKey\": \"gm-key\""));
}

#[test]
fn missing_file_loads_defaults_and_clear_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = SettingsStore::new(dir.path().join("settings.json"));

    assert_eq!(store.load().unwrap(), StoredSettings::default());
    store.clear().unwrap();

    store
        .save(&StoredSettings {
            provider: Provider::OpenAi,
            api_key: None,
        })
        .unwrap();
    store.clear().unwrap();
    assert!(!store.path().exists());
}

#[test]
fn corrupt_file_is_a_serde_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "{not json").unwrap();

    let err = SettingsStore::new(path).load().unwrap_err();
    assert!(matches!(err, OmniflowError::Serde(_)));
}

#[cfg(unix)]
#[test]
fn saved_file_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let store = SettingsStore::new(dir.path().join("settings.json"));
    store
        .save(&StoredSettings {
            provider: Provider::OpenRouter,
            api_key: Some("or-key".to_string()),
        })
        .unwrap();

    let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn environment_overrides_stored_values() {
    let stored = StoredSettings {
        provider: Provider::Gemini,
        api_key: Some("stored-key".to_string()),
    };

    let settings = Settings::default()
        .apply_stored(&stored)
        .apply_lookup(lookup(&[
            (ENV_PROVIDER, " OpenAI "),
            (ENV_API_KEY, "env-key"),
            (ENV_SHARED_KEY, "shared"),
            (ENV_MODEL, "gpt-4o"),
        ]))
        .unwrap();

    assert_eq!(settings.provider, Provider::OpenAi);
    assert_eq!(
        settings.api_key.as_ref().map(|key| key.expose_secret().clone()),
        Some("env-key".to_string())
    );
    assert_eq!(settings.model.as_deref(), Some("gpt-4o"));
    assert!(settings.shared_openrouter_key.is_some());
}

#[test]
fn blank_variables_leave_values_alone() {
    let settings = Settings::new(Provider::Gemini)
        .with_api_key("kept")
        .apply_lookup(lookup(&[(ENV_API_KEY, "   "), (ENV_PROVIDER, "")]))
        .unwrap();

    assert_eq!(settings.provider, Provider::Gemini);
    assert_eq!(
        settings.api_key.as_ref().map(|key| key.expose_secret().clone()),
        Some("kept".to_string())
    );
}

#[test]
fn unknown_provider_is_a_config_error() {
    let err = Settings::default()
        .apply_lookup(lookup(&[(ENV_PROVIDER, "anthropic")]))
        .unwrap_err();

    assert!(matches!(err, OmniflowError::InvalidConfig(_)));
}

#[test]
fn debug_output_hides_secrets() {
    let settings = Settings::default()
        .with_api_key("sk-very-secret")
        .with_shared_key("shared-very-secret");
    let stored = StoredSettings {
        provider: Provider::OpenAi,
        api_key: Some("sk-stored-secret".to_string()),
    };

    let rendered = format!("{settings:?} {stored:?}");

    assert!(!rendered.contains("very-secret"));
    assert!(!rendered.contains("stored-secret"));
    assert!(rendered.contains("<redacted>"));
}

#[test]
fn shared_key_only_serves_openrouter() {
    let openrouter = Settings::default().with_shared_key("shared");
    assert_eq!(openrouter.dispatcher().unwrap().provider(), Provider::OpenRouter);

    for provider in [Provider::OpenAi, Provider::Gemini] {
        let err = Settings::new(provider)
            .with_shared_key("shared")
            .dispatcher()
            .unwrap_err();
        assert!(matches!(err, OmniflowError::MissingCredential { .. }));
        assert_eq!(
            err.to_string(),
            format!("Please enter a valid API Key for {provider} in the settings.")
        );
    }
}
