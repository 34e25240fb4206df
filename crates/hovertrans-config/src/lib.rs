use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use self::api::ApiConfig;

pub mod api;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("at least one source language is required")]
    NoSourceLanguage,
}

fn default_enabled() -> bool {
    true
}

fn default_source_languages() -> Vec<String> {
    vec!["th".to_string(), "en".to_string()]
}

fn default_target_language() -> String {
    "zh".to_string()
}

fn default_show_original() -> bool {
    true
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_ignore_native_tooltips() -> bool {
    true
}

fn default_tracking_base_url() -> String {
    "http://localhost:3000".to_string()
}

/// Working configuration of the hover translator
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_source_languages")]
    pub source_languages: Vec<String>,
    #[serde(default = "default_target_language")]
    pub target_language: String,
    #[serde(default = "default_show_original")]
    pub show_original: bool,
    #[serde(default = "default_debounce_ms", rename = "debounceTime")]
    pub debounce_ms: u64,
    /// Hostname glob patterns, empty allows every domain
    #[serde(default)]
    pub domain_whitelist: Vec<String>,
    #[serde(default = "default_ignore_native_tooltips")]
    pub ignore_native_tooltips: bool,
    /// Base of the trace lookup tool deep links
    #[serde(default = "default_tracking_base_url")]
    pub tracking_base_url: String,
    #[serde(default, rename = "apiConfig")]
    pub api: ApiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            source_languages: default_source_languages(),
            target_language: default_target_language(),
            show_original: default_show_original(),
            debounce_ms: default_debounce_ms(),
            domain_whitelist: Vec::new(),
            ignore_native_tooltips: default_ignore_native_tooltips(),
            tracking_base_url: default_tracking_base_url(),
            api: ApiConfig::default(),
        }
    }
}

/// Partial record delivered by a store change notification
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPatch {
    pub enabled: Option<bool>,
    pub source_languages: Option<Vec<String>>,
    pub target_language: Option<String>,
    pub show_original: Option<bool>,
    #[serde(rename = "debounceTime")]
    pub debounce_ms: Option<u64>,
    pub domain_whitelist: Option<Vec<String>>,
    pub ignore_native_tooltips: Option<bool>,
    pub tracking_base_url: Option<String>,
    #[serde(rename = "apiConfig")]
    pub api: Option<ApiConfig>,
}

impl Config {
    /// Load the stored record at `path`, falling back to defaults, then apply
    /// environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            tracing::info!("Loading config from {}", path.display());
            let raw = fs::read_to_string(path)?;
            serde_json::from_str(&raw)?
        } else {
            tracing::warn!("Config {} not found, using defaults", path.display());
            Config::default()
        };

        dotenvy::dotenv().ok();
        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(url) = env::var("HOVERTRANS_API_URL") {
            self.api.url = url;
        }
        if let Ok(token) = env::var("HOVERTRANS_API_TOKEN") {
            self.api.token = token;
        }
        if let Ok(llm_code) = env::var("HOVERTRANS_LLM_CODE") {
            self.api.llm_code = llm_code;
        }
        if let Some(timeout_ms) = env::var("HOVERTRANS_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.api.timeout_ms = timeout_ms;
        }
    }

    /// Edit-time check, the core itself never enforces it
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source_languages.iter().all(|l| l.trim().is_empty()) {
            return Err(ConfigError::NoSourceLanguage);
        }
        Ok(())
    }

    /// Shallow override: every field present in `patch` replaces ours wholesale
    pub fn merge(&mut self, patch: ConfigPatch) {
        if let Some(enabled) = patch.enabled {
            self.enabled = enabled;
        }
        if let Some(source_languages) = patch.source_languages {
            self.source_languages = source_languages;
        }
        if let Some(target_language) = patch.target_language {
            self.target_language = target_language;
        }
        if let Some(show_original) = patch.show_original {
            self.show_original = show_original;
        }
        if let Some(debounce_ms) = patch.debounce_ms {
            self.debounce_ms = debounce_ms;
        }
        if let Some(domain_whitelist) = patch.domain_whitelist {
            self.domain_whitelist = domain_whitelist;
        }
        if let Some(ignore_native_tooltips) = patch.ignore_native_tooltips {
            self.ignore_native_tooltips = ignore_native_tooltips;
        }
        if let Some(tracking_base_url) = patch.tracking_base_url {
            self.tracking_base_url = tracking_base_url;
        }
        if let Some(api) = patch.api {
            self.api = api;
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn is_source_language(&self, lang: &str) -> bool {
        self.source_languages.iter().any(|l| l == lang)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_record_uses_extension_field_names() {
        let raw = r#"{
            "enabled": true,
            "sourceLanguages": ["ja"],
            "targetLanguage": "en",
            "debounceTime": 250,
            "domainWhitelist": ["*.example.com"],
            "apiConfig": { "url": "http://api", "token": "t", "timeout": 3000 }
        }"#;

        let config: Config = serde_json::from_str(raw).unwrap();
        assert_eq!(config.source_languages, vec!["ja"]);
        assert_eq!(config.target_language, "en");
        assert_eq!(config.debounce(), Duration::from_millis(250));
        assert_eq!(config.domain_whitelist, vec!["*.example.com"]);
        assert_eq!(config.api.timeout_ms, 3000);
        assert_eq!(config.api.llm_code, "qwen-max");
        assert!(config.show_original);
        assert!(config.api.is_configured());
    }

    #[test]
    fn merge_is_shallow() {
        let mut config = Config::default();
        config.api.token = "secret".to_string();

        config.merge(ConfigPatch {
            enabled: Some(false),
            api: Some(ApiConfig {
                url: "http://other".to_string(),
                ..ApiConfig::default()
            }),
            ..ConfigPatch::default()
        });

        assert!(!config.enabled);
        assert_eq!(config.api.url, "http://other");
        // whole api block replaced
        assert!(config.api.token.is_empty());
        assert_eq!(config.source_languages, vec!["th", "en"]);
    }

    #[test]
    fn patch_parses_partial_record() {
        let patch: ConfigPatch = serde_json::from_str(r#"{"showOriginal": false}"#).unwrap();
        assert_eq!(patch.show_original, Some(false));
        assert!(patch.api.is_none());
    }

    #[test]
    fn validate_requires_a_source_language() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.source_languages = vec![" ".to_string()];
        assert!(matches!(config.validate(), Err(ConfigError::NoSourceLanguage)));
    }

    #[test]
    fn unconfigured_token_is_reported() {
        assert!(!Config::default().api.is_configured());
    }
}
