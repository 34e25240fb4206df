use hovertrans_config::ApiConfig;

pub mod chat;
pub mod prompt;

pub use chat::ChatTranslator;

pub type LanguageCode = String;

/// Remote translation and remediation provider
#[async_trait::async_trait]
pub trait Translator: Send + Sync {
    /// Translate text from source to target language
    async fn translate(
        &self,
        api: &ApiConfig,
        text: &str,
        from: Option<&str>,
        to: &str,
    ) -> Result<Translation, TranslateError>;

    /// Advisory text for an error message
    async fn suggest(&self, api: &ApiConfig, error_message: &str) -> Result<String, TranslateError>;

    /// Provider metadata
    fn metadata(&self) -> ProviderMetadata;
}

#[derive(Debug, Clone)]
pub struct Translation {
    pub text: String,
    /// `None` when the source language could not be classified
    pub from: Option<LanguageCode>,
    pub to: LanguageCode,
    pub provider: String,
}

#[derive(Debug, Clone)]
pub struct ProviderMetadata {
    pub name: String,
    pub requires_api_key: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("API is not configured, set the endpoint and token in the settings")]
    MissingConfig,

    #[error("API request failed: {0}")]
    Http(String),

    #[error("API response is missing the `{0}` field")]
    MissingField(&'static str),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("request timed out after {0} ms")]
    Timeout(u64),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("request worker is unavailable")]
    WorkerUnavailable,
}
