use async_trait::async_trait;
use hovertrans_config::ApiConfig;
use serde::{Deserialize, Serialize};

use crate::prompt::{suggestion_prompt, translation_prompt};
use crate::{ProviderMetadata, TranslateError, Translation, Translator};

#[derive(Serialize)]
struct ChatRequest<'a> {
    query: String,
    messages: Vec<serde_json::Value>,
    temperature: f32,
    llm_code: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    data: Option<String>,
}

/// Client of the AI chat completion endpoint
#[derive(Clone, Default)]
pub struct ChatTranslator {
    client: reqwest::Client,
}

impl ChatTranslator {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Single non-streaming POST, returns the `data` field of the reply
    async fn ask(&self, api: &ApiConfig, query: String) -> Result<String, TranslateError> {
        if !api.is_configured() {
            return Err(TranslateError::MissingConfig);
        }
        let timeout_ms = api.timeout_ms;

        let request = ChatRequest {
            query,
            messages: Vec::new(),
            temperature: api.temperature,
            llm_code: &api.llm_code,
            stream: false,
        };

        let response = self
            .client
            .post(&api.url)
            .header("Accept", "application/json")
            .bearer_auth(&api.token)
            .json(&request)
            .timeout(api.timeout())
            .send()
            .await
            .map_err(|e| classify_error(e, timeout_ms))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslateError::Http(status.to_string()));
        }

        let body: ChatResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                TranslateError::Timeout(timeout_ms)
            } else {
                TranslateError::ApiError(format!("Failed to parse response: {}", e))
            }
        })?;

        body.data
            .filter(|d| !d.is_empty())
            .ok_or(TranslateError::MissingField("data"))
    }
}

fn classify_error(e: reqwest::Error, timeout_ms: u64) -> TranslateError {
    if e.is_timeout() {
        TranslateError::Timeout(timeout_ms)
    } else {
        TranslateError::NetworkError(e)
    }
}

#[async_trait]
impl Translator for ChatTranslator {
    async fn translate(
        &self,
        api: &ApiConfig,
        text: &str,
        from: Option<&str>,
        to: &str,
    ) -> Result<Translation, TranslateError> {
        tracing::debug!(
            "Translating {} chars {} -> {to}",
            text.chars().count(),
            from.unwrap_or("?")
        );

        let translated = self
            .ask(api, translation_prompt(text, from, to))
            .await?;

        Ok(Translation {
            text: translated,
            from: from.map(str::to_string),
            to: to.to_string(),
            provider: api.llm_code.clone(),
        })
    }

    async fn suggest(&self, api: &ApiConfig, error_message: &str) -> Result<String, TranslateError> {
        self.ask(api, suggestion_prompt(error_message)).await
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "ai-chat".to_string(),
            requires_api_key: true,
        }
    }
}
