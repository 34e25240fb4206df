use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_url() -> String {
    "https://portal.insuremo.com/api/mo-re/ai-qa-service/aiqa/api/chat".to_string()
}

fn default_llm_code() -> String {
    "qwen-max".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_timeout_ms() -> u64 {
    10000
}

/// Remote chat endpoint connection settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    #[serde(default = "default_url")]
    pub url: String,
    /// Bearer token
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_llm_code")]
    pub llm_code: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_timeout_ms", rename = "timeout")]
    pub timeout_ms: u64,
}

impl ApiConfig {
    /// Endpoint and token are both required before any request is issued
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty() && !self.token.trim().is_empty()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            token: String::new(),
            llm_code: default_llm_code(),
            temperature: default_temperature(),
            timeout_ms: default_timeout_ms(),
        }
    }
}
