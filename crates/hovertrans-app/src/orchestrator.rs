use hovertrans_config::Config;
use hovertrans_core::language::classify;
use hovertrans_core::trace::{env_from_hostname, find_trace_id, is_trace_id, tracking_url};
use hovertrans_translator::TranslateError;

use crate::background::RequestBridge;

pub const LOADING_TEXT: &str = "Loading...";
pub const TRANSLATING_TEXT: &str = "Translating...";
pub const MISSING_CONFIG_TEXT: &str = "Please configure the API in the extension settings first";
pub const ERROR_FLOW_FAILED_TEXT: &str = "Failed to process the error message, please retry";

pub type TranslationResult = Result<String, TranslateError>;
pub type SuggestionResult = Result<String, TranslateError>;

/// Final tooltip content of a cycle
#[derive(Debug, Clone, PartialEq)]
pub enum TooltipContent {
    Text { content: String, error: bool },
    Link { content: String, url: String },
}

impl TooltipContent {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
            error: false,
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
            error: true,
        }
    }
}

/// What to do with a piece of hovered or selected text
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    /// Bare trace identifier, answered without a remote call
    TraceLink { trace_id: String, url: String },
    /// Translation and remediation suggestion, fetched together
    ErrorFlow {
        text: String,
        source_lang: Option<String>,
        tracking_url: Option<String>,
    },
    PlainFlow { text: String, source_lang: String },
}

impl Plan {
    pub fn loading_text(&self) -> &'static str {
        match self {
            Plan::TraceLink { .. } => LOADING_TEXT,
            _ => TRANSLATING_TEXT,
        }
    }
}

/// Settings a cycle runs with, captured when it starts
#[derive(Debug, Clone)]
pub struct CycleSettings {
    pub target_language: String,
    pub show_original: bool,
}

impl From<&Config> for CycleSettings {
    fn from(config: &Config) -> Self {
        Self {
            target_language: config.target_language.clone(),
            show_original: config.show_original,
        }
    }
}

/// Dispatch policy: trace id, then error-bearing element, then configured
/// source language. `None` means no tooltip at all.
pub fn plan(text: &str, is_error: bool, config: &Config, hostname: &str) -> Option<Plan> {
    let trimmed = text.trim();
    let env = env_from_hostname(hostname);

    if is_trace_id(trimmed) {
        return Some(Plan::TraceLink {
            trace_id: trimmed.to_string(),
            url: tracking_url(&config.tracking_base_url, trimmed, env),
        });
    }

    let source_lang = classify(text);

    if is_error {
        return Some(Plan::ErrorFlow {
            text: text.to_string(),
            source_lang: source_lang.map(str::to_string),
            tracking_url: find_trace_id(text)
                .map(|id| tracking_url(&config.tracking_base_url, id, env)),
        });
    }

    source_lang
        .filter(|lang| config.is_source_language(lang))
        .map(|lang| Plan::PlainFlow {
            text: text.to_string(),
            source_lang: lang.to_string(),
        })
}

/// Run a plan to completion. Never fails: every error ends up as content.
pub async fn execute(plan: Plan, settings: CycleSettings, bridge: &RequestBridge) -> TooltipContent {
    match plan {
        Plan::TraceLink { trace_id, url } => trace_link_content(&trace_id, &url),
        Plan::PlainFlow { text, source_lang } => {
            let translation = bridge
                .translate(&text, Some(&source_lang), &settings.target_language)
                .await;
            compose_plain(&text, settings.show_original, translation)
        }
        Plan::ErrorFlow {
            text,
            source_lang,
            tracking_url,
        } => {
            let (translation, suggestion) = tokio::join!(
                bridge.translate(&text, source_lang.as_deref(), &settings.target_language),
                bridge.error_suggestion(&text),
            );
            compose_error(
                &text,
                settings.show_original,
                translation,
                suggestion,
                tracking_url.as_deref(),
            )
        }
    }
}

/// Content that is known without asking the request worker
pub fn immediate_content(plan: &Plan, api_configured: bool) -> Option<TooltipContent> {
    match plan {
        Plan::TraceLink { trace_id, url } => Some(trace_link_content(trace_id, url)),
        _ if !api_configured => Some(TooltipContent::error(MISSING_CONFIG_TEXT)),
        _ => None,
    }
}

pub fn trace_link_content(trace_id: &str, url: &str) -> TooltipContent {
    TooltipContent::Link {
        content: format!("🔍 Trace ID: {trace_id}\n\n🔗 Click to view trace details:\n{url}"),
        url: url.to_string(),
    }
}

pub fn compose_plain(text: &str, show_original: bool, translation: TranslationResult) -> TooltipContent {
    match translation {
        Ok(translated) if show_original => {
            TooltipContent::text(format!("{text}\n----------\n{translated}"))
        }
        Ok(translated) => TooltipContent::text(translated),
        Err(e) => {
            tracing::warn!("Translation failed: {e}");
            TooltipContent::error(format!("Translation failed: {e}"))
        }
    }
}

/// Each section is independent: a failed call only drops its own section
pub fn compose_error(
    text: &str,
    show_original: bool,
    translation: TranslationResult,
    suggestion: SuggestionResult,
    tracking_url: Option<&str>,
) -> TooltipContent {
    let mut content = String::new();

    if show_original {
        content.push_str(&format!("{text}\n\n"));
    }

    match translation {
        Ok(translated) => content.push_str(&format!("📝 Translation:\n{translated}\n\n")),
        Err(e) => tracing::warn!("Error-message translation failed: {e}"),
    }

    match suggestion {
        Ok(advice) => content.push_str(&format!("💡 AI suggestion:\n{advice}\n\n")),
        Err(e) => tracing::warn!("Error suggestion failed: {e}"),
    }

    match tracking_url {
        Some(url) => {
            content.push_str(&format!("🔗 Trace link:\n{url}"));
            TooltipContent::Link {
                content,
                url: url.to_string(),
            }
        }
        None if content.trim().is_empty() => TooltipContent::error(ERROR_FLOW_FAILED_TEXT),
        None => TooltipContent::text(content),
    }
}
