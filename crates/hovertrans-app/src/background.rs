use std::sync::Arc;

use hovertrans_translator::{TranslateError, Translator};
use kanal::{AsyncReceiver, AsyncSender};
use tokio::sync::oneshot;

use crate::orchestrator::{SuggestionResult, TranslationResult};
use crate::state::AppState;

/// Messages to the privileged request issuer
#[derive(Debug)]
pub enum BackgroundRequest {
    Translate {
        text: String,
        source_lang: Option<String>,
        target_lang: String,
        reply: oneshot::Sender<TranslationResult>,
    },
    ErrorSuggestion {
        error_message: String,
        reply: oneshot::Sender<SuggestionResult>,
    },
}

/// DOM-side handle for sending requests to the worker
#[derive(Clone)]
pub struct RequestBridge {
    tx: AsyncSender<BackgroundRequest>,
}

impl RequestBridge {
    pub fn new(tx: AsyncSender<BackgroundRequest>) -> Self {
        Self { tx }
    }

    pub async fn translate(&self, text: &str, source_lang: Option<&str>, target_lang: &str) -> TranslationResult {
        let (reply, rx) = oneshot::channel();
        let request = BackgroundRequest::Translate {
            text: text.to_string(),
            source_lang: source_lang.map(str::to_string),
            target_lang: target_lang.to_string(),
            reply,
        };
        self.round_trip(request, rx).await
    }

    pub async fn error_suggestion(&self, error_message: &str) -> SuggestionResult {
        let (reply, rx) = oneshot::channel();
        let request = BackgroundRequest::ErrorSuggestion {
            error_message: error_message.to_string(),
            reply,
        };
        self.round_trip(request, rx).await
    }

    async fn round_trip(
        &self,
        request: BackgroundRequest,
        rx: oneshot::Receiver<Result<String, TranslateError>>,
    ) -> Result<String, TranslateError> {
        if self.tx.send(request).await.is_err() {
            return Err(TranslateError::WorkerUnavailable);
        }
        rx.await.unwrap_or(Err(TranslateError::WorkerUnavailable))
    }
}

/// Serves requests until every bridge is dropped. Each request runs in its own
/// task so concurrent requests overlap.
pub async fn request_worker(
    state: Arc<AppState>,
    rx: AsyncReceiver<BackgroundRequest>,
    translator: Arc<dyn Translator>,
) -> anyhow::Result<()> {
    tracing::info!("Request worker started ({})", translator.metadata().name);

    while let Ok(request) = rx.recv().await {
        let state = state.clone();
        let translator = translator.clone();
        tokio::spawn(async move {
            handle_request(state, translator.as_ref(), request).await;
        });
    }

    tracing::info!("Request worker stopping");
    Ok(())
}

async fn handle_request(state: Arc<AppState>, translator: &dyn Translator, request: BackgroundRequest) {
    // the store may have changed since the request was queued
    let api = state.config.read().await.api.clone();

    match request {
        BackgroundRequest::Translate {
            text,
            source_lang,
            target_lang,
            reply,
        } => {
            tracing::debug!("Translate request: {} chars", text.chars().count());
            let result = translator
                .translate(&api, &text, source_lang.as_deref(), &target_lang)
                .await
                .map(|t| t.text);
            if let Err(e) = &result {
                tracing::warn!("Translate request failed: {e}");
            }
            let _ = reply.send(result);
        }
        BackgroundRequest::ErrorSuggestion {
            error_message,
            reply,
        } => {
            tracing::debug!("Suggestion request: {} chars", error_message.chars().count());
            let result = translator.suggest(&api, &error_message).await;
            if let Err(e) = &result {
                tracing::warn!("Suggestion request failed: {e}");
            }
            let _ = reply.send(result);
        }
    }
}
