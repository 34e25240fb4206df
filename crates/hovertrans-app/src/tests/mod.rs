use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use hovertrans_config::{ApiConfig, Config};
use hovertrans_translator::{ProviderMetadata, TranslateError, Translation, Translator};
use hovertrans_types::{ElementSpec, HostCommand, HostEvent, NodeId, Size};
use kanal::{AsyncReceiver, AsyncSender};
use tokio_util::sync::CancellationToken;

use crate::background::{RequestBridge, request_worker};
use crate::events::SessionEvent;
use crate::session::{Session, session_loop};
use crate::state::AppState;


pub const HOST: &str = "thailifesit-sandbox-thailife-th.insuremo.com";
pub const TRACE: &str = "0123456789abcdef0123456789abcdef";

pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            url: "http://mock/chat".to_string(),
            token: "test-token".to_string(),
            ..ApiConfig::default()
        },
        ..Config::default()
    }
}

/// Body 1 with one child per scenario
pub fn page() -> HostEvent {
    let body = ElementSpec::new(1, "body")
        .child(ElementSpec::new(2, "span").text("Hello world"))
        .child(ElementSpec::new(3, "span").text("สวัสดีครับ"))
        .child(ElementSpec::new(4, "div").text("你好世界"))
        .child(ElementSpec::new(5, "p").text(&format!("Save failed, traceid={TRACE}")))
        .child(ElementSpec::new(6, "span").text(TRACE))
        .child(ElementSpec::new(7, "button").attr("title", "Submit form").text("S"))
        .child(ElementSpec::new(8, "select").text("Option"));

    HostEvent::Load {
        hostname: HOST.to_string(),
        viewport: Size::new(1024.0, 768.0),
        body,
    }
}

pub fn over(id: u64) -> HostEvent {
    HostEvent::PointerOver {
        target: NodeId(id),
        x: 100.0,
        y: 100.0,
    }
}

pub fn out(id: u64, related: Option<NodeId>) -> HostEvent {
    HostEvent::PointerOut {
        target: NodeId(id),
        related,
    }
}

/// Recording translator with scripted outcomes
pub struct MockTranslator {
    pub translations: AtomicUsize,
    pub suggestions: AtomicUsize,
    pub last_text: Mutex<Option<String>>,
    fail_translation: bool,
    fail_suggestion: bool,
    delay: Duration,
}

impl MockTranslator {
    pub fn new() -> Self {
        Self {
            translations: AtomicUsize::new(0),
            suggestions: AtomicUsize::new(0),
            last_text: Mutex::new(None),
            fail_translation: false,
            fail_suggestion: false,
            delay: Duration::ZERO,
        }
    }

    pub fn failing_translation(mut self) -> Self {
        self.fail_translation = true;
        self
    }

    pub fn failing_suggestion(mut self) -> Self {
        self.fail_suggestion = true;
        self
    }

    pub fn with_delay(mut self, ms: u64) -> Self {
        self.delay = Duration::from_millis(ms);
        self
    }

    pub fn translation_count(&self) -> usize {
        self.translations.load(Ordering::SeqCst)
    }

    pub fn suggestion_count(&self) -> usize {
        self.suggestions.load(Ordering::SeqCst)
    }

    pub fn last_text(&self) -> Option<String> {
        self.last_text.lock().unwrap().clone()
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(
        &self,
        _api: &ApiConfig,
        text: &str,
        from: Option<&str>,
        to: &str,
    ) -> Result<Translation, TranslateError> {
        self.translations.fetch_add(1, Ordering::SeqCst);
        *self.last_text.lock().unwrap() = Some(text.to_string());
        tokio::time::sleep(self.delay).await;

        if self.fail_translation {
            return Err(TranslateError::Http("500 Internal Server Error".to_string()));
        }
        Ok(Translation {
            text: format!("[{to}] {text}"),
            from: from.map(str::to_string),
            to: to.to_string(),
            provider: "mock".to_string(),
        })
    }

    async fn suggest(&self, _api: &ApiConfig, _error_message: &str) -> Result<String, TranslateError> {
        self.suggestions.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;

        if self.fail_suggestion {
            return Err(TranslateError::MissingField("data"));
        }
        Ok("Check the service logs".to_string())
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "mock".to_string(),
            requires_api_key: false,
        }
    }
}

/// Session running on its own task, fed and observed through channels.
/// Checks the single-tooltip invariant on every command it sees.
pub struct Harness {
    pub translator: Arc<MockTranslator>,
    pub state: Arc<AppState>,
    events: AsyncSender<SessionEvent>,
    commands: AsyncReceiver<HostCommand>,
    log: Vec<HostCommand>,
    live: HashSet<NodeId>,
    cancel: CancellationToken,
}

impl Harness {
    pub async fn start(config: Config, translator: MockTranslator) -> Self {
        let state = Arc::new(AppState::new(config.clone()));
        let translator = Arc::new(translator);
        let (bg_tx, bg_rx) = kanal::bounded_async(64);
        let (events, inbox) = kanal::unbounded_async();
        let (command_tx, commands) = kanal::unbounded_async();
        let cancel = CancellationToken::new();

        let worker_translator: Arc<dyn Translator> = translator.clone();
        tokio::spawn(request_worker(state.clone(), bg_rx, worker_translator));

        let session = Session::new(config, RequestBridge::new(bg_tx), events.clone());
        tokio::spawn(session_loop(session, inbox, command_tx, cancel.clone()));

        let mut harness = Self {
            translator,
            state,
            events,
            commands,
            log: Vec::new(),
            live: HashSet::new(),
            cancel,
        };
        harness.send(page()).await;
        harness
    }

    pub async fn send(&mut self, event: HostEvent) {
        self.deliver(SessionEvent::Host(event)).await;
    }

    pub async fn deliver(&mut self, event: SessionEvent) {
        self.events.send(event).await.unwrap();
        self.advance(1).await;
    }

    pub async fn advance(&mut self, ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        while let Ok(Some(command)) = self.commands.try_recv() {
            match &command {
                HostCommand::ShowTooltip { id, .. } => {
                    self.live.insert(*id);
                    assert!(self.live.len() <= 1, "two tooltips alive at once");
                }
                HostCommand::RemoveTooltip { id } => {
                    self.live.remove(id);
                }
                _ => {}
            }
            self.log.push(command);
        }
    }

    pub fn take(&mut self) -> Vec<HostCommand> {
        std::mem::take(&mut self.log)
    }

    pub fn live_tooltips(&self) -> usize {
        self.live.len()
    }

    pub fn tooltip_id(&self) -> Option<NodeId> {
        self.live.iter().next().copied()
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

pub fn shows(commands: &[HostCommand]) -> Vec<&HostCommand> {
    commands
        .iter()
        .filter(|c| matches!(c, HostCommand::ShowTooltip { .. }))
        .collect()
}

pub fn updates(commands: &[HostCommand]) -> Vec<(&str, bool)> {
    commands
        .iter()
        .filter_map(|c| match c {
            HostCommand::UpdateTooltip { html, error, .. } => Some((html.as_str(), *error)),
            _ => None,
        })
        .collect()
}

pub fn fades(commands: &[HostCommand]) -> usize {
    commands
        .iter()
        .filter(|c| matches!(c, HostCommand::FadeTooltip { .. }))
        .count()
}
