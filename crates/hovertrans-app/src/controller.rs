use std::sync::Arc;

use hovertrans_config::Config;
use hovertrans_translator::Translator;
use hovertrans_types::HostCommand;
use kanal::{AsyncReceiver, AsyncSender};
use tokio::io::{AsyncBufRead, AsyncWrite};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::background::{BackgroundRequest, RequestBridge, request_worker};
use crate::events::SessionEvent;
use crate::io::{read_host_events, write_host_commands};
use crate::session::{Session, session_loop};
use crate::state::AppState;

/// Centralized channel management
pub struct ChannelSet {
    pub session: (AsyncSender<SessionEvent>, AsyncReceiver<SessionEvent>),
    pub commands: (AsyncSender<HostCommand>, AsyncReceiver<HostCommand>),
    pub background: (AsyncSender<BackgroundRequest>, AsyncReceiver<BackgroundRequest>),
}

impl ChannelSet {
    pub fn new() -> Self {
        Self {
            session: kanal::bounded_async(256), // pointer bursts
            commands: kanal::bounded_async(256),
            background: kanal::bounded_async(64),
        }
    }
}

impl Default for ChannelSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Application controller for task spawning and lifecycle
pub struct AppController {
    channels: ChannelSet,
    state: Arc<AppState>,
    cancel_token: CancellationToken,
}

impl AppController {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            channels: ChannelSet::new(),
            state,
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn spawn_tasks<R, W>(
        &self,
        translator: Arc<dyn Translator>,
        reader: R,
        writer: W,
    ) -> JoinSet<anyhow::Result<()>>
    where
        R: AsyncBufRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let mut tasks = JoinSet::new();

        // Request worker
        tasks.spawn(request_worker(
            self.state.clone(),
            self.channels.background.1.clone(),
            translator,
        ));

        // Session
        let config = match self.state.config.try_read() {
            Ok(config) => config.clone(),
            Err(_) => {
                tracing::warn!("Config store busy at startup, session starts from defaults");
                Config::default()
            }
        };
        let session = Session::new(
            config,
            RequestBridge::new(self.channels.background.0.clone()),
            self.channels.session.0.clone(),
        );
        tasks.spawn(session_loop(
            session,
            self.channels.session.1.clone(),
            self.channels.commands.0.clone(),
            self.cancel_token.child_token(),
        ));

        // Host IO
        tasks.spawn(read_host_events(
            reader,
            self.state.clone(),
            self.channels.session.0.clone(),
            self.cancel_token.clone(),
        ));
        tasks.spawn(write_host_commands(
            writer,
            self.channels.commands.1.clone(),
            self.cancel_token.child_token(),
        ));

        tasks
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }

    pub fn is_shutdown(&self) -> bool {
        self.cancel_token.is_cancelled()
    }
}
