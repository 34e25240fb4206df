use std::sync::Arc;

use hovertrans_config::ConfigPatch;
use hovertrans_types::{HostCommand, HostEvent};
use kanal::{AsyncReceiver, AsyncSender};
use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

use crate::events::SessionEvent;
use crate::state::AppState;

/// One line of the host protocol
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Inbound {
    Config { config_changed: ConfigPatch },
    Host(HostEvent),
}

/// Read JSON-line host messages until EOF. Config changes land in the shared
/// store before the session hears about them.
pub async fn read_host_events<R>(
    reader: R,
    state: Arc<AppState>,
    inbox: AsyncSender<SessionEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();

    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            tracing::info!("Host closed its stream");
            cancel.cancel();
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let event = match serde_json::from_str::<Inbound>(&line) {
            Ok(Inbound::Host(event)) => SessionEvent::Host(event),
            Ok(Inbound::Config { config_changed }) => {
                state.config.write().await.merge(config_changed.clone());
                SessionEvent::ConfigChanged(config_changed)
            }
            Err(e) => {
                tracing::warn!("Skipping malformed host message: {e}");
                continue;
            }
        };
        inbox.send(event).await?;
    }

    Ok(())
}

/// Write each command as one JSON line
pub async fn write_host_commands<W>(
    mut writer: W,
    commands: AsyncReceiver<HostCommand>,
    cancel: CancellationToken,
) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    loop {
        let command = tokio::select! {
            _ = cancel.cancelled() => break,
            command = commands.recv() => command?,
        };

        let mut line = serde_json::to_string(&command)?;
        line.push('\n');
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
    }

    Ok(())
}
