use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use hovertrans_app::controller::AppController;
use hovertrans_app::state::AppState;
use hovertrans_config::Config;
use hovertrans_translator::{ChatTranslator, Translator};
use tokio::io::BufReader;
use tokio::signal;
use tracing_subscriber::EnvFilter;

/// Hover translation core, speaking JSON lines with its page host
#[derive(Parser)]
#[command(name = "hovertrans", version)]
struct Cli {
    /// Stored configuration record
    #[arg(long, default_value = "hovertrans.json")]
    config: PathBuf,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    // stdout carries the host protocol
    if atty::is(atty::Stream::Stderr) {
        builder.init();
    } else {
        builder.json().init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = Config::load(&cli.config)?;
    if let Err(e) = config.validate() {
        tracing::warn!("Config is incomplete: {e}");
    }
    if !config.api.is_configured() {
        tracing::warn!("API endpoint or token missing, translations will fail until configured");
    }

    let state = Arc::new(AppState::new(config));
    let controller = AppController::new(state);
    let translator: Arc<dyn Translator> = Arc::new(ChatTranslator::new());

    let mut tasks = controller.spawn_tasks(
        translator,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    );

    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                tracing::info!("Shutdown requested");
                controller.shutdown();
                break;
            }
            result = tasks.join_next() => match result {
                Some(Ok(Ok(()))) if controller.is_shutdown() => break,
                Some(Ok(Ok(()))) => tracing::warn!("task exited"),
                Some(Ok(Err(e))) => {
                    tracing::error!("task failed: {e}");
                    controller.shutdown();
                    break;
                }
                Some(Err(e)) => {
                    tracing::error!("task panicked: {e}");
                    controller.shutdown();
                    break;
                }
                None => break,
            },
        }
    }

    tasks.shutdown().await;
    Ok(())
}
