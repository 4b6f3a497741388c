//! glance: screen-answer assistant
//!
//! Single-binary desktop utility that:
//! 1. Loads a credential pool and per-category models from the environment
//! 2. Waits for triggers (stdin lines stand in for the hotkey collaborator)
//! 3. Captures a frame, sends it to Gemini with key failover
//! 4. Presents the answer and can replay code solutions as keystrokes

mod config;
mod session;
mod text;
mod typing;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use capability::{EchoKeySink, FileFrameSource, LogStatusSink, StatusSink};
use gemini_client::HttpTransport;
use gemini_pool::{KeyPool, RotationClient};
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::session::{Session, Trigger};
use crate::typing::TypingEngine;

#[tokio::main]
async fn main() -> Result<()> {
    // CLI: simple --config flag parsing
    let args: Vec<String> = std::env::args().collect();
    let config_path = Config::resolve_path(cli_config_arg(&args));
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    let _log_guard = init_tracing(&config)?;
    info!(
        config = %config_path.display(),
        frame_path = %config.capture.frame_path.display(),
        typing_interval_ms = config.typing.interval_ms,
        "starting glance"
    );

    let pool = KeyPool::from_env();
    let have_keys = !pool.is_empty();
    if !have_keys {
        warn!("no credentials found, set GEMINI_API_KEY (and _2 to _5) in the environment");
    }

    let models = config::models_from_env();
    info!(
        classification = %models.classification,
        generation = %models.generation,
        "models configured"
    );

    let client = Arc::new(RotationClient::new(
        pool,
        Arc::new(HttpTransport::default()),
        models,
    ));

    // Startup warmup: find a working credential before the first trigger
    if have_keys {
        match client.ensure_active().await {
            Ok(()) => info!("credential verified at startup"),
            Err(e) => warn!(error = %e, "startup verification failed, will retry on first request"),
        }
    }

    let status: Arc<dyn StatusSink> = Arc::new(LogStatusSink);
    let typing = TypingEngine::new(
        Arc::new(EchoKeySink),
        status.clone(),
        Duration::from_millis(config.typing.interval_ms),
    );
    let frames = Arc::new(FileFrameSource::new(config.capture.frame_path.clone()));
    let session = Arc::new(Session::new(client, frames, status, typing));

    let (trigger_tx, mut trigger_rx) = mpsc::channel::<Trigger>(8);
    tokio::spawn(read_triggers(trigger_tx));

    info!("ready: answer | code | type | quit");

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("shutdown signal received");
                break;
            }
            trigger = trigger_rx.recv() => match trigger {
                Some(Trigger::Quit) => {
                    info!("quit requested");
                    break;
                }
                Some(trigger) => {
                    let session = session.clone();
                    tokio::spawn(async move { session.handle(trigger).await });
                }
                None => {
                    info!("trigger stream closed");
                    break;
                }
            }
        }
    }

    info!("shutdown complete");
    Ok(())
}

/// Extract the value of a `--config <path>` argument, if present.
fn cli_config_arg(args: &[String]) -> Option<&str> {
    args.iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
}

/// Forward trigger lines from stdin into the session channel.
async fn read_triggers(tx: mpsc::Sender<Trigger>) {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match Trigger::parse(line) {
                    Some(trigger) => {
                        if tx.send(trigger).await.is_err() {
                            break;
                        }
                    }
                    None => warn!(input = line, "unknown trigger"),
                }
            }
            Ok(None) => break,
            Err(e) => {
                error!(error = %e, "failed to read trigger input");
                break;
            }
        }
    }
}

/// Initialize tracing to stderr, plus the configured log file when set.
///
/// Returns the appender guard; dropping it flushes buffered log lines, so it
/// must live until the process exits.
fn init_tracing(
    config: &Config,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let filter = EnvFilter::try_from_env("LOG_LEVEL")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match &config.log.file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            let file_name = path
                .file_name()
                .context("log file path has no file name")?;
            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(guard)
}

/// Wait for SIGTERM or SIGINT for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
