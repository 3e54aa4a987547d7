//! StudySwap server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), wires the
//! in-memory store behind the lifecycle engine, and serves the JSON + SSE
//! API over HTTP. A background task sweeps expired matches on a fixed
//! interval.

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context as _;
use chrono::Utc;
use clap::Parser;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use studyswap_api::{AppState, ServerConfig};
use studyswap_engine::{
  MailError, Mailer, MatchLifecycle, NotificationDispatcher,
  NotificationFanout,
};
use studyswap_store_memory::MemoryStore;

#[derive(Parser)]
#[command(author, version, about = "StudySwap exchange server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

/// Mail collaborator for deployments without SMTP: logs the hand-off and
/// reports success. Swap in a real implementation behind the same trait.
struct LogMailer;

impl Mailer for LogMailer {
  async fn send(
    &self,
    to: &str,
    subject_line: &str,
    _body: &str,
  ) -> Result<(), MailError> {
    tracing::info!(%to, %subject_line, "email handed off");
    Ok(())
  }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("STUDYSWAP"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Wire the engine.
  let store = Arc::new(MemoryStore::new());
  let fanout = Arc::new(NotificationFanout::with_capacity(
    server_cfg.channel_capacity,
  ));
  let dispatcher = Arc::new(NotificationDispatcher::new(
    Arc::clone(&store),
    Arc::clone(&fanout),
    Arc::new(LogMailer),
  ));
  let lifecycle =
    Arc::new(MatchLifecycle::new(Arc::clone(&store), dispatcher));

  // Periodic expiry sweep.
  let sweep_interval = Duration::from_secs(server_cfg.sweep_interval_secs);
  let sweeper = Arc::clone(&lifecycle);
  tokio::spawn(async move {
    let mut ticker = tokio::time::interval(sweep_interval);
    loop {
      ticker.tick().await;
      if let Err(e) = sweeper.sweep_expired(Utc::now()).await {
        tracing::warn!(error = %e, "expiry sweep failed");
      }
    }
  });

  let state = AppState {
    store,
    fanout,
    lifecycle,
    config: Arc::new(server_cfg.clone()),
  };

  let app = studyswap_api::router(state).layer(TraceLayer::new_for_http());
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;
  axum::serve(listener, app).await.context("server exited")?;

  Ok(())
}
