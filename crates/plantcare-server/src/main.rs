//! plantcare server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) layered with
//! `PLANTCARE_*` environment variables, and serves the demo API over HTTP.
//! All accounts and codes live in memory and vanish on restart.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use plantcare_api::AppState;
use plantcare_core::scan::MockDiagnoser;
use plantcare_server::{ServerConfig, app, spawn_otp_sweeper};
use plantcare_store_memory::MemoryStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "PlantCare demo API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Override the configured listen port.
  #[arg(short, long)]
  port: Option<u16>,
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
    .add_source(config::Environment::with_prefix("PLANTCARE").try_parsing(true))
    .build()
    .context("failed to read config file")?;

  let mut server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;
  if let Some(port) = cli.port {
    server_cfg.port = port;
  }

  let api_cfg = server_cfg.api_config().context("invalid configuration")?;

  tokio::fs::create_dir_all(&server_cfg.upload_dir)
    .await
    .with_context(|| format!("failed to create {:?}", server_cfg.upload_dir))?;

  let store = Arc::new(MemoryStore::new());
  tracing::info!("running in demo mode: in-memory store, mock diagnoser, no SMS");

  if server_cfg.otp_sweep_secs > 0 {
    spawn_otp_sweeper(
      Arc::clone(&store),
      std::time::Duration::from_secs(server_cfg.otp_sweep_secs),
    );
  }

  // Build application state.
  let state = AppState {
    store,
    diagnoser: Arc::new(MockDiagnoser::new(server_cfg.analysis_delay())),
    config:    Arc::new(api_cfg),
  };

  let app = app(state, &server_cfg)?;
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}/api");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
