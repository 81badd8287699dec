//! `plantcare` — terminal client for the PlantCare demo API.
//!
//! # Usage
//!
//! ```
//! plantcare --url http://localhost:5000            # interactive flow
//! plantcare send-otp 9876543210
//! plantcare signup --name Asha --phone 9876543210 --otp 123456
//! plantcare analyze leaf.jpg
//! ```

mod app;

use std::path::PathBuf;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, Subcommand};
use plantcare_cli::client::{ApiClient, ApiConfig};
use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "plantcare", about = "Terminal client for the PlantCare API")]
struct Args {
  /// Path to a TOML config file (url).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the PlantCare server (default: http://localhost:5000).
  #[arg(long, env = "PLANTCARE_URL")]
  url: Option<String>,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Walk through sign-in, scanning and results interactively (default).
  Run,
  /// Check that the server is up.
  Health,
  /// Request a one-time password for a phone number.
  SendOtp { phone: String },
  /// Create an account with a received one-time password.
  Signup {
    #[arg(long)]
    name:  String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    otp:   String,
  },
  /// Sign in with a received one-time password.
  Signin {
    #[arg(long)]
    phone: String,
    #[arg(long)]
    otp:   String,
  },
  /// Upload a plant photo and print the diagnosis.
  Analyze { image: PathBuf },
  /// List past scans.
  History,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();

  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| "http://localhost:5000".to_string()),
  };
  tracing::debug!(base_url = %api_config.base_url, "using server");

  let client = ApiClient::new(api_config)?;

  match args.command.unwrap_or(Command::Run) {
    Command::Run => {
      let stdin = tokio::io::BufReader::new(tokio::io::stdin());
      App::new(client, stdin).run().await
    }
    Command::Health => print_json(&client.health().await?),
    Command::SendOtp { phone } => print_json(&client.send_otp(&phone).await?),
    Command::Signup { name, phone, otp } => {
      print_json(&client.signup(&name, &phone, &otp).await?)
    }
    Command::Signin { phone, otp } => print_json(&client.signin(&phone, &otp).await?),
    Command::Analyze { image } => print_json(&client.analyze_image(&image).await?),
    Command::History => print_json(&client.scan_history().await?),
  }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
  let out = serde_json::to_string_pretty(value).context("serialising response")?;
  println!("{out}");
  Ok(())
}
