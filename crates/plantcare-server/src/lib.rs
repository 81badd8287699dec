//! HTTP front for PlantCare.
//!
//! Mounts the JSON API under `/api`, serves stored uploads under
//! `/uploads`, and wires in CORS and request tracing.

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context as _;
use axum::{
  Router,
  http::{HeaderValue, Method, header},
};
use chrono::{TimeDelta, Utc};
use plantcare_api::{ApiConfig, AppState, api_router, upload::UPLOADS_URL_PREFIX};
use plantcare_core::{scan::Diagnoser, store::AccountStore};
use serde::Deserialize;
use tokio::task::JoinHandle;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `PLANTCARE_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                    String,
  pub port:                    u16,
  /// Origin allowed by CORS.
  pub frontend_url:            String,
  pub upload_dir:              PathBuf,
  pub otp_ttl_secs:            i64,
  /// How often expired OTPs are swept. `0` disables the sweeper.
  pub otp_sweep_secs:          u64,
  pub max_upload_bytes:        usize,
  pub analysis_delay_ms:       u64,
  pub signin_requires_account: bool,
}

impl Default for ServerConfig {
  fn default() -> Self {
    let api = ApiConfig::default();
    Self {
      host:                    "127.0.0.1".to_owned(),
      port:                    5000,
      frontend_url:            "http://localhost:3000".to_owned(),
      upload_dir:              api.upload_dir,
      otp_ttl_secs:            api.otp_ttl.num_seconds(),
      otp_sweep_secs:          60,
      max_upload_bytes:        api.max_upload_bytes,
      analysis_delay_ms:       1500,
      signin_requires_account: api.signin_requires_account,
    }
  }
}

impl ServerConfig {
  /// Derive the API settings, rejecting an OTP lifetime that is not a
  /// positive, representable number of seconds.
  pub fn api_config(&self) -> anyhow::Result<ApiConfig> {
    if self.otp_ttl_secs <= 0 {
      anyhow::bail!("otp_ttl_secs must be positive, got {}", self.otp_ttl_secs);
    }
    let otp_ttl = TimeDelta::try_seconds(self.otp_ttl_secs)
      .with_context(|| format!("otp_ttl_secs {} is out of range", self.otp_ttl_secs))?;

    Ok(ApiConfig {
      otp_ttl,
      max_upload_bytes: self.max_upload_bytes,
      upload_dir: self.upload_dir.clone(),
      signin_requires_account: self.signin_requires_account,
    })
  }

  pub fn analysis_delay(&self) -> Duration {
    Duration::from_millis(self.analysis_delay_ms)
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the complete application router.
pub fn app<S, D>(state: AppState<S, D>, config: &ServerConfig) -> anyhow::Result<Router>
where
  S: AccountStore + 'static,
  D: Diagnoser + 'static,
{
  let origin = HeaderValue::from_str(&config.frontend_url)
    .with_context(|| format!("invalid frontend_url {:?}", config.frontend_url))?;

  let cors = CorsLayer::new()
    .allow_origin(origin)
    .allow_methods([Method::GET, Method::POST])
    .allow_headers([header::CONTENT_TYPE])
    .allow_credentials(true);

  let uploads = ServeDir::new(&state.config.upload_dir);

  Ok(
    Router::new()
      .nest("/api", api_router(state))
      .nest_service(UPLOADS_URL_PREFIX, uploads)
      .layer(cors)
      .layer(TraceLayer::new_for_http()),
  )
}

// ─── OTP sweeper ──────────────────────────────────────────────────────────────

/// Periodically evict expired OTPs so abandoned codes do not accumulate.
pub fn spawn_otp_sweeper<S>(store: Arc<S>, every: Duration) -> JoinHandle<()>
where
  S: AccountStore + 'static,
{
  tokio::spawn(async move {
    let mut ticker = tokio::time::interval(every);
    loop {
      ticker.tick().await;
      match store.purge_expired_otps(Utc::now()).await {
        Ok(0) => {}
        Ok(n) => tracing::debug!(purged = n, "swept expired otps"),
        Err(e) => tracing::warn!(error = %e, "otp sweep failed"),
      }
    }
  })
}
