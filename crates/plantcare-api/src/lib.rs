//! JSON REST API for PlantCare.
//!
//! Exposes an axum [`Router`] backed by any [`AccountStore`] and
//! [`Diagnoser`]. Static file serving, CORS and transport concerns are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", plantcare_api::api_router(state))
//! ```

pub mod auth;
pub mod error;
pub mod scan;
pub mod upload;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Json, Router,
  extract::DefaultBodyLimit,
  routing::{get, post},
};
use chrono::TimeDelta;
use plantcare_core::{
  otp::DEFAULT_OTP_TTL_SECS, scan::Diagnoser, store::AccountStore,
  wire::HealthResponse,
};

pub use error::ApiError;

/// Room left on top of the image ceiling for multipart framing.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Behaviour knobs for the API handlers.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  /// Lifetime of an issued OTP.
  pub otp_ttl:                 TimeDelta,
  /// Largest accepted image, in bytes.
  pub max_upload_bytes:        usize,
  /// Directory uploaded images are written to.
  pub upload_dir:              PathBuf,
  /// Reject signin for phones without an account instead of creating one.
  pub signin_requires_account: bool,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      otp_ttl:                 TimeDelta::seconds(DEFAULT_OTP_TTL_SECS),
      max_upload_bytes:        10 * 1024 * 1024,
      upload_dir:              PathBuf::from("uploads"),
      signin_requires_account: false,
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, D> {
  pub store:     Arc<S>,
  pub diagnoser: Arc<D>,
  pub config:    Arc<ApiConfig>,
}

impl<S, D> Clone for AppState<S, D> {
  fn clone(&self) -> Self {
    Self {
      store:     Arc::clone(&self.store),
      diagnoser: Arc::clone(&self.diagnoser),
      config:    Arc::clone(&self.config),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, D>(state: AppState<S, D>) -> Router<()>
where
  S: AccountStore + 'static,
  D: Diagnoser + 'static,
{
  let body_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD;

  Router::new()
    // Auth
    .route("/auth/send-otp", post(auth::send_otp::<S, D>))
    .route("/auth/signup", post(auth::signup::<S, D>))
    .route("/auth/signin", post(auth::signin::<S, D>))
    // Scans
    .route(
      "/scan/analyze",
      post(scan::analyze::<S, D>).layer(DefaultBodyLimit::max(body_limit)),
    )
    .route("/scan/history", get(scan::history))
    // Liveness
    .route("/health", get(health))
    .with_state(state)
}

/// `GET /health`
pub async fn health() -> Json<HealthResponse> {
  Json(HealthResponse {
    status:  "ok".to_owned(),
    message: "PlantCare API is running".to_owned(),
  })
}

#[cfg(test)]
mod tests;
