//! Async HTTP client wrapping the PlantCare JSON API.
//!
//! Failures are always surfaced to the caller. There is no offline fallback
//! that fabricates a successful response.

use std::{path::Path, time::Duration};

use anyhow::{Context, Result, anyhow, bail};
use plantcare_core::wire::{
  Ack, AnalyzeResponse, AuthResponse, ErrorBody, HealthResponse,
  ScanHistoryResponse, SendOtpRequest, SigninRequest, SignupRequest,
};
use reqwest::{
  Client, Response,
  multipart::{Form, Part},
};
use serde::{Serialize, de::DeserializeOwned};

/// Largest image the client will try to upload.
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// Connection settings for the PlantCare API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  /// Server root, without the `/api` suffix.
  pub base_url: String,
}

/// Async HTTP client for the PlantCare JSON API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

/// MIME type for an image path, judged by extension.
pub fn image_mime(path: &Path) -> Option<&'static str> {
  let ext = path.extension()?.to_str()?.to_ascii_lowercase();
  match ext.as_str() {
    "jpg" | "jpeg" => Some("image/jpeg"),
    "png" => Some("image/png"),
    "webp" => Some("image/webp"),
    "gif" => Some("image/gif"),
    "bmp" => Some("image/bmp"),
    "heic" => Some("image/heic"),
    _ => None,
  }
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  /// Absolute URL for an `/api`-relative path.
  pub fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.config.base_url.trim_end_matches('/'), path)
  }

  /// Absolute URL for a server-relative path such as an `imageUrl`.
  pub fn asset_url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  /// Turn a non-2xx response into an error carrying the server's message.
  async fn decode<R: DeserializeOwned>(resp: Response, what: &str) -> Result<R> {
    let status = resp.status();
    if status.is_success() {
      return resp
        .json()
        .await
        .with_context(|| format!("deserialising {what} response"));
    }
    match resp.json::<ErrorBody>().await {
      Ok(body) => Err(anyhow!(body.error)),
      Err(_) => Err(anyhow!("{what} → {status}")),
    }
  }

  async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R>
  where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
  {
    let resp = self
      .client
      .post(self.url(path))
      .json(body)
      .send()
      .await
      .with_context(|| format!("POST {path} failed"))?;
    Self::decode(resp, path).await
  }

  // ── Health ────────────────────────────────────────────────────────────────

  /// `GET /api/health`
  pub async fn health(&self) -> Result<HealthResponse> {
    let resp = self
      .client
      .get(self.url("/health"))
      .send()
      .await
      .context("GET /health failed")?;
    Self::decode(resp, "/health").await
  }

  // ── Auth ──────────────────────────────────────────────────────────────────

  /// `POST /api/auth/send-otp`
  pub async fn send_otp(&self, phone: &str) -> Result<Ack> {
    let body = SendOtpRequest {
      phone: Some(phone.to_owned()),
    };
    self.post_json("/auth/send-otp", &body).await
  }

  /// `POST /api/auth/signup`
  pub async fn signup(&self, name: &str, phone: &str, otp: &str) -> Result<AuthResponse> {
    let body = SignupRequest {
      name:  Some(name.to_owned()),
      phone: Some(phone.to_owned()),
      otp:   Some(otp.to_owned()),
    };
    self.post_json("/auth/signup", &body).await
  }

  /// `POST /api/auth/signin`
  pub async fn signin(&self, phone: &str, otp: &str) -> Result<AuthResponse> {
    let body = SigninRequest {
      phone: Some(phone.to_owned()),
      otp:   Some(otp.to_owned()),
    };
    self.post_json("/auth/signin", &body).await
  }

  // ── Scans ─────────────────────────────────────────────────────────────────

  /// `POST /api/scan/analyze` with the file at `path` as the `image` field.
  pub async fn analyze_image(&self, path: &Path) -> Result<AnalyzeResponse> {
    let Some(mime) = image_mime(path) else {
      bail!("Please select an image file");
    };
    let meta = tokio::fs::metadata(path)
      .await
      .with_context(|| format!("reading {}", path.display()))?;
    if meta.len() > MAX_IMAGE_BYTES {
      bail!("Image size should be less than 10MB");
    }
    let data = tokio::fs::read(path)
      .await
      .with_context(|| format!("reading {}", path.display()))?;

    let file_name = path
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_else(|| "image".to_owned());
    let part = Part::bytes(data)
      .file_name(file_name)
      .mime_str(mime)
      .context("building multipart body")?;
    let form = Form::new().part("image", part);

    let resp = self
      .client
      .post(self.url("/scan/analyze"))
      .multipart(form)
      .send()
      .await
      .context("POST /scan/analyze failed")?;
    Self::decode(resp, "/scan/analyze").await
  }

  /// `GET /api/scan/history`
  pub async fn scan_history(&self) -> Result<ScanHistoryResponse> {
    let resp = self
      .client
      .get(self.url("/scan/history"))
      .send()
      .await
      .context("GET /scan/history failed")?;
    Self::decode(resp, "/scan/history").await
  }
}
