//! Handlers for `/scan` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/scan/analyze` | Multipart field `image`; returns a diagnosis and the stored image URL |
//! | `GET`  | `/scan/history` | Always empty |

use axum::{
  Json,
  extract::{Multipart, State, multipart::MultipartRejection},
};
use plantcare_core::{
  scan::Diagnoser,
  wire::{AnalyzeResponse, ScanHistoryResponse},
};
use tracing::info;

use crate::{
  AppState,
  error::ApiError,
  upload::{public_url, store_image},
};

/// Name of the multipart field carrying the image.
pub const IMAGE_FIELD: &str = "image";

const FAILURE: &str = "Failed to analyze image";

// ─── Analyze ──────────────────────────────────────────────────────────────────

/// `POST /scan/analyze`
pub async fn analyze<S, D>(
  State(state): State<AppState<S, D>>,
  multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError>
where
  D: Diagnoser,
{
  let mut multipart =
    multipart.map_err(|_| ApiError::bad_request("No image provided"))?;

  let mut upload = None;
  while let Some(field) = multipart
    .next_field()
    .await
    .map_err(ApiError::from_multipart)?
  {
    if field.name() != Some(IMAGE_FIELD) {
      continue;
    }
    let content_type = field.content_type().unwrap_or_default().to_owned();
    if !content_type.starts_with("image/") {
      return Err(ApiError::bad_request("Only image files are allowed"));
    }
    let file_name = field.file_name().map(str::to_owned);
    let data = field.bytes().await.map_err(ApiError::from_multipart)?;
    upload = Some((file_name, content_type, data));
    break;
  }

  let (file_name, content_type, data) =
    upload.ok_or_else(|| ApiError::bad_request("No image provided"))?;
  if data.is_empty() {
    return Err(ApiError::bad_request("No image provided"));
  }
  if data.len() > state.config.max_upload_bytes {
    return Err(ApiError::PayloadTooLarge("Image is too large".to_owned()));
  }

  let image = store_image(
    &state.config.upload_dir,
    file_name.as_deref(),
    &content_type,
    data,
  )
  .await
  .map_err(ApiError::internal(FAILURE))?;

  info!(path = %image.path.display(), size = image.size, "analysing image");

  let diagnosis = state
    .diagnoser
    .diagnose(&image)
    .await
    .map_err(ApiError::internal(FAILURE))?;

  Ok(Json(AnalyzeResponse {
    success: true,
    image_url: public_url(&image.file_name),
    diagnosis,
  }))
}

// ─── History ──────────────────────────────────────────────────────────────────

/// `GET /scan/history`
pub async fn history() -> Json<ScanHistoryResponse> {
  Json(ScanHistoryResponse {
    success: true,
    scans:   Vec::new(),
    message: "Scan history feature coming soon".to_owned(),
  })
}
