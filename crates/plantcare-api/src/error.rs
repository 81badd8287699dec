//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::multipart::MultipartError,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use plantcare_core::wire::ErrorBody;
use thiserror::Error;

/// An error returned by an API handler.
///
/// Client errors carry a message meant for the end user. Server errors carry
/// a generic message; their cause is logged and never sent to the client.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("payload too large: {0}")]
  PayloadTooLarge(String),

  #[error("{message}: {source}")]
  Internal {
    message: &'static str,
    #[source]
    source:  Box<dyn std::error::Error + Send + Sync>,
  },
}

impl ApiError {
  pub fn bad_request(message: impl Into<String>) -> Self {
    Self::BadRequest(message.into())
  }

  /// Adapter for `map_err`: wrap any error as a 500 reported as `message`.
  pub fn internal<E>(message: &'static str) -> impl FnOnce(E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    move |e| Self::Internal {
      message,
      source: Box::new(e),
    }
  }

  /// Classify a multipart failure, keeping the body-limit case distinct.
  pub fn from_multipart(err: MultipartError) -> Self {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
      Self::PayloadTooLarge("Image is too large".to_owned())
    } else {
      Self::BadRequest(err.body_text())
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, error) = match self {
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
      ApiError::PayloadTooLarge(m) => (StatusCode::PAYLOAD_TOO_LARGE, m),
      ApiError::Internal { message, source } => {
        tracing::error!(error = %source, "{message}");
        (StatusCode::INTERNAL_SERVER_ERROR, message.to_owned())
      }
    };
    (status, Json(ErrorBody { error })).into_response()
  }
}
