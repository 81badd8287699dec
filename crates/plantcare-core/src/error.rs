//! Error types for `plantcare-core`.

use chrono::TimeDelta;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid phone number format: {0:?}")]
  InvalidPhone(String),

  #[error("invalid OTP code format: {0:?}")]
  InvalidOtpCode(String),

  #[error("OTP lifetime must be positive and in range, got {0}")]
  InvalidOtpTtl(TimeDelta),

  #[error("name must not be empty")]
  EmptyName,

  #[error("diagnosis catalog is empty")]
  EmptyCatalog,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
