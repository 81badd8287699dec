//! One-time passwords issued to a phone number.
//!
//! A phone has at most one pending [`OtpRecord`]. Issuing a new one replaces
//! the old one. Verification is single-use: an accepted or expired record is
//! evicted, a mismatched one is kept until it expires or is replaced.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Number of digits in an OTP code.
pub const OTP_DIGITS: usize = 6;

/// Default lifetime of an issued code, in seconds.
pub const DEFAULT_OTP_TTL_SECS: i64 = 300;

const CODE_RANGE: std::ops::RangeInclusive<u32> = 100_000..=999_999;

/// A six-digit numeric code. Never starts with `0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OtpCode(String);

impl OtpCode {
  /// Draw a code from `100000..=999999`.
  pub fn generate<R: Rng>(rng: &mut R) -> Self {
    Self(rng.random_range(CODE_RANGE).to_string())
  }

  pub fn parse(raw: &str) -> Result<Self> {
    if raw.len() == OTP_DIGITS && raw.bytes().all(|b| b.is_ascii_digit()) {
      Ok(Self(raw.to_owned()))
    } else {
      Err(Error::InvalidOtpCode(raw.to_owned()))
    }
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl TryFrom<String> for OtpCode {
  type Error = Error;

  fn try_from(value: String) -> Result<Self> { Self::parse(&value) }
}

impl From<OtpCode> for String {
  fn from(code: OtpCode) -> Self { code.0 }
}

impl fmt::Display for OtpCode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// A pending code and the instant after which it is no longer accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpRecord {
  pub code:       OtpCode,
  pub expires_at: DateTime<Utc>,
}

impl OtpRecord {
  /// Generate a fresh code valid for `ttl` from `now`.
  ///
  /// Fails with [`Error::InvalidOtpTtl`] unless `ttl` is positive and
  /// `now + ttl` is representable.
  pub fn issue<R: Rng>(
    rng: &mut R,
    now: DateTime<Utc>,
    ttl: TimeDelta,
  ) -> Result<Self> {
    if ttl <= TimeDelta::zero() {
      return Err(Error::InvalidOtpTtl(ttl));
    }
    let expires_at = now
      .checked_add_signed(ttl)
      .ok_or(Error::InvalidOtpTtl(ttl))?;
    Ok(Self {
      code: OtpCode::generate(rng),
      expires_at,
    })
  }

  /// A record is still valid at exactly `expires_at`.
  pub fn is_expired(&self, now: DateTime<Utc>) -> bool { now > self.expires_at }

  /// Judge a submitted code against this record. Expiry wins over a match.
  pub fn verdict(&self, submitted: &str, now: DateTime<Utc>) -> OtpVerdict {
    if self.is_expired(now) {
      OtpVerdict::Expired
    } else if self.code.as_str() == submitted {
      OtpVerdict::Accepted
    } else {
      OtpVerdict::Mismatch
    }
  }
}

/// Outcome of checking a submitted code against the pending record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpVerdict {
  Accepted,
  NotFound,
  Expired,
  Mismatch,
}

impl OtpVerdict {
  /// Whether the pending record must be evicted after this verdict.
  pub fn consumes(self) -> bool { matches!(self, Self::Accepted | Self::Expired) }
}
