//! Phone numbers — the key for both OTP and user records.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Number of decimal digits in an accepted phone number.
pub const PHONE_DIGITS: usize = 10;

/// A phone number made of exactly ten ASCII decimal digits.
///
/// No country codes, separators or surrounding whitespace are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Phone(String);

impl Phone {
  pub fn parse(raw: &str) -> Result<Self> {
    if raw.len() == PHONE_DIGITS && raw.bytes().all(|b| b.is_ascii_digit()) {
      Ok(Self(raw.to_owned()))
    } else {
      Err(Error::InvalidPhone(raw.to_owned()))
    }
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl FromStr for Phone {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> { Self::parse(s) }
}

impl TryFrom<String> for Phone {
  type Error = Error;

  fn try_from(value: String) -> Result<Self> { Self::parse(&value) }
}

impl From<Phone> for String {
  fn from(phone: Phone) -> Self { phone.0 }
}

impl fmt::Display for Phone {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}
