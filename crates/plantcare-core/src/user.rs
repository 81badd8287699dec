//! User accounts, keyed by phone number.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, phone::Phone};

/// Name given to accounts created implicitly by a signin.
pub const DEFAULT_USER_NAME: &str = "Farmer";

/// A stored account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub id:         Uuid,
  pub name:       String,
  pub phone:      Phone,
  pub created_at: DateTime<Utc>,
}

impl User {
  /// Create a user with a fresh id. `name` is trimmed and must not be empty.
  pub fn new(name: &str, phone: Phone) -> Result<Self> {
    let name = name.trim();
    if name.is_empty() {
      return Err(Error::EmptyName);
    }
    Ok(Self {
      id: Uuid::new_v4(),
      name: name.to_owned(),
      phone,
      created_at: Utc::now(),
    })
  }

  pub fn profile(&self) -> UserProfile { UserProfile::from(self) }
}

/// The public projection of a [`User`] returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
  pub id:    Uuid,
  pub name:  String,
  pub phone: Phone,
}

impl From<&User> for UserProfile {
  fn from(user: &User) -> Self {
    Self {
      id:    user.id,
      name:  user.name.clone(),
      phone: user.phone.clone(),
    }
  }
}
