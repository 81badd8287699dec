//! [`MemoryStore`] — the in-memory implementation of [`AccountStore`].

use std::{
  collections::HashMap,
  sync::{Arc, Mutex, MutexGuard},
};

use chrono::{DateTime, Utc};
use tracing::debug;

use plantcare_core::{
  otp::{OtpRecord, OtpVerdict},
  phone::Phone,
  store::AccountStore,
  user::User,
};

use crate::{Error, Result};

#[derive(Default)]
struct Inner {
  otps:  Mutex<HashMap<Phone, OtpRecord>>,
  users: Mutex<HashMap<Phone, User>>,
}

/// A PlantCare account store held entirely in memory.
///
/// Cloning is cheap — clones share the same maps. Locks are only held for a
/// single map operation and never across an `.await`.
#[derive(Clone, Default)]
pub struct MemoryStore {
  inner: Arc<Inner>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  fn otps(&self) -> Result<MutexGuard<'_, HashMap<Phone, OtpRecord>>> {
    self.inner.otps.lock().map_err(|_| Error::Poisoned("otp"))
  }

  fn users(&self) -> Result<MutexGuard<'_, HashMap<Phone, User>>> {
    self.inner.users.lock().map_err(|_| Error::Poisoned("user"))
  }

  /// Number of pending OTP records, expired ones included.
  pub fn pending_otps(&self) -> Result<usize> { Ok(self.otps()?.len()) }

  /// Number of registered users.
  pub fn user_count(&self) -> Result<usize> { Ok(self.users()?.len()) }
}

impl AccountStore for MemoryStore {
  type Error = Error;

  // ── OTPs ──────────────────────────────────────────────────────────────────

  async fn put_otp(&self, phone: Phone, record: OtpRecord) -> Result<()> {
    if self.otps()?.insert(phone.clone(), record).is_some() {
      debug!(%phone, "replaced pending otp");
    }
    Ok(())
  }

  async fn get_otp(&self, phone: Phone) -> Result<Option<OtpRecord>> {
    Ok(self.otps()?.get(&phone).cloned())
  }

  async fn consume_otp(
    &self,
    phone: Phone,
    code: String,
    now: DateTime<Utc>,
  ) -> Result<OtpVerdict> {
    let mut otps = self.otps()?;
    let verdict = match otps.get(&phone) {
      Some(record) => record.verdict(&code, now),
      None => OtpVerdict::NotFound,
    };
    if verdict.consumes() {
      otps.remove(&phone);
    }
    Ok(verdict)
  }

  async fn purge_expired_otps(&self, now: DateTime<Utc>) -> Result<usize> {
    let mut otps = self.otps()?;
    let before = otps.len();
    otps.retain(|_, record| !record.is_expired(now));
    Ok(before - otps.len())
  }

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn put_user(&self, user: User) -> Result<User> {
    self.users()?.insert(user.phone.clone(), user.clone());
    Ok(user)
  }

  async fn get_user(&self, phone: Phone) -> Result<Option<User>> {
    Ok(self.users()?.get(&phone).cloned())
  }

  async fn get_or_create_user(
    &self,
    phone: Phone,
    default_name: String,
  ) -> Result<(User, bool)> {
    let mut users = self.users()?;
    if let Some(user) = users.get(&phone) {
      return Ok((user.clone(), false));
    }
    let user = User::new(&default_name, phone.clone())?;
    users.insert(phone, user.clone());
    Ok((user, true))
  }
}
