//! The `AccountStore` trait.
//!
//! Implemented by storage backends (e.g. `plantcare-store-memory`). The API
//! layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::{
  otp::{OtpRecord, OtpVerdict},
  phone::Phone,
  user::User,
};

/// Pending OTPs and user accounts, both keyed by phone.
///
/// Every method is a single atomic step against the backend. In particular
/// [`consume_otp`](AccountStore::consume_otp) performs lookup, expiry check
/// and eviction without another caller observing an intermediate state.
pub trait AccountStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── OTPs ──────────────────────────────────────────────────────────────

  /// Store `record` as the pending code for `phone`, replacing any other.
  fn put_otp(
    &self,
    phone: Phone,
    record: OtpRecord,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// The pending code for `phone`, expired or not.
  fn get_otp(
    &self,
    phone: Phone,
  ) -> impl Future<Output = Result<Option<OtpRecord>, Self::Error>> + Send + '_;

  /// Check `code` against the pending record for `phone` at time `now`.
  ///
  /// Accepted and expired records are evicted; a mismatch leaves the record
  /// in place.
  fn consume_otp(
    &self,
    phone: Phone,
    code: String,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<OtpVerdict, Self::Error>> + Send + '_;

  /// Evict every record that has expired at `now`. Returns how many went.
  fn purge_expired_otps(
    &self,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Insert `user`, replacing any account already registered on its phone.
  fn put_user(
    &self,
    user: User,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Retrieve the account for `phone`. Returns `None` if not found.
  fn get_user(
    &self,
    phone: Phone,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Return the account for `phone`, creating one named `default_name` if
  /// there is none. Returns the user and whether it was just created.
  fn get_or_create_user(
    &self,
    phone: Phone,
    default_name: String,
  ) -> impl Future<Output = Result<(User, bool), Self::Error>> + Send + '_;
}
