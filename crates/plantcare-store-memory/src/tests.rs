//! Tests for `MemoryStore`.

use chrono::{TimeDelta, Utc};
use plantcare_core::{
  otp::{OtpCode, OtpRecord, OtpVerdict},
  phone::Phone,
  store::AccountStore,
  user::{DEFAULT_USER_NAME, User},
};

use crate::{Error, MemoryStore};

fn phone(raw: &str) -> Phone { Phone::parse(raw).expect("valid phone") }

fn record(code: &str, ttl_secs: i64) -> OtpRecord {
  OtpRecord {
    code:       OtpCode::parse(code).expect("valid code"),
    expires_at: Utc::now() + TimeDelta::seconds(ttl_secs),
  }
}

// ─── OTPs ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn consume_without_pending_record_is_not_found() {
  let s = MemoryStore::new();
  let verdict = s
    .consume_otp(phone("9876543210"), "123456".into(), Utc::now())
    .await
    .unwrap();
  assert_eq!(verdict, OtpVerdict::NotFound);
}

#[tokio::test]
async fn correct_code_is_accepted_exactly_once() {
  let s = MemoryStore::new();
  let p = phone("9876543210");
  s.put_otp(p.clone(), record("123456", 300)).await.unwrap();

  let first = s.consume_otp(p.clone(), "123456".into(), Utc::now()).await.unwrap();
  assert_eq!(first, OtpVerdict::Accepted);

  let second = s.consume_otp(p.clone(), "123456".into(), Utc::now()).await.unwrap();
  assert_eq!(second, OtpVerdict::NotFound);
  assert!(s.get_otp(p).await.unwrap().is_none());
}

#[tokio::test]
async fn mismatch_keeps_the_record() {
  let s = MemoryStore::new();
  let p = phone("9876543210");
  s.put_otp(p.clone(), record("123456", 300)).await.unwrap();

  let wrong = s.consume_otp(p.clone(), "654321".into(), Utc::now()).await.unwrap();
  assert_eq!(wrong, OtpVerdict::Mismatch);
  assert!(s.get_otp(p.clone()).await.unwrap().is_some());

  let right = s.consume_otp(p, "123456".into(), Utc::now()).await.unwrap();
  assert_eq!(right, OtpVerdict::Accepted);
}

#[tokio::test]
async fn expired_record_is_evicted() {
  let s = MemoryStore::new();
  let p = phone("9876543210");
  s.put_otp(p.clone(), record("123456", 300)).await.unwrap();

  let later = Utc::now() + TimeDelta::seconds(301);
  let verdict = s.consume_otp(p.clone(), "123456".into(), later).await.unwrap();
  assert_eq!(verdict, OtpVerdict::Expired);
  assert!(s.get_otp(p.clone()).await.unwrap().is_none());

  let again = s.consume_otp(p, "123456".into(), later).await.unwrap();
  assert_eq!(again, OtpVerdict::NotFound);
}

#[tokio::test]
async fn resend_overwrites_previous_code() {
  let s = MemoryStore::new();
  let p = phone("9876543210");
  s.put_otp(p.clone(), record("111111", 300)).await.unwrap();
  s.put_otp(p.clone(), record("222222", 300)).await.unwrap();
  assert_eq!(s.pending_otps().unwrap(), 1);

  let stale = s.consume_otp(p.clone(), "111111".into(), Utc::now()).await.unwrap();
  assert_eq!(stale, OtpVerdict::Mismatch);
  let fresh = s.consume_otp(p, "222222".into(), Utc::now()).await.unwrap();
  assert_eq!(fresh, OtpVerdict::Accepted);
}

#[tokio::test]
async fn codes_are_scoped_per_phone() {
  let s = MemoryStore::new();
  s.put_otp(phone("1111111111"), record("123456", 300)).await.unwrap();

  let other = s
    .consume_otp(phone("2222222222"), "123456".into(), Utc::now())
    .await
    .unwrap();
  assert_eq!(other, OtpVerdict::NotFound);
}

#[tokio::test]
async fn purge_removes_only_expired() {
  let s = MemoryStore::new();
  s.put_otp(phone("1111111111"), record("123456", -1)).await.unwrap();
  s.put_otp(phone("2222222222"), record("123456", 300)).await.unwrap();

  let purged = s.purge_expired_otps(Utc::now()).await.unwrap();
  assert_eq!(purged, 1);
  assert_eq!(s.pending_otps().unwrap(), 1);
  assert!(s.get_otp(phone("2222222222")).await.unwrap().is_some());
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn put_and_get_user() {
  let s = MemoryStore::new();
  let user = User::new("Asha", phone("9876543210")).unwrap();
  s.put_user(user.clone()).await.unwrap();

  let fetched = s.get_user(phone("9876543210")).await.unwrap();
  assert_eq!(fetched, Some(user));
  assert!(s.get_user(phone("0000000000")).await.unwrap().is_none());
}

#[tokio::test]
async fn put_user_replaces_existing_account() {
  let s = MemoryStore::new();
  let first = User::new("Asha", phone("9876543210")).unwrap();
  let second = User::new("Ravi", phone("9876543210")).unwrap();
  s.put_user(first).await.unwrap();
  s.put_user(second.clone()).await.unwrap();

  assert_eq!(s.user_count().unwrap(), 1);
  assert_eq!(s.get_user(phone("9876543210")).await.unwrap(), Some(second));
}

#[tokio::test]
async fn get_or_create_is_idempotent() {
  let s = MemoryStore::new();
  let p = phone("9876543210");

  let (created, was_new) = s
    .get_or_create_user(p.clone(), DEFAULT_USER_NAME.into())
    .await
    .unwrap();
  assert!(was_new);
  assert_eq!(created.name, DEFAULT_USER_NAME);

  let (fetched, was_new) = s
    .get_or_create_user(p, "Someone Else".into())
    .await
    .unwrap();
  assert!(!was_new);
  assert_eq!(fetched.id, created.id);
  assert_eq!(fetched.name, DEFAULT_USER_NAME);
}

#[tokio::test]
async fn get_or_create_rejects_blank_default_name() {
  let s = MemoryStore::new();
  let result = s.get_or_create_user(phone("9876543210"), "  ".into()).await;
  assert!(matches!(result, Err(Error::Core(_))));
  assert_eq!(s.user_count().unwrap(), 0);
}

#[tokio::test]
async fn clones_share_state() {
  let s = MemoryStore::new();
  let clone = s.clone();
  s.put_otp(phone("9876543210"), record("123456", 300)).await.unwrap();
  assert!(clone.get_otp(phone("9876543210")).await.unwrap().is_some());
}
