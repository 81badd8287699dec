//! Router-level tests against an in-memory store and an instant diagnoser.

use std::{sync::Arc, time::Duration};

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
};
use chrono::{TimeDelta, Utc};
use plantcare_core::{
  diagnosis::{MAX_CONFIDENCE, MIN_CONFIDENCE},
  otp::{OtpCode, OtpRecord},
  phone::Phone,
  scan::MockDiagnoser,
  store::AccountStore,
};
use plantcare_store_memory::MemoryStore;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt as _;

use crate::{ApiConfig, AppState, api_router};

const PHONE: &str = "9876543210";
const BOUNDARY: &str = "plantcare-test-boundary";

type State = AppState<MemoryStore, MockDiagnoser>;

fn make_state_with(tweak: impl FnOnce(&mut ApiConfig)) -> (State, TempDir) {
  let uploads = tempfile::tempdir().unwrap();
  let mut config = ApiConfig {
    upload_dir: uploads.path().to_path_buf(),
    ..ApiConfig::default()
  };
  tweak(&mut config);

  let state = AppState {
    store:     Arc::new(MemoryStore::new()),
    diagnoser: Arc::new(MockDiagnoser::new(Duration::ZERO)),
    config:    Arc::new(config),
  };
  (state, uploads)
}

fn make_state() -> (State, TempDir) { make_state_with(|_| {}) }

async fn read_json(resp: axum::response::Response) -> (StatusCode, Value) {
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
  (status, value)
}

async fn post_json(state: &State, uri: &str, body: Value) -> (StatusCode, Value) {
  let req = Request::builder()
    .method("POST")
    .uri(uri)
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from(body.to_string()))
    .unwrap();
  read_json(api_router(state.clone()).oneshot(req).await.unwrap()).await
}

async fn get(state: &State, uri: &str) -> (StatusCode, Value) {
  let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
  read_json(api_router(state.clone()).oneshot(req).await.unwrap()).await
}

/// Request a code over the API and read it back out of the store.
async fn send_and_read_code(state: &State, phone: &str) -> String {
  let (status, _) = post_json(state, "/auth/send-otp", json!({ "phone": phone })).await;
  assert_eq!(status, StatusCode::OK);
  state
    .store
    .get_otp(Phone::parse(phone).unwrap())
    .await
    .unwrap()
    .expect("pending otp")
    .code
    .to_string()
}

fn multipart(field: &str, file_name: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
  let mut body = format!(
    "--{BOUNDARY}\r\n\
     Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
     Content-Type: {content_type}\r\n\r\n"
  )
  .into_bytes();
  body.extend_from_slice(data);
  body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
  body
}

async fn post_multipart(state: &State, body: Vec<u8>) -> (StatusCode, Value) {
  let req = Request::builder()
    .method("POST")
    .uri("/scan/analyze")
    .header(
      header::CONTENT_TYPE,
      format!("multipart/form-data; boundary={BOUNDARY}"),
    )
    .body(Body::from(body))
    .unwrap();
  read_json(api_router(state.clone()).oneshot(req).await.unwrap()).await
}

// ── Health ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_reports_ok() {
  let (state, _dir) = make_state();
  let (status, body) = get(&state, "/health").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "ok");
}

// ── Send OTP ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn send_otp_rejects_malformed_phones() {
  let (state, _dir) = make_state();
  for phone in ["987654321", "98765432101", "98765-4321", "abcdefghij", " 987654321"] {
    let (status, body) = post_json(&state, "/auth/send-otp", json!({ "phone": phone })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "phone {phone:?}");
    assert_eq!(body["error"], "Invalid phone number format");
  }
  assert_eq!(state.store.pending_otps().unwrap(), 0);
}

#[tokio::test]
async fn send_otp_requires_phone() {
  let (state, _dir) = make_state();
  let (status, body) = post_json(&state, "/auth/send-otp", json!({})).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "Phone number is required");
}

#[tokio::test]
async fn send_otp_stores_a_six_digit_code() {
  let (state, _dir) = make_state();
  let (status, body) = post_json(&state, "/auth/send-otp", json!({ "phone": PHONE })).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["success"], true);

  let record = state
    .store
    .get_otp(Phone::parse(PHONE).unwrap())
    .await
    .unwrap()
    .unwrap();
  assert!(OtpCode::parse(record.code.as_str()).is_ok());
  let ttl = record.expires_at - Utc::now();
  assert!(ttl <= TimeDelta::seconds(300) && ttl > TimeDelta::seconds(290));
}

#[tokio::test]
async fn send_otp_with_unrepresentable_ttl_is_a_500() {
  let (state, _dir) = make_state_with(|c| c.otp_ttl = TimeDelta::MAX);
  let (status, body) = post_json(&state, "/auth/send-otp", json!({ "phone": PHONE })).await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert_eq!(body["error"], "Failed to send OTP");
  assert_eq!(state.store.pending_otps().unwrap(), 0);
}

#[tokio::test]
async fn malformed_json_is_a_json_400() {
  let (state, _dir) = make_state();
  let req = Request::builder()
    .method("POST")
    .uri("/auth/send-otp")
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from("{not json"))
    .unwrap();
  let (status, body) = read_json(api_router(state).oneshot(req).await.unwrap()).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string());
}

// ── Signup ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn signup_with_issued_code() {
  let (state, _dir) = make_state();
  let code = send_and_read_code(&state, PHONE).await;

  let (status, body) = post_json(
    &state,
    "/auth/signup",
    json!({ "name": "Asha", "phone": PHONE, "otp": code }),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["success"], true);
  assert_eq!(body["user"]["name"], "Asha");
  assert_eq!(body["user"]["phone"], PHONE);
  assert!(body["user"]["id"].is_string());
  assert_eq!(state.store.user_count().unwrap(), 1);
}

#[tokio::test]
async fn signup_requires_all_fields() {
  let (state, _dir) = make_state();
  for body in [
    json!({ "phone": PHONE, "otp": "123456" }),
    json!({ "name": "Asha", "otp": "123456" }),
    json!({ "name": "Asha", "phone": PHONE }),
    json!({ "name": "  ", "phone": PHONE, "otp": "123456" }),
  ] {
    let (status, resp) = post_json(&state, "/auth/signup", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["error"], "Name, phone, and OTP are required");
  }
}

#[tokio::test]
async fn verify_without_pending_code_is_not_found() {
  let (state, _dir) = make_state();
  let (status, body) =
    post_json(&state, "/auth/signin", json!({ "phone": PHONE, "otp": "123456" })).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "OTP not found. Please request a new one.");
}

#[tokio::test]
async fn code_is_single_use() {
  let (state, _dir) = make_state();
  let code = send_and_read_code(&state, PHONE).await;

  let (first, _) = post_json(
    &state,
    "/auth/signup",
    json!({ "name": "Asha", "phone": PHONE, "otp": code }),
  )
  .await;
  assert_eq!(first, StatusCode::OK);

  let (second, body) =
    post_json(&state, "/auth/signin", json!({ "phone": PHONE, "otp": code })).await;
  assert_eq!(second, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "OTP not found. Please request a new one.");
}

#[tokio::test]
async fn expired_code_is_rejected_and_evicted() {
  let (state, _dir) = make_state();
  let phone = Phone::parse(PHONE).unwrap();
  state
    .store
    .put_otp(phone.clone(), OtpRecord {
      code:       OtpCode::parse("123456").unwrap(),
      expires_at: Utc::now() - TimeDelta::seconds(1),
    })
    .await
    .unwrap();

  let (status, body) =
    post_json(&state, "/auth/signin", json!({ "phone": PHONE, "otp": "123456" })).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "OTP has expired. Please request a new one.");
  assert!(state.store.get_otp(phone).await.unwrap().is_none());
}

#[tokio::test]
async fn wrong_code_keeps_record_for_retry() {
  let (state, _dir) = make_state();
  let code = send_and_read_code(&state, PHONE).await;
  let wrong = if code == "111111" { "222222" } else { "111111" };

  let (status, body) =
    post_json(&state, "/auth/signin", json!({ "phone": PHONE, "otp": wrong })).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "Invalid OTP");

  let (status, _) =
    post_json(&state, "/auth/signin", json!({ "phone": PHONE, "otp": code })).await;
  assert_eq!(status, StatusCode::OK);
}

// ── Signin ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn signin_creates_then_returns_same_user() {
  let (state, _dir) = make_state();

  let code = send_and_read_code(&state, PHONE).await;
  let (status, first) =
    post_json(&state, "/auth/signin", json!({ "phone": PHONE, "otp": code })).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(first["user"]["name"], "Farmer");
  assert_eq!(first["message"], "Login successful");

  let code = send_and_read_code(&state, PHONE).await;
  let (status, second) =
    post_json(&state, "/auth/signin", json!({ "phone": PHONE, "otp": code })).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(first["user"]["id"], second["user"]["id"]);
  assert_eq!(state.store.user_count().unwrap(), 1);
}

#[tokio::test]
async fn signin_returns_registered_name() {
  let (state, _dir) = make_state();
  let code = send_and_read_code(&state, PHONE).await;
  let (_, signed_up) = post_json(
    &state,
    "/auth/signup",
    json!({ "name": "Asha", "phone": PHONE, "otp": code }),
  )
  .await;

  let code = send_and_read_code(&state, PHONE).await;
  let (_, signed_in) =
    post_json(&state, "/auth/signin", json!({ "phone": PHONE, "otp": code })).await;
  assert_eq!(signed_in["user"]["name"], "Asha");
  assert_eq!(signed_in["user"]["id"], signed_up["user"]["id"]);
}

#[tokio::test]
async fn signin_can_require_an_account() {
  let (state, _dir) = make_state_with(|c| c.signin_requires_account = true);
  let code = send_and_read_code(&state, PHONE).await;

  let (status, body) =
    post_json(&state, "/auth/signin", json!({ "phone": PHONE, "otp": code })).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "Account not found. Please sign up first.");
  assert_eq!(state.store.user_count().unwrap(), 0);
}

#[tokio::test]
async fn signin_requires_phone_and_code() {
  let (state, _dir) = make_state();
  let (status, body) = post_json(&state, "/auth/signin", json!({ "phone": PHONE })).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "Phone and OTP are required");
}

// ── Scans ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn analyze_returns_catalog_diagnosis() {
  let (state, dir) = make_state();
  let (status, body) =
    post_multipart(&state, multipart("image", "leaf.jpg", "image/jpeg", b"fake-jpeg")).await;
  assert_eq!(status, StatusCode::OK, "{body}");
  assert_eq!(body["success"], true);

  let url = body["imageUrl"].as_str().unwrap();
  let file_name = url.strip_prefix("/uploads/").expect("uploads url");
  assert!(file_name.ends_with(".jpg"));
  assert_eq!(std::fs::read(dir.path().join(file_name)).unwrap(), b"fake-jpeg");

  let confidence = body["disease"]["confidence"].as_f64().unwrap();
  assert!((MIN_CONFIDENCE..=MAX_CONFIDENCE).contains(&confidence));
  assert!(body["recommendations"].as_array().is_some_and(|r| !r.is_empty()));
  assert!(body["isHealthy"].is_boolean());
}

#[tokio::test]
async fn analyze_rejects_non_images() {
  let (state, _dir) = make_state();
  let (status, body) =
    post_multipart(&state, multipart("image", "notes.txt", "text/plain", b"hello")).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "Only image files are allowed");
}

#[tokio::test]
async fn analyze_without_image_field() {
  let (state, _dir) = make_state();
  let (status, body) =
    post_multipart(&state, multipart("photo", "leaf.jpg", "image/jpeg", b"x")).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "No image provided");

  let (status, body) = post_json(&state, "/scan/analyze", json!({})).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "No image provided");
}

#[tokio::test]
async fn analyze_enforces_size_ceiling() {
  let (state, _dir) = make_state_with(|c| c.max_upload_bytes = 16);
  let (status, _) =
    post_multipart(&state, multipart("image", "leaf.png", "image/png", &[0u8; 32])).await;
  assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn history_is_empty() {
  let (state, _dir) = make_state();
  let (status, body) = get(&state, "/scan/history").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["success"], true);
  assert_eq!(body["scans"], json!([]));
}
