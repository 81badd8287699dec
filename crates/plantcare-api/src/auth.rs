//! Handlers for `/auth` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/send-otp` | Body: `{"phone"}`; issues a code, delivery is only logged |
//! | `POST` | `/auth/signup` | Body: `{"name","phone","otp"}`; creates or replaces the account |
//! | `POST` | `/auth/signin` | Body: `{"phone","otp"}`; fetches the account, creating it unless disabled |

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use chrono::Utc;
use plantcare_core::{
  otp::{OtpRecord, OtpVerdict},
  phone::Phone,
  store::AccountStore,
  user::{DEFAULT_USER_NAME, User},
  wire::{Ack, AuthResponse, SendOtpRequest, SigninRequest, SignupRequest},
};
use tracing::info;

use crate::{AppState, error::ApiError};

/// Treat absent, empty and whitespace-only fields alike.
fn present(field: Option<String>) -> Option<String> {
  field.filter(|v| !v.trim().is_empty())
}

fn parse_phone(raw: &str) -> Result<Phone, ApiError> {
  Phone::parse(raw).map_err(|_| ApiError::bad_request("Invalid phone number format"))
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
  body
    .map(|Json(b)| b)
    .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

// ─── Send OTP ─────────────────────────────────────────────────────────────────

/// `POST /auth/send-otp`
pub async fn send_otp<S, D>(
  State(state): State<AppState<S, D>>,
  body: Result<Json<SendOtpRequest>, JsonRejection>,
) -> Result<Json<Ack>, ApiError>
where
  S: AccountStore,
{
  let body = json_body(body)?;
  let raw = present(body.phone)
    .ok_or_else(|| ApiError::bad_request("Phone number is required"))?;
  let phone = parse_phone(&raw)?;

  let record = OtpRecord::issue(&mut rand::rng(), Utc::now(), state.config.otp_ttl)
    .map_err(ApiError::internal("Failed to send OTP"))?;
  let code = record.code.clone();
  state
    .store
    .put_otp(phone.clone(), record)
    .await
    .map_err(ApiError::internal("Failed to send OTP"))?;

  // No SMS gateway: the log line is the delivery.
  info!(%phone, %code, "otp issued (demo mode, not delivered)");

  Ok(Json(Ack {
    success: true,
    message: "OTP sent successfully".to_owned(),
  }))
}

// ─── Verification ─────────────────────────────────────────────────────────────

/// Consume the pending code for `phone`, mapping every rejection to a 400.
async fn verify_otp<S>(
  store: &S,
  phone: &Phone,
  code: String,
  failure: &'static str,
) -> Result<(), ApiError>
where
  S: AccountStore,
{
  let verdict = store
    .consume_otp(phone.clone(), code, Utc::now())
    .await
    .map_err(ApiError::internal(failure))?;

  match verdict {
    OtpVerdict::Accepted => Ok(()),
    OtpVerdict::NotFound => Err(ApiError::bad_request(
      "OTP not found. Please request a new one.",
    )),
    OtpVerdict::Expired => Err(ApiError::bad_request(
      "OTP has expired. Please request a new one.",
    )),
    OtpVerdict::Mismatch => Err(ApiError::bad_request("Invalid OTP")),
  }
}

// ─── Signup ───────────────────────────────────────────────────────────────────

/// `POST /auth/signup`
pub async fn signup<S, D>(
  State(state): State<AppState<S, D>>,
  body: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError>
where
  S: AccountStore,
{
  const FAILURE: &str = "Registration failed";

  let body = json_body(body)?;
  let (Some(name), Some(raw_phone), Some(otp)) =
    (present(body.name), present(body.phone), present(body.otp))
  else {
    return Err(ApiError::bad_request("Name, phone, and OTP are required"));
  };
  let phone = parse_phone(&raw_phone)?;

  verify_otp(state.store.as_ref(), &phone, otp, FAILURE).await?;

  let user = User::new(&name, phone).map_err(ApiError::internal(FAILURE))?;
  let user = state
    .store
    .put_user(user)
    .await
    .map_err(ApiError::internal(FAILURE))?;

  info!(user_id = %user.id, phone = %user.phone, "user registered");

  Ok(Json(AuthResponse {
    success: true,
    message: "Registration successful".to_owned(),
    user:    user.profile(),
  }))
}

// ─── Signin ───────────────────────────────────────────────────────────────────

/// `POST /auth/signin`
pub async fn signin<S, D>(
  State(state): State<AppState<S, D>>,
  body: Result<Json<SigninRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError>
where
  S: AccountStore,
{
  const FAILURE: &str = "Login failed";

  let body = json_body(body)?;
  let (Some(raw_phone), Some(otp)) = (present(body.phone), present(body.otp)) else {
    return Err(ApiError::bad_request("Phone and OTP are required"));
  };
  let phone = parse_phone(&raw_phone)?;

  verify_otp(state.store.as_ref(), &phone, otp, FAILURE).await?;

  let user = if state.config.signin_requires_account {
    state
      .store
      .get_user(phone)
      .await
      .map_err(ApiError::internal(FAILURE))?
      .ok_or_else(|| {
        ApiError::bad_request("Account not found. Please sign up first.")
      })?
  } else {
    let (user, created) = state
      .store
      .get_or_create_user(phone, DEFAULT_USER_NAME.to_owned())
      .await
      .map_err(ApiError::internal(FAILURE))?;
    if created {
      info!(user_id = %user.id, phone = %user.phone, "user created on signin");
    }
    user
  };

  Ok(Json(AuthResponse {
    success: true,
    message: "Login successful".to_owned(),
    user:    user.profile(),
  }))
}
