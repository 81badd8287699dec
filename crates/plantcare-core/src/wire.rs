//! JSON bodies exchanged between the API and its clients.
//!
//! Request fields are optional so that a missing field can be reported with
//! a specific message instead of a generic deserialisation failure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{diagnosis::Diagnosis, user::UserProfile};

// ─── Requests ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SendOtpRequest {
  pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignupRequest {
  pub name:  Option<String>,
  pub phone: Option<String>,
  pub otp:   Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SigninRequest {
  pub phone: Option<String>,
  pub otp:   Option<String>,
}

// ─── Responses ───────────────────────────────────────────────────────────────

/// `{"success": true, "message": "..."}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ack {
  pub success: bool,
  pub message: String,
}

/// Returned by both signup and signin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
  pub success: bool,
  pub message: String,
  pub user:    UserProfile,
}

/// A diagnosis together with the public URL of the analysed image.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
  pub success:   bool,
  pub image_url: String,
  #[serde(flatten)]
  pub diagnosis: Diagnosis,
}

/// One past scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRecord {
  pub image_url:  String,
  pub result:     Diagnosis,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanHistoryResponse {
  pub success: bool,
  pub scans:   Vec<ScanRecord>,
  pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
  pub status:  String,
  pub message: String,
}

/// Body of every non-2xx API response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
  pub error: String,
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::diagnosis::catalog;

  #[test]
  fn analyze_response_flattens_diagnosis() {
    let resp = AnalyzeResponse {
      success:   true,
      image_url: "/uploads/a.jpg".to_owned(),
      diagnosis: catalog().remove(0),
    };
    let json = serde_json::to_value(&resp).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["imageUrl"], "/uploads/a.jpg");
    assert_eq!(json["disease"]["name"], "Tomato Late Blight");
    assert_eq!(json["severity"], "high");
    assert_eq!(json["isHealthy"], false);

    let back: AnalyzeResponse = serde_json::from_value(json).unwrap();
    assert_eq!(back.diagnosis, resp.diagnosis);
  }

  #[test]
  fn missing_request_fields_deserialise_as_none() {
    let req: SignupRequest = serde_json::from_str(r#"{"phone":"9876543210"}"#).unwrap();
    assert!(req.name.is_none());
    assert!(req.otp.is_none());
    assert_eq!(req.phone.as_deref(), Some("9876543210"));
  }
}
