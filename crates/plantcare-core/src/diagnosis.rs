//! Diagnosis results and the fixed catalog served in demo mode.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Lower bound applied to a served confidence.
pub const MIN_CONFIDENCE: f64 = 0.5;
/// Upper bound applied to a served confidence.
pub const MAX_CONFIDENCE: f64 = 0.99;
/// Width of the symmetric jitter window around a catalog confidence.
pub const JITTER_SPAN: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
  None,
  Low,
  Medium,
  High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Disease {
  pub name:            String,
  pub scientific_name: Option<String>,
  /// In `0.0..=1.0`.
  pub confidence:      f64,
  pub description:     String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnosis {
  pub disease:         Disease,
  /// Ordered, most important first.
  pub recommendations: Vec<String>,
  pub severity:        Severity,
  pub is_healthy:      bool,
}

impl Diagnosis {
  /// Shift the confidence by `offset` and clamp it to
  /// `MIN_CONFIDENCE..=MAX_CONFIDENCE`.
  pub fn with_jitter(mut self, offset: f64) -> Self {
    self.disease.confidence =
      (self.disease.confidence + offset).clamp(MIN_CONFIDENCE, MAX_CONFIDENCE);
    self
  }
}

/// A uniform offset in `[-JITTER_SPAN / 2, JITTER_SPAN / 2)`.
pub fn confidence_jitter<R: Rng>(rng: &mut R) -> f64 {
  rng.random_range(-JITTER_SPAN / 2.0..JITTER_SPAN / 2.0)
}

fn entry(
  name: &str,
  scientific_name: Option<&str>,
  confidence: f64,
  description: &str,
  recommendations: &[&str],
  severity: Severity,
) -> Diagnosis {
  Diagnosis {
    disease: Disease {
      name: name.to_owned(),
      scientific_name: scientific_name.map(str::to_owned),
      confidence,
      description: description.to_owned(),
    },
    recommendations: recommendations.iter().map(|r| (*r).to_owned()).collect(),
    severity,
    is_healthy: severity == Severity::None,
  }
}

/// The five canned results served by the mock diagnoser.
pub fn catalog() -> Vec<Diagnosis> {
  vec![
    entry(
      "Tomato Late Blight",
      Some("Phytophthora infestans"),
      0.92,
      "A devastating disease that affects tomato plants, causing dark brown to \
       black lesions on leaves, stems, and fruit. The disease spreads rapidly \
       in cool, wet conditions.",
      &[
        "Remove and destroy infected plants immediately",
        "Apply copper-based fungicide to remaining plants",
        "Improve air circulation between plants",
        "Water at the base of plants to keep foliage dry",
        "Consider crop rotation next season",
      ],
      Severity::High,
    ),
    entry(
      "Powdery Mildew",
      Some("Erysiphales"),
      0.85,
      "A fungal disease that appears as white powdery spots on leaves and \
       stems. Common in warm, dry climates with high humidity at night.",
      &[
        "Remove affected leaves and dispose of properly",
        "Spray with neem oil or baking soda solution",
        "Ensure proper plant spacing for airflow",
        "Avoid overhead watering",
      ],
      Severity::Medium,
    ),
    entry(
      "Bacterial Leaf Spot",
      Some("Xanthomonas campestris"),
      0.78,
      "A bacterial infection causing small, dark, water-soaked spots on \
       leaves. Can spread rapidly in warm, humid conditions.",
      &[
        "Remove infected plant parts",
        "Apply copper-based bactericide",
        "Avoid working with plants when wet",
        "Improve drainage and reduce humidity",
      ],
      Severity::Medium,
    ),
    entry(
      "Early Blight",
      Some("Alternaria solani"),
      0.88,
      "A common fungal disease causing dark spots with concentric rings on \
       lower leaves first, then spreading upward.",
      &[
        "Remove and destroy infected leaves",
        "Apply fungicide containing chlorothalonil",
        "Mulch around plants to prevent soil splash",
        "Ensure proper plant spacing",
      ],
      Severity::Medium,
    ),
    entry(
      "Healthy Plant",
      None,
      0.95,
      "Your plant appears to be healthy! Continue with your current care \
       routine to maintain its health.",
      &[
        "Continue regular watering schedule",
        "Maintain current fertilization routine",
        "Monitor regularly for any changes",
        "Ensure adequate sunlight exposure",
      ],
      Severity::None,
    ),
  ]
}

#[cfg(test)]
mod tests {
  use rand::{SeedableRng, rngs::StdRng};

  use super::*;

  #[test]
  fn catalog_has_five_entries_one_healthy() {
    let all = catalog();
    assert_eq!(all.len(), 5);
    let healthy: Vec<_> = all.iter().filter(|d| d.is_healthy).collect();
    assert_eq!(healthy.len(), 1);
    assert_eq!(healthy[0].severity, Severity::None);
    assert!(healthy[0].disease.scientific_name.is_none());
  }

  #[test]
  fn jitter_stays_in_window() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..10_000 {
      let j = confidence_jitter(&mut rng);
      assert!((-JITTER_SPAN / 2.0..JITTER_SPAN / 2.0).contains(&j), "{j}");
    }
  }

  #[test]
  fn jitter_is_clamped() {
    let base = catalog().remove(4);
    assert_eq!(base.clone().with_jitter(0.5).disease.confidence, MAX_CONFIDENCE);
    assert_eq!(base.with_jitter(-0.9).disease.confidence, MIN_CONFIDENCE);
  }

  #[test]
  fn jitter_covers_both_sides_of_zero() {
    let mut rng = StdRng::seed_from_u64(11);
    let draws: Vec<f64> = (0..1_000).map(|_| confidence_jitter(&mut rng)).collect();
    assert!(draws.iter().any(|j| *j < -0.04));
    assert!(draws.iter().any(|j| *j > 0.04));
  }

  #[test]
  fn serialises_in_camel_case() {
    let json = serde_json::to_value(catalog().remove(4)).unwrap();
    assert_eq!(json["isHealthy"], true);
    assert_eq!(json["severity"], "none");
    assert!(json["disease"]["scientificName"].is_null());
    assert_eq!(json["recommendations"].as_array().unwrap().len(), 4);
  }
}
