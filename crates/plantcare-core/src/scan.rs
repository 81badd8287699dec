//! The [`Diagnoser`] trait and the demo-mode [`MockDiagnoser`].
//!
//! A diagnoser turns an uploaded image into a [`Diagnosis`]. The only
//! implementation today ignores the pixels entirely and serves a random
//! catalog entry; a model-backed implementation slots in behind the same
//! trait.

use std::{future::Future, path::PathBuf, time::Duration};

use rand::seq::IndexedRandom;

use crate::{
  Error, Result,
  diagnosis::{Diagnosis, catalog, confidence_jitter},
};

/// An image that has been accepted and written to the upload directory.
#[derive(Debug, Clone)]
pub struct ScanImage {
  /// Where the image was stored on disk.
  pub path:         PathBuf,
  /// Server-assigned file name, also the last segment of its public URL.
  pub file_name:    String,
  pub content_type: String,
  pub size:         usize,
}

/// Abstraction over a plant-disease classifier.
pub trait Diagnoser: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Diagnose a stored image.
  fn diagnose<'a>(
    &'a self,
    image: &'a ScanImage,
  ) -> impl Future<Output = Result<Diagnosis, Self::Error>> + Send + 'a;
}

/// Serves a random catalog entry after an artificial delay.
///
/// The image is never read. Confidence is jittered on a copy, so the catalog
/// itself never drifts across requests.
#[derive(Debug, Clone)]
pub struct MockDiagnoser {
  catalog: Vec<Diagnosis>,
  delay:   Duration,
}

impl MockDiagnoser {
  pub fn new(delay: Duration) -> Self {
    Self {
      catalog: catalog(),
      delay,
    }
  }

  pub fn with_catalog(catalog: Vec<Diagnosis>, delay: Duration) -> Self {
    Self { catalog, delay }
  }

  pub fn catalog(&self) -> &[Diagnosis] { &self.catalog }
}

impl Diagnoser for MockDiagnoser {
  type Error = Error;

  async fn diagnose(&self, _image: &ScanImage) -> Result<Diagnosis> {
    if self.catalog.is_empty() {
      return Err(Error::EmptyCatalog);
    }
    if !self.delay.is_zero() {
      tokio::time::sleep(self.delay).await;
    }

    let mut rng = rand::rng();
    let chosen = self
      .catalog
      .choose(&mut rng)
      .ok_or(Error::EmptyCatalog)?
      .clone();
    Ok(chosen.with_jitter(confidence_jitter(&mut rng)))
  }
}
