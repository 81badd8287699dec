//! Persisting uploaded images under server-chosen names.
//!
//! The client's file name only contributes its extension, and only when that
//! extension is short and alphanumeric. Everything else about the stored
//! name is a fresh UUID, so uploads can neither collide nor escape the
//! upload directory.

use std::path::Path;

use bytes::Bytes;
use plantcare_core::scan::ScanImage;
use uuid::Uuid;

const MAX_EXTENSION_LEN: usize = 8;

/// Public URL prefix under which the upload directory is served.
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

/// Pick a file extension for an upload.
///
/// Prefers the client-supplied name's extension, falls back to the MIME
/// subtype, then to `img`.
pub fn extension_for(file_name: Option<&str>, content_type: &str) -> String {
  let from_name = file_name
    .and_then(|n| Path::new(n).extension())
    .and_then(|e| e.to_str())
    .filter(|e| is_safe_extension(e));
  if let Some(ext) = from_name {
    return ext.to_ascii_lowercase();
  }

  let subtype = content_type
    .split_once('/')
    .map(|(_, sub)| sub.split(';').next().unwrap_or(sub).trim())
    .unwrap_or_default();
  match subtype {
    "jpeg" | "pjpeg" => "jpg".to_owned(),
    "svg+xml" => "svg".to_owned(),
    s if is_safe_extension(s) => s.to_ascii_lowercase(),
    _ => "img".to_owned(),
  }
}

fn is_safe_extension(ext: &str) -> bool {
  !ext.is_empty()
    && ext.len() <= MAX_EXTENSION_LEN
    && ext.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Public URL of a stored upload.
pub fn public_url(file_name: &str) -> String {
  format!("{UPLOADS_URL_PREFIX}/{file_name}")
}

/// Write `data` into `dir` (created if missing) under a fresh name.
pub async fn store_image(
  dir: &Path,
  original_name: Option<&str>,
  content_type: &str,
  data: Bytes,
) -> std::io::Result<ScanImage> {
  tokio::fs::create_dir_all(dir).await?;

  let file_name = format!(
    "{}.{}",
    Uuid::new_v4().simple(),
    extension_for(original_name, content_type)
  );
  let path = dir.join(&file_name);
  tokio::fs::write(&path, &data).await?;

  Ok(ScanImage {
    path,
    file_name,
    content_type: content_type.to_owned(),
    size: data.len(),
  })
}
