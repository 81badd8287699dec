//! Error type for `plantcare-store-memory`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] plantcare_core::Error),

  /// A thread panicked while holding one of the store's locks.
  #[error("{0} lock poisoned")]
  Poisoned(&'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
