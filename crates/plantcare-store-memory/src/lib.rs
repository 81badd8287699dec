//! In-memory backend for the PlantCare account store.
//!
//! Everything lives in process memory and is gone on restart.

mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::MemoryStore;

#[cfg(test)]
mod tests;
