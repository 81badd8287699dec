//! Core types and trait definitions for PlantCare.
//!
//! This crate is deliberately free of HTTP and storage dependencies. The
//! store backends, the JSON API and the client all depend on it.

pub mod diagnosis;
pub mod error;
pub mod otp;
pub mod phone;
pub mod scan;
pub mod store;
pub mod user;
pub mod wire;

pub use error::{Error, Result};
