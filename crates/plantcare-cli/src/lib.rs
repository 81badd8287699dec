//! Client side of PlantCare: an HTTP client for the JSON API and the
//! transient session state a front end keeps between pages.

pub mod client;
pub mod session;
