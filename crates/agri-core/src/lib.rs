//! AgriBridge Core: domain models, error taxonomy, repository traits and
//! the marketplace service shared by every other crate.

pub mod error;
pub mod models;
pub mod repository;
pub mod service;

pub use error::{AgriError, AgriResult};
