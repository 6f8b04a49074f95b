//! Domain models for AgriBridge.
//!
//! These are the core types shared across all crates.

pub mod esg;
pub mod farmer;
pub mod identity;
pub mod order;
pub mod product;
pub mod tenant;
