//! Moving Estimate — distance and truck-price engine for moving quotes.
//!
//! - [`location`] resolves a (region code, locality) pair to coordinates.
//! - [`distance`] measures great-circle distance between coordinates.
//! - [`pricing`] turns a box count into a truck price over a tier table.
//! - [`estimate`] ties them together behind [`estimate::EstimateEngine`].

pub mod catalog;
pub mod config;
pub mod distance;
pub mod error;
pub mod estimate;
pub mod location;
pub mod pricing;

pub use error::{EstimateError, Result};
