//! Error type shared by every part of the estimate engine.

use thiserror::Error;

/// Estimate engine errors.
#[derive(Debug, Error)]
pub enum EstimateError {
    /// No reference row matches the requested region/locality.
    #[error("location not found: region '{region}', locality '{locality}'")]
    LookupMiss { region: String, locality: String },

    /// The reference dataset could not be read (file or remote source).
    #[error("reference data unavailable: {0}")]
    DataSourceUnavailable(String),

    /// Two reference rows share a key and the duplicate policy rejects it.
    #[error("duplicate reference key: region '{region}', locality '{locality}'")]
    DuplicateKey { region: String, locality: String },

    /// The tier table cannot be priced against (empty, unordered, zero capacity).
    #[error("invalid tier configuration: {0}")]
    InvalidTierConfiguration(String),

    #[error("unknown package id {0}")]
    UnknownPackage(u32),

    #[error("unknown optional service id {0}")]
    UnknownService(u32),

    /// Config file unreadable or malformed.
    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, EstimateError>;
