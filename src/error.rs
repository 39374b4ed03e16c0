// src/error.rs
use std::path::PathBuf;

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Request failed after the single bounded retry.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote answered with a non-success status (post-retry).
    #[error("{url} returned status {status}")]
    HttpStatus { status: u16, url: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Cache artifact exists but does not look like a raw signal table.
    /// The caller treats this as "no cache" and re-acquires.
    #[error("malformed cache table {path}: {reason}")]
    MalformedCache { path: PathBuf, reason: String },

    /// None of the four raw tables could be loaded; merging would produce
    /// a degenerate output, so the pipeline refuses instead.
    #[error("no raw signal tables found under {0}; run the obtain phase first")]
    NoRawData(PathBuf),

    #[error("profile error: {0}")]
    Profile(String),

    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
