// src/ingest/error.rs
use std::time::Duration;

use thiserror::Error;

/// A single publisher could not be read. Recorded per source, never fatal to a run.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("malformed feed: {0}")]
    Malformed(String),

    #[error("feed body exceeds {0} bytes")]
    TooLarge(usize),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// A single feed entry that cannot become a `RawItem`. Skipped by the provider.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EntryError {
    #[error("entry has no title")]
    MissingTitle,

    #[error("entry has no link")]
    MissingLink,

    #[error("entry has no publish date")]
    MissingDate,

    #[error("unparseable publish date `{0}`")]
    BadDate(String),

    #[error("unreadable entry: {0}")]
    Unreadable(String),
}
