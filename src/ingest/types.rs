// src/ingest/types.rs
use chrono::{DateTime, Utc};

use crate::ingest::error::FetchError;

/// One entry as published by a source, before any classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawItem {
    pub publisher: String, // e.g., "FDA", "Sandoz"
    pub title: String,
    pub summary: String, // normalized text
    pub link: String,
    pub published_at: DateTime<Utc>,
}

impl RawItem {
    /// Title and summary joined the way the classifiers read them.
    pub fn text(&self) -> String {
        format!("{}. {}", self.title, self.summary)
    }
}

#[async_trait::async_trait]
pub trait NewsSource: Send + Sync {
    /// Items published at or after `since` (the start of the lookback window).
    async fn fetch(&self, since: DateTime<Utc>) -> Result<Vec<RawItem>, FetchError>;
    fn name(&self) -> &str;
}
