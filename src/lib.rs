// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod categorize;
pub mod followup;
pub mod ingest;
pub mod metrics;
pub mod pipeline;
pub mod relevance;
pub mod taxonomy;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::categorize::{categorize_text, ClassificationResult, Priority, SopAssignment};
pub use crate::ingest::{FetchError, NewsSource, RawItem};
pub use crate::pipeline::{NewsFetchResult, NewsPipeline, ProcessedNewsItem, SourceError};
pub use crate::relevance::is_domain_relevant;
