// src/pipeline.rs
//! Aggregation pipeline: fetch → window filter → relevance → categories/priority →
//! follow-ups → dedupe → sort, wrapped into a `NewsFetchResult`.
//!
//! Sources are fetched concurrently, each under its own timeout. A failed or
//! timed-out source becomes a `SourceError`; it never aborts the run. Everything
//! after the fetch is a synchronous transform with no shared state.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing::{info, warn};

use crate::categorize::{classify_with, Priority, SopAssignment};
use crate::followup::plan_follow_ups;
use crate::ingest::config::SourcesConfig;
use crate::ingest::{window_start, within_window, FetchError, NewsSource, RawItem};
use crate::relevance::{is_domain_relevant, short_hash, Focus};

pub const MIN_LOOKBACK_DAYS: i64 = 7;
pub const MAX_LOOKBACK_DAYS: i64 = 365;

/// Bytes of the link digest kept in an item id.
const ID_BYTES: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedNewsItem {
    pub id: String,
    #[serde(rename = "company")]
    pub publisher: String,
    pub focus: Focus,
    pub relative_time: String,
    pub published_at: DateTime<Utc>,
    pub title: String,
    pub summary: String,
    pub link: String,
    pub priority: Priority,
    /// Display form of `priority` ("Critical Priority").
    pub priority_label: &'static str,
    pub sop_assignments: Vec<SopAssignment>,
    pub matched_signals: Vec<String>,
    pub follow_up_actions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceError {
    #[serde(rename = "company")]
    pub publisher: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsFetchResult {
    pub generated_at: DateTime<Utc>,
    pub lookback_days: u32,
    pub items: Vec<ProcessedNewsItem>,
    pub errors: Vec<SourceError>,
}

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("pipeline_runs_total", "Completed fetch-and-classify runs.");
        describe_counter!(
            "pipeline_source_errors_total",
            "Sources that failed or timed out."
        );
        describe_counter!(
            "pipeline_out_of_window_total",
            "Items dropped for falling outside the lookback window."
        );
        describe_counter!(
            "pipeline_irrelevant_total",
            "Items dropped by the relevance gate."
        );
        describe_counter!("pipeline_dedup_total", "Items dropped as duplicates.");
        describe_counter!("pipeline_items_total", "Items returned to callers.");
        describe_counter!(
            "ingest_malformed_entries_total",
            "Feed entries skipped as malformed."
        );
        describe_gauge!(
            "pipeline_last_run_ts",
            "Unix ts when the pipeline last ran."
        );
    });
}

/// Clamp a caller-supplied window to `[7, 365]` days.
pub fn clamp_lookback(requested: i64) -> u32 {
    requested.clamp(MIN_LOOKBACK_DAYS, MAX_LOOKBACK_DAYS) as u32
}

/// Link with scheme/host lowercased, fragment dropped and trailing `/` trimmed.
pub fn canonical_link(link: &str) -> String {
    let trimmed = link.trim();
    match url::Url::parse(trimmed) {
        Ok(mut u) => {
            u.set_fragment(None);
            u.as_str().trim_end_matches('/').to_string()
        }
        Err(_) => trimmed.trim_end_matches('/').to_string(),
    }
}

/// Stable item id: a pure function of the canonical link.
pub fn item_id(link: &str) -> String {
    short_hash(&canonical_link(link), ID_BYTES)
}

/// Human-readable age of `published_at` as seen at `now`.
pub fn relative_label(published_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    fn ago(n: i64, unit: &str) -> String {
        format!("{n} {unit}{} ago", if n == 1 { "" } else { "s" })
    }

    let secs = (now - published_at).num_seconds();
    if secs < 60 {
        return "just now".to_string();
    }
    let mins = secs / 60;
    if mins < 60 {
        return ago(mins, "minute");
    }
    let hours = mins / 60;
    if hours < 24 {
        return ago(hours, "hour");
    }
    let days = hours / 24;
    if days < 30 {
        ago(days, "day")
    } else if days < 365 {
        ago(days / 30, "month")
    } else {
        ago(days / 365, "year")
    }
}

fn build_item(raw: RawItem, now: DateTime<Utc>) -> Option<ProcessedNewsItem> {
    let text = raw.text();
    let relevance = is_domain_relevant(&text);
    let focus = relevance.focus?;
    let classification = classify_with(&relevance, &text);
    let follow_up_actions = plan_follow_ups(&classification.assignments);

    Some(ProcessedNewsItem {
        id: item_id(&raw.link),
        publisher: raw.publisher,
        focus,
        relative_time: relative_label(raw.published_at, now),
        published_at: raw.published_at,
        title: raw.title,
        summary: raw.summary,
        link: raw.link,
        priority: classification.priority,
        priority_label: classification.priority.label(),
        sop_assignments: classification.assignments,
        matched_signals: classification.matched_signals,
        follow_up_actions,
    })
}

/// Everything after the fetch: window, relevance, classification, dedupe, sort.
pub fn process_items(
    now: DateTime<Utc>,
    since: DateTime<Utc>,
    raw: Vec<RawItem>,
) -> Vec<ProcessedNewsItem> {
    let mut out_of_window = 0u64;
    let mut irrelevant = 0u64;
    let mut duplicates = 0u64;

    let mut seen: HashSet<String> = HashSet::new();
    let mut items = Vec::with_capacity(raw.len());
    for it in raw {
        if !within_window(it.published_at, since, now) {
            out_of_window += 1;
            continue;
        }
        let Some(item) = build_item(it, now) else {
            irrelevant += 1;
            continue;
        };
        if !seen.insert(item.id.clone()) {
            duplicates += 1;
            continue;
        }
        items.push(item);
    }

    items.sort_by(|a, b| {
        b.published_at
            .cmp(&a.published_at)
            .then_with(|| a.id.cmp(&b.id))
    });

    counter!("pipeline_out_of_window_total").increment(out_of_window);
    counter!("pipeline_irrelevant_total").increment(irrelevant);
    counter!("pipeline_dedup_total").increment(duplicates);
    items
}

/// Stateless entry point: holds the configured sources and the per-fetch timeout.
pub struct NewsPipeline {
    sources: Vec<Box<dyn NewsSource>>,
    fetch_timeout: Duration,
}

impl NewsPipeline {
    pub fn new(sources: Vec<Box<dyn NewsSource>>, fetch_timeout: Duration) -> Self {
        Self {
            sources,
            fetch_timeout,
        }
    }

    pub fn from_config(cfg: &SourcesConfig) -> anyhow::Result<Self> {
        Ok(Self::new(cfg.build_sources()?, cfg.fetch_timeout()))
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Run against the wall clock.
    pub async fn fetch_and_classify(&self, lookback_days: i64) -> NewsFetchResult {
        self.fetch_and_classify_at(Utc::now(), lookback_days).await
    }

    /// Run as if the current time were `now`.
    pub async fn fetch_and_classify_at(
        &self,
        now: DateTime<Utc>,
        lookback_days: i64,
    ) -> NewsFetchResult {
        ensure_metrics_described();

        let days = clamp_lookback(lookback_days);
        let since = window_start(now, days);
        let timeout = self.fetch_timeout;

        let fetches = self.sources.iter().map(|source| async move {
            let res = match tokio::time::timeout(timeout, source.fetch(since)).await {
                Ok(res) => res,
                Err(_) => Err(FetchError::Timeout(timeout)),
            };
            (source.name(), res)
        });

        let mut raw = Vec::new();
        let mut errors = Vec::new();
        for (name, res) in join_all(fetches).await {
            match res {
                Ok(mut v) => raw.append(&mut v),
                Err(e) => {
                    warn!(target: "pipeline", error = %e, provider = name, "source failed");
                    counter!("pipeline_source_errors_total").increment(1);
                    errors.push(SourceError {
                        publisher: name.to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        let fetched = raw.len();
        let items = process_items(now, since, raw);

        counter!("pipeline_runs_total").increment(1);
        counter!("pipeline_items_total").increment(items.len() as u64);
        gauge!("pipeline_last_run_ts").set(now.timestamp() as f64);

        info!(
            target: "pipeline",
            lookback_days = days,
            fetched,
            kept = items.len(),
            source_errors = errors.len(),
            "fetch and classify finished"
        );

        NewsFetchResult {
            generated_at: now,
            lookback_days: days,
            items,
            errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 30, 12, 0, 0).unwrap()
    }

    fn raw(publisher: &str, title: &str, link: &str, age_hours: i64) -> RawItem {
        RawItem {
            publisher: publisher.into(),
            title: title.into(),
            summary: String::new(),
            link: link.into(),
            published_at: now() - Duration::hours(age_hours),
        }
    }

    #[test]
    fn lookback_is_clamped() {
        assert_eq!(clamp_lookback(400), 365);
        assert_eq!(clamp_lookback(1), 7);
        assert_eq!(clamp_lookback(-5), 7);
        assert_eq!(clamp_lookback(60), 60);
    }

    #[test]
    fn id_ignores_fragment_host_case_and_trailing_slash() {
        let a = item_id("https://News.Example.test/press/123/");
        let b = item_id("https://news.example.test/press/123#top");
        assert_eq!(a, b);
        assert_ne!(a, item_id("https://news.example.test/press/124"));
    }

    #[test]
    fn relative_labels() {
        let n = now();
        assert_eq!(relative_label(n - Duration::seconds(20), n), "just now");
        assert_eq!(relative_label(n - Duration::minutes(1), n), "1 minute ago");
        assert_eq!(relative_label(n - Duration::hours(5), n), "5 hours ago");
        assert_eq!(relative_label(n - Duration::days(1), n), "1 day ago");
        assert_eq!(relative_label(n - Duration::days(75), n), "2 months ago");
        assert_eq!(relative_label(n - Duration::days(800), n), "2 years ago");
        assert_eq!(relative_label(n + Duration::minutes(5), n), "just now");
    }

    #[test]
    fn process_filters_dedupes_and_sorts() {
        let since = window_start(now(), 7);
        let items = process_items(
            now(),
            since,
            vec![
                raw("A", "Biosimilar approval", "https://x.test/1", 30),
                raw("B", "Biosimilar approval (syndicated)", "https://x.test/1/", 2),
                raw("A", "Quarterly earnings", "https://x.test/2", 1),
                raw("B", "Old biosimilar news", "https://x.test/3", 24 * 10),
                raw("B", "Denosumab launch", "https://x.test/4", 3),
            ],
        );

        let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Denosumab launch", "Biosimilar approval"]);
        assert_eq!(items[1].publisher, "A");
        assert_eq!(items[0].priority, Priority::Elevated);
        assert_eq!(items[0].focus, Focus::ReferenceMolecule);
        assert_eq!(items[1].priority, Priority::Critical);
        assert_eq!(items[1].relative_time, "1 day ago");
    }

    #[test]
    fn equal_timestamps_break_ties_by_id() {
        let since = window_start(now(), 7);
        let items = process_items(
            now(),
            since,
            vec![
                raw("A", "Biosimilar one", "https://x.test/a", 4),
                raw("A", "Biosimilar two", "https://x.test/b", 4),
            ],
        );
        assert_eq!(items.len(), 2);
        assert!(items[0].id < items[1].id);
    }

    #[test]
    fn wire_shape_uses_camel_case_and_company() {
        let since = window_start(now(), 7);
        let items = process_items(
            now(),
            since,
            vec![raw("Sandoz", "Biosimilar launch", "https://x.test/l", 1)],
        );
        let v = serde_json::to_value(&items[0]).unwrap();
        assert_eq!(v["company"], "Sandoz");
        assert_eq!(v["priority"], "elevated");
        assert_eq!(v["priorityLabel"], "Elevated Priority");
        assert_eq!(v["focus"], "biosimilar");
        assert_eq!(v["sopAssignments"][0]["category"]["id"], "commercial-launch");
        assert_eq!(v["sopAssignments"][0]["trigger"], "launch");
        assert!(v["followUpActions"].as_array().is_some_and(|a| !a.is_empty()));
        assert_eq!(v["relativeTime"], "1 hour ago");
    }
}
