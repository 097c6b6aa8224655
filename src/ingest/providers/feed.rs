// src/ingest/providers/feed.rs
//! RSS 2.0 / Atom 1.0 publisher feed. Works over HTTP or from an in-memory fixture.
//!
//! Entries that cannot be turned into a `RawItem` (no title, no link, no usable date,
//! markup the entry shape does not allow) are skipped one by one; only a body that is
//! not a well-formed feed fails the fetch.

use std::borrow::Cow;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use once_cell::sync::OnceCell;
use quick_xml::de::from_str;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::{Captures, Regex};
use serde::Deserialize;
use time::{
    format_description::well_known::{Rfc2822, Rfc3339},
    OffsetDateTime,
};

use crate::ingest::error::{EntryError, FetchError};
use crate::ingest::normalize_text;
use crate::ingest::types::{NewsSource, RawItem};

/// Largest feed body read from a publisher (bytes).
pub const DEFAULT_MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Deserialize)]
struct RssItem {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    title: Option<AtomText>,
    #[serde(rename = "link", default)]
    link: Vec<AtomLink>,
    published: Option<String>,
    updated: Option<String>,
    summary: Option<AtomText>,
    content: Option<AtomText>,
}

#[derive(Debug, Deserialize)]
struct AtomText {
    #[serde(rename = "$text", default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: Option<String>,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FeedKind {
    Rss,
    Atom,
}

#[derive(Debug, Clone, Copy)]
enum DateFormat {
    Rfc2822,
    Rfc3339,
}

fn parse_date(ts: &str, fmt: DateFormat) -> Result<DateTime<Utc>, EntryError> {
    let ts = ts.trim();
    let parsed = match fmt {
        DateFormat::Rfc2822 => OffsetDateTime::parse(ts, &Rfc2822).ok(),
        DateFormat::Rfc3339 => OffsetDateTime::parse(ts, &Rfc3339).ok(),
    };
    if let Some(dt) = parsed.and_then(|dt| DateTime::from_timestamp(dt.unix_timestamp(), 0)) {
        return Ok(dt);
    }
    // chrono is more lenient with obsolete zone names ("GMT", "EST") some publishers still emit
    let fallback = match fmt {
        DateFormat::Rfc2822 => DateTime::parse_from_rfc2822(ts),
        DateFormat::Rfc3339 => DateTime::parse_from_rfc3339(ts),
    };
    fallback
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| EntryError::BadDate(ts.to_string()))
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

fn build_item(
    publisher: &str,
    title: Option<&str>,
    link: Option<&str>,
    date: Option<&str>,
    fmt: DateFormat,
    summary: Option<&str>,
) -> Result<RawItem, EntryError> {
    let title = non_empty(title)
        .map(normalize_text)
        .filter(|t| !t.is_empty())
        .ok_or(EntryError::MissingTitle)?;
    let link = non_empty(link).ok_or(EntryError::MissingLink)?;
    let published_at = parse_date(non_empty(date).ok_or(EntryError::MissingDate)?, fmt)?;

    Ok(RawItem {
        publisher: publisher.to_string(),
        title,
        summary: summary.map(normalize_text).unwrap_or_default(),
        link: link.to_string(),
        published_at,
    })
}

fn detect_kind(body: &str) -> Option<FeedKind> {
    let rss = body.find("<rss");
    let atom = body.find("<feed");
    match (rss, atom) {
        (Some(r), Some(a)) => Some(if r < a { FeedKind::Rss } else { FeedKind::Atom }),
        (Some(_), None) => Some(FeedKind::Rss),
        (None, Some(_)) => Some(FeedKind::Atom),
        (None, None) => None,
    }
}

fn malformed(e: impl std::fmt::Display) -> FetchError {
    FetchError::Malformed(e.to_string())
}

/// Raw XML of every `<tag>` element in the document, in document order.
///
/// Only the document structure is checked here; each slice is deserialized on its
/// own later, so a bad entry cannot take its siblings down with it.
fn entry_slices<'a>(xml: &'a str, tag: &[u8]) -> Result<Vec<&'a str>, FetchError> {
    let mut reader = Reader::from_str(xml);
    let mut out = Vec::new();
    loop {
        let start = reader.buffer_position() as usize;
        match reader.read_event().map_err(malformed)? {
            Event::Start(e) if e.local_name().as_ref() == tag => {
                reader.read_to_end(e.name()).map_err(malformed)?;
                out.push(&xml[start..reader.buffer_position() as usize]);
            }
            Event::Empty(e) if e.local_name().as_ref() == tag => {
                out.push(&xml[start..reader.buffer_position() as usize]);
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(out)
}

fn rss_entry(publisher: &str, xml: &str) -> Result<RawItem, EntryError> {
    let it: RssItem = from_str(xml).map_err(|e| EntryError::Unreadable(e.to_string()))?;
    build_item(
        publisher,
        it.title.as_deref(),
        it.link.as_deref(),
        it.pub_date.as_deref(),
        DateFormat::Rfc2822,
        it.description.as_deref(),
    )
}

fn atom_entry(publisher: &str, xml: &str) -> Result<RawItem, EntryError> {
    let e: AtomEntry = from_str(xml).map_err(|e| EntryError::Unreadable(e.to_string()))?;
    let link = e
        .link
        .iter()
        .find(|l| l.rel.as_deref().map_or(true, |r| r == "alternate"))
        .and_then(|l| l.href.as_deref());
    let date = e.published.as_deref().or(e.updated.as_deref());
    let summary = e.summary.as_ref().or(e.content.as_ref());
    build_item(
        publisher,
        e.title.as_ref().map(|t| t.value.as_str()),
        link,
        date,
        DateFormat::Rfc3339,
        summary.map(|s| s.value.as_str()),
    )
}

/// Parse a whole feed body. Malformed entries are skipped and counted.
pub fn parse_feed(publisher: &str, body: &str) -> Result<Vec<RawItem>, FetchError> {
    let t0 = std::time::Instant::now();
    let xml = scrub_html_entities_for_xml(body);

    let entries: Vec<Result<RawItem, EntryError>> = match detect_kind(&xml) {
        Some(FeedKind::Rss) => entry_slices(&xml, b"item")?
            .into_iter()
            .map(|s| rss_entry(publisher, s))
            .collect(),
        Some(FeedKind::Atom) => entry_slices(&xml, b"entry")?
            .into_iter()
            .map(|s| atom_entry(publisher, s))
            .collect(),
        None => {
            return Err(FetchError::Malformed(
                "body is neither an RSS nor an Atom document".into(),
            ))
        }
    };

    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry {
            Ok(item) => out.push(item),
            Err(e) => {
                tracing::debug!(target: "ingest", publisher, error = %e, "skipping malformed entry");
                counter!("ingest_malformed_entries_total").increment(1);
            }
        }
    }

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("ingest_parse_ms").record(ms);
    counter!("ingest_entries_total").increment(out.len() as u64);
    Ok(out)
}

pub struct FeedSource {
    name: String,
    mode: Mode,
    max_body_bytes: usize,
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl FeedSource {
    /// Serve a fixed feed body (tests, offline runs).
    pub fn from_fixture(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mode: Mode::Fixture(body.into()),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Fetch the feed over HTTP with a shared client.
    pub fn from_url(name: impl Into<String>, url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            name: name.into(),
            mode: Mode::Http {
                url: url.into(),
                client,
            },
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Refuse HTTP bodies larger than `bytes`.
    pub fn with_max_body_bytes(mut self, bytes: usize) -> Self {
        self.max_body_bytes = bytes;
        self
    }

    async fn load_body(&self) -> Result<String, FetchError> {
        match &self.mode {
            Mode::Fixture(s) => Ok(s.clone()),
            Mode::Http { url, client } => {
                let mut resp = client.get(url.as_str()).send().await.inspect_err(|e| {
                    tracing::warn!(target: "ingest", error = ?e, provider = %self.name, "provider http error");
                })?;
                let status = resp.status();
                if !status.is_success() {
                    return Err(FetchError::Status(status.as_u16()));
                }

                let limit = self.max_body_bytes;
                if resp.content_length().is_some_and(|n| n > limit as u64) {
                    return Err(FetchError::TooLarge(limit));
                }
                // Content-Length may be absent or wrong; count while streaming.
                let mut buf: Vec<u8> = Vec::new();
                while let Some(chunk) = resp.chunk().await? {
                    if buf.len() + chunk.len() > limit {
                        return Err(FetchError::TooLarge(limit));
                    }
                    buf.extend_from_slice(&chunk);
                }
                Ok(String::from_utf8_lossy(&buf).into_owned())
            }
        }
    }
}

#[async_trait]
impl NewsSource for FeedSource {
    async fn fetch(&self, since: DateTime<Utc>) -> Result<Vec<RawItem>, FetchError> {
        let body = self.load_body().await?;
        let mut items = parse_feed(&self.name, &body)?;
        items.retain(|it| it.published_at >= since);
        Ok(items)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Rewrite HTML named entities (`&eacute;`, `&nbsp;`, ...) as numeric references so
/// the XML reader accepts them. The five XML entities pass through; unknown names are
/// escaped and end up as literal text.
fn scrub_html_entities_for_xml(s: &str) -> Cow<'_, str> {
    static RE_ENTITY: OnceCell<Regex> = OnceCell::new();
    let re = RE_ENTITY
        .get_or_init(|| Regex::new(r"&([A-Za-z][A-Za-z0-9]{1,31});").expect("entity regex"));
    re.replace_all(s, |caps: &Captures| {
        let (whole, name) = (&caps[0], &caps[1]);
        if matches!(name, "amp" | "lt" | "gt" | "quot" | "apos") {
            return whole.to_string();
        }
        let decoded = html_escape::decode_html_entities(whole);
        if &*decoded == whole {
            format!("&amp;{name};")
        } else {
            decoded.chars().map(|c| format!("&#{};", u32::from(c))).collect()
        }
    })
}
