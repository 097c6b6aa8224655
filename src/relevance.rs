// src/relevance.rs
//! Relevance gate: does a piece of text concern biosimilars?
//!
//! Case-insensitive substring matching against `taxonomy::SIGNAL_LEXICON`. Any hit
//! (generic keyword or reference molecule) makes the text relevant.

use serde::Serialize;
use tracing::debug;

use crate::taxonomy::{SignalKind, SIGNAL_LEXICON};

pub const ENV_DEV_LOG: &str = "NEWS_DEV_LOG";

/// Dev logging gate: NEWS_DEV_LOG=1 AND dev env (debug build or SHUTTLE_ENV in
/// {local, development, dev}). The binary uses the same gate for its subscriber.
pub fn dev_logging_enabled() -> bool {
    let on = std::env::var(ENV_DEV_LOG).ok().as_deref() == Some("1");
    if !on {
        return false;
    }
    if cfg!(debug_assertions) {
        return true;
    }
    matches!(
        std::env::var("SHUTTLE_ENV")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str(),
        "local" | "development" | "dev"
    )
}

/// Short, stable hex id of `text` (first `bytes` bytes of its SHA-256).
pub(crate) fn short_hash(text: &str, bytes: usize) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(bytes * 2);
    for b in digest.iter().take(bytes) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// What the item is mainly about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Focus {
    /// Mentions biosimilars explicitly.
    Biosimilar,
    /// Only names a reference molecule or originator brand.
    ReferenceMolecule,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Relevance {
    pub matched: bool,
    /// Lexicon terms in order of first occurrence, each once.
    pub signals: Vec<String>,
    pub focus: Option<Focus>,
}

/// Classify `text` (title + summary) against the signal lexicon. Never fails.
pub fn is_domain_relevant(text: &str) -> Relevance {
    let haystack = text.to_lowercase();

    // (first position, lexicon index)
    let mut hits: Vec<(usize, usize)> = SIGNAL_LEXICON
        .iter()
        .enumerate()
        .filter_map(|(i, s)| haystack.find(s.term).map(|pos| (pos, i)))
        .collect();
    hits.sort_unstable();

    if hits.is_empty() {
        return Relevance::default();
    }

    let focus = if hits
        .iter()
        .any(|&(_, i)| SIGNAL_LEXICON[i].kind == SignalKind::Keyword)
    {
        Focus::Biosimilar
    } else {
        Focus::ReferenceMolecule
    };
    let signals: Vec<String> = hits
        .iter()
        .map(|&(_, i)| SIGNAL_LEXICON[i].term.to_string())
        .collect();

    if dev_logging_enabled() {
        // Never log raw text. Only hashed id + short list.
        debug!(
            target: "relevance",
            id = %short_hash(text, 6),
            signals = ?signals.iter().take(5).collect::<Vec<_>>(),
            "relevant"
        );
    }

    Relevance {
        matched: true,
        signals,
        focus: Some(focus),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_generic_keyword() {
        let r = is_domain_relevant("This announcement highlights a new oncology biosimilar.");
        assert!(r.matched);
        assert!(r.signals.contains(&"biosimilar".to_string()));
        assert_eq!(r.focus, Some(Focus::Biosimilar));
    }

    #[test]
    fn detects_reference_molecule_names() {
        let r = is_domain_relevant("Positive phase 3 data for denosumab candidate.");
        assert!(r.matched);
        assert_eq!(r.signals, vec!["denosumab".to_string()]);
        assert_eq!(r.focus, Some(Focus::ReferenceMolecule));
    }

    #[test]
    fn repeated_mentions_are_reported_once_in_text_order() {
        let r = is_domain_relevant("HUMIRA rival: Adalimumab Biosimilar; another adalimumab biosimilar");
        assert_eq!(r.signals, vec!["humira", "adalimumab", "biosimilar"]);
    }

    #[test]
    fn unrelated_text_is_not_relevant() {
        let r = is_domain_relevant("Quarterly earnings beat expectations on vaccine sales.");
        assert!(!r.matched);
        assert!(r.signals.is_empty());
        assert!(r.focus.is_none());
    }

    #[test]
    #[serial_test::serial]
    fn dev_logging_needs_the_flag() {
        std::env::remove_var(ENV_DEV_LOG);
        assert!(!dev_logging_enabled());
        std::env::set_var(ENV_DEV_LOG, "0");
        assert!(!dev_logging_enabled());
        std::env::set_var(ENV_DEV_LOG, "1");
        // test builds carry debug assertions, so the flag alone is enough
        assert_eq!(dev_logging_enabled(), cfg!(debug_assertions));
        std::env::remove_var(ENV_DEV_LOG);
    }

    #[test]
    fn short_hash_is_stable_hex() {
        let a = short_hash("https://example.test/a", 12);
        assert_eq!(a.len(), 24);
        assert_eq!(a, short_hash("https://example.test/a", 12));
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
