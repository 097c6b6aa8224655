// src/categorize.rs
//! Category & priority assignment.
//!
//! Every rule in `CATEGORY_RULES` is checked against the lowercased text. Fired
//! categories are ordered by where their earliest trigger appears in the text
//! (ties: rule declaration order). A trigger occurrence that sits inside a longer
//! trigger of another rule does not count. Priority is derived from the classes that fired.

use serde::Serialize;

use crate::relevance::{is_domain_relevant, Relevance};
use crate::taxonomy::{CategoryRule, PriorityClass, SopCategory, CATEGORY_RULES};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Standard,
    Elevated,
    Critical,
}

impl Priority {
    pub fn label(self) -> &'static str {
        match self {
            Priority::Standard => "Standard Priority",
            Priority::Elevated => "Elevated Priority",
            Priority::Critical => "Critical Priority",
        }
    }
}

/// A fired category together with the trigger phrase that fired it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SopAssignment {
    pub category: &'static SopCategory,
    pub trigger: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationResult {
    pub domain_matched: bool,
    pub matched_signals: Vec<String>,
    pub assignments: Vec<SopAssignment>,
    pub priority: Priority,
}

/// One occurrence of a trigger phrase in the lowercased text.
#[derive(Debug, Clone, Copy)]
struct Hit {
    start: usize,
    end: usize,
    rule: usize,
    trigger: &'static str,
}

impl Hit {
    /// Strictly inside a longer phrase of another rule ("marketing authorization" in
    /// "marketing authorization application").
    fn shadowed_by(&self, other: &Hit) -> bool {
        other.rule != self.rule
            && other.start <= self.start
            && self.end <= other.end
            && other.end - other.start > self.end - self.start
    }
}

/// Every occurrence of every trigger, in rule then trigger order.
fn trigger_hits(rules: &[CategoryRule], haystack: &str) -> Vec<Hit> {
    let mut hits = Vec::new();
    for (rule, r) in rules.iter().enumerate() {
        for &t in r.triggers {
            hits.extend(haystack.match_indices(t).map(|(start, _)| Hit {
                start,
                end: start + t.len(),
                rule,
                trigger: t,
            }));
        }
    }
    hits
}

/// Evaluate all category rules against `text`.
pub fn assign_categories(text: &str) -> Vec<SopAssignment> {
    let haystack = text.to_lowercase();
    let hits = trigger_hits(CATEGORY_RULES, &haystack);
    let live: Vec<&Hit> = hits
        .iter()
        .filter(|h| !hits.iter().any(|o| h.shadowed_by(o)))
        .collect();

    // (position, rule index, assignment)
    let mut fired: Vec<(usize, usize, SopAssignment)> = CATEGORY_RULES
        .iter()
        .enumerate()
        .filter_map(|(i, rule)| {
            live.iter()
                .filter(|h| h.rule == i)
                .min_by_key(|h| h.start)
                .map(|h| {
                    (
                        h.start,
                        i,
                        SopAssignment {
                            category: rule.category,
                            trigger: h.trigger,
                        },
                    )
                })
        })
        .collect();
    fired.sort_by_key(|&(pos, i, _)| (pos, i));
    fired.into_iter().map(|(_, _, a)| a).collect()
}

/// Highest tier wins; only domain-relevant text can rise above `Standard`.
pub fn derive_priority(relevant: bool, assignments: &[SopAssignment]) -> Priority {
    if !relevant {
        return Priority::Standard;
    }
    let fired = |class: PriorityClass| assignments.iter().any(|a| a.category.class == class);
    if fired(PriorityClass::RegulatoryApproval) {
        Priority::Critical
    } else if fired(PriorityClass::SignificantEvent) {
        Priority::Elevated
    } else {
        Priority::Standard
    }
}

/// Categories and priority for text whose relevance is already known.
pub fn classify_with(relevance: &Relevance, text: &str) -> ClassificationResult {
    let assignments = assign_categories(text);
    let priority = derive_priority(relevance.matched, &assignments);
    ClassificationResult {
        domain_matched: relevance.matched,
        matched_signals: relevance.signals.clone(),
        assignments,
        priority,
    }
}

/// Relevance + categories + priority in one call.
pub fn categorize_text(text: &str) -> ClassificationResult {
    classify_with(&is_domain_relevant(text), text)
}
