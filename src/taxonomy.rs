//! # SOP Taxonomy
//!
//! Static, process-wide tables the classifiers read:
//!
//! - `SIGNAL_LEXICON`: domain signals (generic biosimilar keywords + reference molecules).
//! - `SOP_CATEGORIES`: the closed operating-procedure taxonomy, each entry with its
//!   follow-up playbook and the priority class it contributes.
//! - `CATEGORY_RULES`: trigger phrases per category, evaluated in declaration order.
//!
//! All tables are `'static` and never mutated, so they are shared freely across tasks.

use serde::Serialize;

/// What kind of event a category represents, for priority derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PriorityClass {
    RegulatoryApproval,
    SignificantEvent,
    Standard,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct SopCategory {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "priorityClass")]
    pub class: PriorityClass,
    #[serde(rename = "followUpActions")]
    pub follow_ups: &'static [&'static str],
}

#[derive(Debug)]
pub struct CategoryRule {
    pub category: &'static SopCategory,
    /// Lowercase phrases; any case-insensitive substring hit fires the rule.
    pub triggers: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    /// Generic domain vocabulary ("biosimilar").
    Keyword,
    /// A reference molecule or originator brand ("adalimumab", "humira").
    Molecule,
}

#[derive(Debug)]
pub struct Signal {
    pub term: &'static str,
    pub kind: SignalKind,
}

const fn kw(term: &'static str) -> Signal {
    Signal {
        term,
        kind: SignalKind::Keyword,
    }
}

const fn mol(term: &'static str) -> Signal {
    Signal {
        term,
        kind: SignalKind::Molecule,
    }
}

pub static SIGNAL_LEXICON: &[Signal] = &[
    kw("biosimilar"),
    kw("interchangeable biologic"),
    kw("follow-on biologic"),
    kw("reference product"),
    mol("adalimumab"),
    mol("aflibercept"),
    mol("bevacizumab"),
    mol("denosumab"),
    mol("eculizumab"),
    mol("etanercept"),
    mol("filgrastim"),
    mol("pegfilgrastim"),
    mol("infliximab"),
    mol("insulin glargine"),
    mol("natalizumab"),
    mol("omalizumab"),
    mol("ranibizumab"),
    mol("rituximab"),
    mol("tocilizumab"),
    mol("trastuzumab"),
    mol("ustekinumab"),
    mol("golimumab"),
    mol("pertuzumab"),
    mol("humira"),
    mol("stelara"),
    mol("eylea"),
    mol("prolia"),
    mol("xgeva"),
    mol("remicade"),
    mol("herceptin"),
    mol("avastin"),
    mol("rituxan"),
    mol("enbrel"),
    mol("neulasta"),
    mol("lucentis"),
    mol("soliris"),
    mol("actemra"),
];

pub static REGULATORY_APPROVALS: SopCategory = SopCategory {
    id: "regulatory-approvals",
    name: "Regulatory Approvals",
    description: "Approvals, interchangeability designations and marketing authorizations.",
    class: PriorityClass::RegulatoryApproval,
    follow_ups: &[
        "Notify regulatory affairs and update the competitor approval tracker",
        "Review label, indications and interchangeability status",
        "Assess impact on launch timelines and market exclusivity",
    ],
};

pub static REGULATORY_SUBMISSIONS: SopCategory = SopCategory {
    id: "regulatory-submissions",
    name: "Regulatory Submissions",
    description: "Filings and applications accepted for review by health authorities.",
    class: PriorityClass::Standard,
    follow_ups: &[
        "Log the submission and expected action date in the regulatory calendar",
        "Notify regulatory affairs and update the competitor approval tracker",
    ],
};

pub static COMMERCIAL_LAUNCH: SopCategory = SopCategory {
    id: "commercial-launch",
    name: "Commercial Launch",
    description: "Product launches, market entry and commercial availability.",
    class: PriorityClass::SignificantEvent,
    follow_ups: &[
        "Brief commercial and market access teams on the competitive entry",
        "Capture launch pricing and channel strategy",
        "Update market share and uptake forecasts",
    ],
};

pub static CLINICAL_DEVELOPMENT: SopCategory = SopCategory {
    id: "clinical-development",
    name: "Clinical Development",
    description: "Clinical trial starts, readouts and comparability data.",
    class: PriorityClass::Standard,
    follow_ups: &[
        "Have medical affairs review the study design and results",
        "Update the competitor pipeline tracker",
    ],
};

pub static LEGAL_IP: SopCategory = SopCategory {
    id: "legal-ip",
    name: "Legal & IP",
    description: "Patent disputes, litigation and settlements affecting market entry.",
    class: PriorityClass::SignificantEvent,
    follow_ups: &[
        "Forward to legal for patent and exclusivity assessment",
        "Reassess expected market entry dates",
    ],
};

pub static PARTNERSHIPS_LICENSING: SopCategory = SopCategory {
    id: "partnerships-licensing",
    name: "Partnerships & Licensing",
    description: "Commercialization deals, licensing agreements and acquisitions.",
    class: PriorityClass::Standard,
    follow_ups: &[
        "Inform business development of the deal terms",
        "Update the competitor landscape map",
    ],
};

pub static SAFETY_QUALITY: SopCategory = SopCategory {
    id: "safety-quality",
    name: "Safety & Quality",
    description: "Recalls, warning letters and safety communications.",
    class: PriorityClass::SignificantEvent,
    follow_ups: &[
        "Escalate to pharmacovigilance and quality assurance",
        "Check for supply or substitution impact on our products",
    ],
};

pub static MANUFACTURING_SUPPLY: SopCategory = SopCategory {
    id: "manufacturing-supply",
    name: "Manufacturing & Supply",
    description: "Manufacturing capacity, facilities, supply and shortages.",
    class: PriorityClass::Standard,
    follow_ups: &[
        "Notify supply chain of the capacity or shortage signal",
        "Check for supply or substitution impact on our products",
    ],
};

pub static PRICING_ACCESS: SopCategory = SopCategory {
    id: "pricing-access",
    name: "Pricing & Market Access",
    description: "Pricing, formulary placement, reimbursement and payer coverage.",
    class: PriorityClass::Standard,
    follow_ups: &[
        "Share with market access for payer and formulary review",
        "Capture launch pricing and channel strategy",
    ],
};

/// The full taxonomy in display order.
pub static SOP_CATEGORIES: &[&SopCategory] = &[
    &REGULATORY_APPROVALS,
    &REGULATORY_SUBMISSIONS,
    &COMMERCIAL_LAUNCH,
    &CLINICAL_DEVELOPMENT,
    &LEGAL_IP,
    &PARTNERSHIPS_LICENSING,
    &SAFETY_QUALITY,
    &MANUFACTURING_SUPPLY,
    &PRICING_ACCESS,
];

pub static CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        category: &REGULATORY_APPROVALS,
        triggers: &[
            "approval",
            "approved",
            "approves",
            "interchangeable",
            "interchangeability",
            "marketing authorization",
            "marketing authorisation",
            "market authorization",
            "positive opinion",
        ],
    },
    CategoryRule {
        category: &REGULATORY_SUBMISSIONS,
        triggers: &[
            "submission",
            "submitted",
            "filing",
            "accepted for review",
            "biologics license application",
            "marketing authorization application",
        ],
    },
    CategoryRule {
        category: &COMMERCIAL_LAUNCH,
        triggers: &[
            "launch",
            "commercially available",
            "now available",
            "market entry",
            "introduces",
        ],
    },
    CategoryRule {
        category: &CLINICAL_DEVELOPMENT,
        triggers: &[
            "phase 1",
            "phase 3",
            "phase iii",
            "clinical trial",
            "clinical study",
            "topline",
            "pivotal",
            "data readout",
        ],
    },
    CategoryRule {
        category: &LEGAL_IP,
        triggers: &[
            "patent",
            "litigation",
            "lawsuit",
            "settlement",
            "court",
            "inter partes review",
        ],
    },
    CategoryRule {
        category: &PARTNERSHIPS_LICENSING,
        triggers: &[
            "partnership",
            "collaboration",
            "license agreement",
            "licensing agreement",
            "acquisition",
            "acquire",
            "commercialization rights",
        ],
    },
    CategoryRule {
        category: &SAFETY_QUALITY,
        triggers: &[
            "recall",
            "warning letter",
            "adverse event",
            "safety communication",
            "form 483",
        ],
    },
    CategoryRule {
        category: &MANUFACTURING_SUPPLY,
        triggers: &[
            "manufacturing",
            "supply",
            "shortage",
            "production capacity",
            "facility",
        ],
    },
    CategoryRule {
        category: &PRICING_ACCESS,
        triggers: &[
            "price",
            "pricing",
            "formulary",
            "reimbursement",
            "payer",
            "rebate",
            "market access",
            "coverage",
        ],
    },
];

/// Look up a category by its stable id.
pub fn category_by_id(id: &str) -> Option<&'static SopCategory> {
    SOP_CATEGORIES.iter().copied().find(|c| c.id == id)
}
