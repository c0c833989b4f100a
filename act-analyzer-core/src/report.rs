//! Analysis artifacts and the combined final report.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::prompts::AnalysisTask;

/// The seven fixed section keys, in display and schema order.
pub const SECTION_KEYS: [&str; 7] = [
    "definitions",
    "obligations",
    "responsibilities",
    "eligibility",
    "payments",
    "penalties",
    "record_keeping",
];

/// Structured extraction of the seven key legislative sections.
///
/// Every field is always present. An empty string means the model found nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectionBundle {
    pub definitions: String,
    pub obligations: String,
    pub responsibilities: String,
    pub eligibility: String,
    pub payments: String,
    pub penalties: String,
    pub record_keeping: String,
}

impl SectionBundle {
    /// `(key, title, value)` for every section, in fixed order.
    pub fn entries(&self) -> [(&'static str, &'static str, &str); 7] {
        [
            ("definitions", "Definitions", self.definitions.as_str()),
            ("obligations", "Obligations", self.obligations.as_str()),
            ("responsibilities", "Responsibilities", self.responsibilities.as_str()),
            ("eligibility", "Eligibility", self.eligibility.as_str()),
            ("payments", "Payments", self.payments.as_str()),
            ("penalties", "Penalties", self.penalties.as_str()),
            ("record_keeping", "Record Keeping", self.record_keeping.as_str()),
        ]
    }

    /// True when no section carries any text (the fallback bundle).
    pub fn is_empty(&self) -> bool {
        self.entries().iter().all(|(_, _, value)| value.is_empty())
    }

    pub(crate) fn field_mut(&mut self, key: &str) -> Option<&mut String> {
        match key {
            "definitions" => Some(&mut self.definitions),
            "obligations" => Some(&mut self.obligations),
            "responsibilities" => Some(&mut self.responsibilities),
            "eligibility" => Some(&mut self.eligibility),
            "payments" => Some(&mut self.payments),
            "penalties" => Some(&mut self.penalties),
            "record_keeping" => Some(&mut self.record_keeping),
            _ => None,
        }
    }
}

/// Outcome of a single rule check.
///
/// The provider schema only admits `pass` and `fail`; `unknown` and `error`
/// are sentinels written by the fallback path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleStatus {
    Pass,
    Fail,
    Unknown,
    Error,
}

impl RuleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleStatus::Pass => "pass",
            RuleStatus::Fail => "fail",
            RuleStatus::Unknown => "unknown",
            RuleStatus::Error => "error",
        }
    }

    /// Parse a provider-supplied status. Only the schema values are accepted.
    pub fn from_provider(raw: &str) -> Option<Self> {
        match raw {
            "pass" => Some(RuleStatus::Pass),
            "fail" => Some(RuleStatus::Fail),
            _ => None,
        }
    }
}

impl std::fmt::Display for RuleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One compliance judgment with supporting evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleCheck {
    pub rule: String,
    pub status: RuleStatus,
    pub evidence: String,
    /// Integer in `[0, 100]`.
    pub confidence: u8,
}

impl RuleCheck {
    pub fn placeholder(rule: &str, status: RuleStatus, evidence: impl Into<String>) -> Self {
        RuleCheck {
            rule: rule.to_string(),
            status,
            evidence: evidence.into(),
            confidence: 0,
        }
    }
}

/// Combined export of all three analyses for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalReport {
    pub summary: String,
    pub sections: SectionBundle,
    pub rule_checks: Vec<RuleCheck>,
}

impl FinalReport {
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Returned by report assembly while any analysis is still missing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Report unavailable; missing analyses: {}", format_missing(.missing))]
pub struct ReportUnavailable {
    pub missing: Vec<AnalysisTask>,
}

fn format_missing(missing: &[AnalysisTask]) -> String {
    missing
        .iter()
        .map(|t| t.label())
        .collect::<Vec<_>>()
        .join(", ")
}
