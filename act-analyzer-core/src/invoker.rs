//! Analysis invoker: runs each task against an [`LlmProvider`] and validates the answer.
//!
//! Each task has two entry points:
//! - a strict call (`summarize`, `extract_sections`, `check_rules`) returning
//!   `Result<_, AnalysisError>`;
//! - a reporting call (`*_or_report`) that never fails and instead returns a
//!   usable fallback value plus the user-visible notice.
//!
//! Blank document text is rejected before any request is built, so the
//! provider never sees an empty prompt body.
//!
//! Rule checks always come back as exactly six entries in [`RULES`] order.
//! The `rule` text of each entry is the canonical rule for its slot; an
//! element that fails validation, or a slot the provider left out, becomes an
//! `unknown` placeholder carrying the reason.

use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use crate::contract::LlmProvider;
use crate::error::{AnalysisError, ExtractionError, ProviderError, SchemaViolation};
use crate::prompts::{AnalysisTask, MAX_INPUT_CHARS, RULES};
use crate::report::{RuleCheck, RuleStatus, SectionBundle, SECTION_KEYS};
use crate::source::DocumentText;

const RULE_FIELDS: [&str; 4] = ["rule", "status", "evidence", "confidence"];

/// A value that is always safe to render, plus the error that produced it (if any).
#[derive(Debug, Clone, PartialEq)]
pub struct Reported<T> {
    pub value: T,
    pub notice: Option<AnalysisError>,
}

impl<T> Reported<T> {
    fn ok(value: T) -> Self {
        Reported {
            value,
            notice: None,
        }
    }

    fn failed(value: T, notice: AnalysisError) -> Self {
        Reported {
            value,
            notice: Some(notice),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.notice.is_none()
    }
}

pub struct Analyzer<P> {
    provider: P,
}

impl<P: LlmProvider> Analyzer<P> {
    pub fn new(provider: P) -> Self {
        Analyzer { provider }
    }

    async fn call(&self, task: AnalysisTask, text: &DocumentText) -> Result<String, AnalysisError> {
        if text.is_blank() {
            warn!(task = %task, "[ANALYZE] Refusing to analyze empty document text");
            return Err(ExtractionError::EmptyText.into());
        }

        let request = task.build_request(text);
        info!(
            task = %task,
            document_chars = text.char_count(),
            truncated = text.char_count() > MAX_INPUT_CHARS,
            temperature = request.temperature,
            structured = request.schema.is_some(),
            "[ANALYZE] Sending request to provider"
        );

        match self.provider.complete(request).await {
            Ok(content) => {
                info!(task = %task, response_len = content.len(), "[ANALYZE] Provider responded");
                Ok(content)
            }
            Err(e) => {
                error!(task = %task, error = %e, "[ANALYZE][ERROR] Provider call failed");
                Err(e.into())
            }
        }
    }

    /// Bullet-point summary, returned verbatim.
    /// A blank answer counts as no answer, so it never becomes a stored summary.
    pub async fn summarize(&self, text: &DocumentText) -> Result<String, AnalysisError> {
        let summary = self.call(AnalysisTask::Summarize, text).await?;
        if summary.trim().is_empty() {
            error!("[ANALYZE][ERROR] Provider returned a blank summary");
            return Err(ProviderError::EmptyResponse.into());
        }
        Ok(summary)
    }

    pub async fn extract_sections(
        &self,
        text: &DocumentText,
    ) -> Result<SectionBundle, AnalysisError> {
        let content = self.call(AnalysisTask::ExtractSections, text).await?;
        parse_sections(&content).map_err(|e| {
            error!(error = %e, "[ANALYZE][ERROR] Section response failed validation");
            e
        })
    }

    pub async fn check_rules(&self, text: &DocumentText) -> Result<Vec<RuleCheck>, AnalysisError> {
        let content = self.call(AnalysisTask::CheckRules, text).await?;
        parse_rule_checks(&content).map_err(|e| {
            error!(error = %e, "[ANALYZE][ERROR] Rule check response failed validation");
            e
        })
    }

    /// Summary, or an empty string plus the notice.
    pub async fn summarize_or_report(&self, text: &DocumentText) -> Reported<String> {
        match self.summarize(text).await {
            Ok(summary) => Reported::ok(summary),
            Err(e) => Reported::failed(String::new(), e),
        }
    }

    /// Sections, or the empty bundle plus the notice.
    pub async fn extract_sections_or_report(&self, text: &DocumentText) -> Reported<SectionBundle> {
        match self.extract_sections(text).await {
            Ok(bundle) => Reported::ok(bundle),
            Err(e) => Reported::failed(SectionBundle::default(), e),
        }
    }

    /// Six rule checks, or six sentinel placeholders plus the notice.
    pub async fn check_rules_or_report(&self, text: &DocumentText) -> Reported<Vec<RuleCheck>> {
        match self.check_rules(text).await {
            Ok(checks) => Reported::ok(checks),
            Err(e) => Reported::failed(fallback_rule_checks(&e), e),
        }
    }
}

/// One placeholder per rule, status and evidence derived from the error.
pub fn fallback_rule_checks(err: &AnalysisError) -> Vec<RuleCheck> {
    let status = err.sentinel_status();
    let evidence = err.sentinel_evidence();
    RULES
        .iter()
        .map(|rule| RuleCheck::placeholder(rule, status, evidence.clone()))
        .collect()
}

fn parse_json(content: &str) -> Result<Value, SchemaViolation> {
    serde_json::from_str(content).map_err(|e| SchemaViolation::InvalidJson(e.to_string()))
}

fn reject_undeclared(object: &Map<String, Value>, declared: &[&str]) -> Result<(), SchemaViolation> {
    match object.keys().find(|key| !declared.contains(&key.as_str())) {
        Some(key) => Err(SchemaViolation::UnknownField(key.clone())),
        None => Ok(()),
    }
}

fn required_string(object: &Map<String, Value>, key: &str) -> Result<String, SchemaViolation> {
    match object.get(key) {
        None => Err(SchemaViolation::MissingField(key.to_string())),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(SchemaViolation::UnexpectedShape(format!(
            "`{key}` must be a string, got {other}"
        ))),
    }
}

/// Validate a section extraction payload against the seven-key contract.
pub fn parse_sections(content: &str) -> Result<SectionBundle, AnalysisError> {
    let value = parse_json(content)?;
    let object = value.as_object().ok_or_else(|| {
        SchemaViolation::UnexpectedShape("expected a JSON object of sections".to_string())
    })?;
    reject_undeclared(object, &SECTION_KEYS)?;

    let mut bundle = SectionBundle::default();
    for key in SECTION_KEYS {
        let text = required_string(object, key)?;
        if let Some(field) = bundle.field_mut(key) {
            *field = text;
        }
    }
    debug!(
        filled = bundle.entries().iter().filter(|(_, _, v)| !v.is_empty()).count(),
        "[ANALYZE] Parsed section bundle"
    );
    Ok(bundle)
}

fn validate_rule_element(element: &Value) -> Result<(String, RuleStatus, String, u8), SchemaViolation> {
    let object = element.as_object().ok_or_else(|| {
        SchemaViolation::UnexpectedShape("rule check must be a JSON object".to_string())
    })?;
    reject_undeclared(object, &RULE_FIELDS)?;

    let rule = required_string(object, "rule")?;
    let raw_status = required_string(object, "status")?;
    let status =
        RuleStatus::from_provider(&raw_status).ok_or(SchemaViolation::InvalidStatus(raw_status))?;
    let evidence = required_string(object, "evidence")?;
    let confidence = match object.get("confidence") {
        None => return Err(SchemaViolation::MissingField("confidence".to_string())),
        Some(raw) => raw
            .as_u64()
            .filter(|c| *c <= 100)
            .map(|c| c as u8)
            .ok_or_else(|| SchemaViolation::ConfidenceOutOfRange(raw.to_string()))?,
    };
    Ok((rule, status, evidence, confidence))
}

/// Validate a rule check payload and align it to the six fixed rules.
///
/// Fails only when the payload is not JSON or has no `rules` array; element
/// problems are reported in place as `unknown` entries.
pub fn parse_rule_checks(content: &str) -> Result<Vec<RuleCheck>, AnalysisError> {
    let value = parse_json(content)?;
    let wrapper = value.as_object().ok_or_else(|| {
        SchemaViolation::UnexpectedShape("expected a JSON object with a `rules` key".to_string())
    })?;
    if let Err(violation) = reject_undeclared(wrapper, &["rules"]) {
        return Err(SchemaViolation::UnexpectedShape(violation.to_string()).into());
    }
    let elements = wrapper
        .get("rules")
        .and_then(Value::as_array)
        .ok_or_else(|| SchemaViolation::UnexpectedShape("missing `rules` array".to_string()))?;

    if elements.len() != RULES.len() {
        warn!(
            returned = elements.len(),
            expected = RULES.len(),
            "[ANALYZE] Provider returned an unexpected number of rule checks"
        );
    }

    let checks = RULES
        .iter()
        .enumerate()
        .map(|(slot, rule)| match elements.get(slot) {
            Some(element) => match validate_rule_element(element) {
                Ok((echoed, status, evidence, confidence)) => {
                    if echoed != *rule {
                        debug!(slot, echoed = %echoed, "[ANALYZE] Provider paraphrased rule text");
                    }
                    RuleCheck {
                        rule: rule.to_string(),
                        status,
                        evidence,
                        confidence,
                    }
                }
                Err(violation) => {
                    warn!(slot, error = %violation, "[ANALYZE] Rule check element failed validation");
                    RuleCheck::placeholder(rule, RuleStatus::Unknown, violation.to_string())
                }
            },
            None => RuleCheck::placeholder(rule, RuleStatus::Unknown, "No check returned for this rule"),
        })
        .collect();
    Ok(checks)
}
