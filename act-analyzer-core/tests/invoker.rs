use act_analyzer_core::contract::{CompletionRequest, MockLlmProvider};
use act_analyzer_core::error::{AnalysisError, ExtractionError, ProviderError, SchemaViolation};
use act_analyzer_core::invoker::{parse_rule_checks, parse_sections, Analyzer};
use act_analyzer_core::prompts::{AnalysisTask, RULES};
use act_analyzer_core::report::{RuleStatus, SECTION_KEYS};
use act_analyzer_core::source::DocumentText;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn act() -> DocumentText {
    DocumentText::new("This Act defines 'claimant' as a person who applies for support.")
}

fn sections_json() -> String {
    json!({
        "definitions": "'claimant' means a person who applies",
        "obligations": "Claimants must report changes",
        "responsibilities": "The Authority shall administer payments",
        "eligibility": "Residency is required",
        "payments": "Calculated monthly",
        "penalties": "Up to $500",
        "record_keeping": ""
    })
    .to_string()
}

fn rule_json(status: &str, evidence: &str, confidence: Value) -> Value {
    json!({ "rule": "echoed", "status": status, "evidence": evidence, "confidence": confidence })
}

fn analyzer_returning(
    task: AnalysisTask,
    response: Result<String, ProviderError>,
) -> Analyzer<MockLlmProvider> {
    let mut provider = MockLlmProvider::new();
    provider
        .expect_complete()
        .withf(move |req: &CompletionRequest| req.task == task)
        .times(1)
        .return_once(move |_| response);
    Analyzer::new(provider)
}

#[tokio::test]
async fn test_summarize_returns_content_verbatim() {
    let summary = "- Purpose: support claimants\n- Enforcement: penalties up to $500".to_string();
    let analyzer = analyzer_returning(AnalysisTask::Summarize, Ok(summary.clone()));

    let result = analyzer.summarize(&act()).await.expect("summary");
    assert_eq!(result, summary);
}

#[tokio::test]
async fn test_summarize_failure_reports_empty_string_and_notice() {
    let analyzer = analyzer_returning(
        AnalysisTask::Summarize,
        Err(ProviderError::QuotaExceeded("insufficient_quota".into())),
    );

    let reported = analyzer.summarize_or_report(&act()).await;
    assert_eq!(reported.value, "");
    assert!(matches!(
        reported.notice,
        Some(AnalysisError::Provider(ProviderError::QuotaExceeded(_)))
    ));
}

#[tokio::test]
async fn test_extract_sections_yields_exactly_seven_keys() {
    let analyzer = analyzer_returning(AnalysisTask::ExtractSections, Ok(sections_json()));

    let bundle = analyzer.extract_sections(&act()).await.expect("valid bundle");
    assert_eq!(bundle.penalties, "Up to $500");
    assert_eq!(bundle.record_keeping, "");

    let serialized = serde_json::to_value(&bundle).unwrap();
    let keys: Vec<&str> = serialized
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    let mut expected = SECTION_KEYS.to_vec();
    expected.sort();
    let mut actual = keys.clone();
    actual.sort();
    assert_eq!(actual, expected);
}

#[tokio::test]
async fn test_extract_sections_invalid_json_falls_back_to_empty_bundle() {
    let analyzer = analyzer_returning(
        AnalysisTask::ExtractSections,
        Ok("Here are the sections: {definitions".into()),
    );

    let reported = analyzer.extract_sections_or_report(&act()).await;
    assert!(reported.value.is_empty());
    assert!(matches!(
        reported.notice,
        Some(AnalysisError::SchemaValidation(SchemaViolation::InvalidJson(_)))
    ));
}

#[test]
fn test_sections_missing_field_is_rejected() {
    let mut value: Value = serde_json::from_str(&sections_json()).unwrap();
    value.as_object_mut().unwrap().remove("payments");

    let err = parse_sections(&value.to_string()).unwrap_err();
    assert_eq!(
        err,
        AnalysisError::SchemaValidation(SchemaViolation::MissingField("payments".into()))
    );
}

#[test]
fn test_sections_undeclared_field_is_rejected() {
    let mut value: Value = serde_json::from_str(&sections_json()).unwrap();
    value["summary"] = json!("not a section");

    let err = parse_sections(&value.to_string()).unwrap_err();
    assert_eq!(
        err,
        AnalysisError::SchemaValidation(SchemaViolation::UnknownField("summary".into()))
    );
}

#[test]
fn test_sections_null_field_is_rejected() {
    let mut value: Value = serde_json::from_str(&sections_json()).unwrap();
    value["penalties"] = Value::Null;

    let err = parse_sections(&value.to_string()).unwrap_err();
    assert!(matches!(
        err,
        AnalysisError::SchemaValidation(SchemaViolation::UnexpectedShape(_))
    ));
}

#[tokio::test]
async fn test_check_rules_success_keeps_fixed_order() {
    let statuses = ["pass", "pass", "fail", "pass", "pass", "pass"];
    let rules: Vec<Value> = statuses
        .iter()
        .enumerate()
        .map(|(i, s)| rule_json(s, &format!("clause {}", i + 1), json!(80 + i)))
        .collect();
    let analyzer = analyzer_returning(
        AnalysisTask::CheckRules,
        Ok(json!({ "rules": rules }).to_string()),
    );

    let checks = analyzer.check_rules(&act()).await.expect("valid checks");
    assert_eq!(checks.len(), 6);
    for (i, check) in checks.iter().enumerate() {
        assert_eq!(check.rule, RULES[i]);
        assert_eq!(check.evidence, format!("clause {}", i + 1));
        assert_eq!(check.confidence as usize, 80 + i);
    }
    assert_eq!(checks[2].status, RuleStatus::Fail);
}

#[tokio::test]
async fn test_check_rules_missing_array_yields_six_unknown_placeholders() {
    let analyzer = analyzer_returning(
        AnalysisTask::CheckRules,
        Ok(json!({ "checks": [] }).to_string()),
    );

    let reported = analyzer.check_rules_or_report(&act()).await;
    assert_eq!(reported.value.len(), 6);
    for (i, check) in reported.value.iter().enumerate() {
        assert_eq!(check.rule, RULES[i]);
        assert_eq!(check.status, RuleStatus::Unknown);
        assert_eq!(check.evidence, "Could not parse");
        assert_eq!(check.confidence, 0);
    }
    assert!(reported.notice.is_some());
}

#[tokio::test]
async fn test_check_rules_parse_failure_yields_six_error_placeholders() {
    let analyzer = analyzer_returning(AnalysisTask::CheckRules, Ok("not json".into()));

    let reported = analyzer.check_rules_or_report(&act()).await;
    assert_eq!(reported.value.len(), 6);
    assert!(reported
        .value
        .iter()
        .all(|c| c.status == RuleStatus::Error && c.evidence.starts_with("JSON parse error: ")));
}

#[tokio::test]
async fn test_check_rules_transport_failure_yields_six_error_placeholders() {
    let analyzer = analyzer_returning(
        AnalysisTask::CheckRules,
        Err(ProviderError::Transport("connection refused".into())),
    );

    let reported = analyzer.check_rules_or_report(&act()).await;
    let rules: Vec<&str> = reported.value.iter().map(|c| c.rule.as_str()).collect();
    assert_eq!(rules, RULES.to_vec());
    assert!(reported
        .value
        .iter()
        .all(|c| c.status == RuleStatus::Error && c.evidence.contains("connection refused")));
}

#[test]
fn test_invalid_elements_become_unknown_in_their_own_slot() {
    let content = json!({
        "rules": [
            rule_json("pass", "s.1", json!(90)),
            rule_json("maybe", "s.2", json!(50)),
            rule_json("pass", "s.3", json!(101)),
            rule_json("fail", "s.4", json!(42.5)),
            { "rule": "r", "status": "pass", "confidence": 10 },
            rule_json("pass", "s.6", json!(0)),
        ]
    })
    .to_string();

    let checks = parse_rule_checks(&content).expect("array present");
    let statuses: Vec<RuleStatus> = checks.iter().map(|c| c.status).collect();
    assert_eq!(
        statuses,
        vec![
            RuleStatus::Pass,
            RuleStatus::Unknown,
            RuleStatus::Unknown,
            RuleStatus::Unknown,
            RuleStatus::Unknown,
            RuleStatus::Pass,
        ]
    );
    assert!(checks[1].evidence.contains("maybe"));
    assert!(checks[2].evidence.contains("101"));
    assert!(checks[4].evidence.contains("evidence"));
}

#[test]
fn test_short_and_long_arrays_are_aligned_to_six() {
    let short = json!({ "rules": [rule_json("pass", "s.1", json!(70))] }).to_string();
    let checks = parse_rule_checks(&short).unwrap();
    assert_eq!(checks.len(), 6);
    assert_eq!(checks[0].status, RuleStatus::Pass);
    assert!(checks[1..].iter().all(|c| c.status == RuleStatus::Unknown));

    let rules: Vec<Value> = (0..9).map(|_| rule_json("fail", "none", json!(5))).collect();
    let long = json!({ "rules": rules }).to_string();
    let checks = parse_rule_checks(&long).unwrap();
    assert_eq!(checks.len(), 6);
    assert!(checks.iter().all(|c| c.status == RuleStatus::Fail));
}

#[tokio::test]
async fn test_empty_document_fails_fast_without_provider_call() {
    let mut provider = MockLlmProvider::new();
    provider.expect_complete().times(0);
    let analyzer = Analyzer::new(provider);
    let blank = DocumentText::new("   \n ");

    assert_eq!(
        analyzer.summarize(&blank).await,
        Err(AnalysisError::Extraction(ExtractionError::EmptyText))
    );
    assert_eq!(
        analyzer.extract_sections(&blank).await,
        Err(AnalysisError::Extraction(ExtractionError::EmptyText))
    );
    let reported = analyzer.check_rules_or_report(&blank).await;
    assert_eq!(reported.value.len(), 6);
    assert!(reported.value.iter().all(|c| c.status == RuleStatus::Error));
}

#[tokio::test]
async fn test_blank_summary_is_reported_as_empty_response() {
    let analyzer = analyzer_returning(AnalysisTask::Summarize, Ok("  \n".into()));

    let reported = analyzer.summarize_or_report(&act()).await;
    assert_eq!(reported.value, "");
    assert_eq!(
        reported.notice,
        Some(AnalysisError::Provider(ProviderError::EmptyResponse))
    );
}
