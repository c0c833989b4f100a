//! Terminal rendering of documents, task results and progress.
//!
//! Every function returns a `String` so the CLI decides where it goes (stdout
//! for results, stderr for notices).

use act_analyzer_core::error::AnalysisError;
use act_analyzer_core::report::{RuleCheck, RuleStatus, SectionBundle};
use act_analyzer_core::session::{Progress, TaskResult};
use act_analyzer_core::source::DocumentText;
use std::fmt::Write;

/// Characters of document text shown by `extract`.
pub const PREVIEW_CHARS: usize = 1_000;

pub const NOT_FOUND: &str = "Not found";

pub fn render_preview(document: &DocumentText, max_chars: usize) -> String {
    format!(
        "📋 Extracted Text Preview\n{}\n\nTotal characters: {}",
        document.preview(max_chars),
        document.char_count()
    )
}

pub fn render_summary(summary: &str) -> String {
    format!("📊 Summary\n{summary}")
}

pub fn render_sections(sections: &SectionBundle) -> String {
    let mut out = String::from("🔎 Key Legislative Sections");
    for (_, title, value) in sections.entries() {
        let value = if value.trim().is_empty() { NOT_FOUND } else { value };
        let _ = write!(out, "\n\n## {title}\n{value}");
    }
    out
}

/// Header line of one rule check: `✅ Rule 1: <rule> (Confidence: 90%)`.
pub fn rule_heading(index: usize, check: &RuleCheck) -> String {
    let emoji = if check.status == RuleStatus::Pass {
        "✅"
    } else {
        "❌"
    };
    format!(
        "{emoji} Rule {}: {} (Confidence: {}%)",
        index + 1,
        check.rule,
        check.confidence
    )
}

pub fn render_rule_checks(checks: &[RuleCheck]) -> String {
    let mut out = String::from("✅ Rule Checks");
    for (i, check) in checks.iter().enumerate() {
        let _ = write!(
            out,
            "\n\n{}\n  Status: {}\n  Evidence: {}\n  Confidence: {}%",
            rule_heading(i, check),
            check.status,
            check.evidence,
            check.confidence
        );
    }
    out
}

pub fn render_notice(notice: &AnalysisError) -> String {
    format!("[ERROR] {notice}")
}

pub fn render_progress(progress: &Progress) -> String {
    if progress.task.is_none() {
        format!("[{:>3}%] ✅ {}", progress.percent, progress.message)
    } else {
        format!("[{:>3}%] {}", progress.percent, progress.message)
    }
}

/// Body of a task result. Failed summaries and failed bundles render nothing;
/// rule checks always render, sentinels included.
pub fn render_result(result: &TaskResult) -> Option<String> {
    match result {
        TaskResult::Summary(reported) if !reported.value.is_empty() => {
            Some(render_summary(&reported.value))
        }
        TaskResult::Sections(reported) if reported.is_ok() => {
            Some(render_sections(&reported.value))
        }
        TaskResult::RuleChecks(reported) => Some(render_rule_checks(&reported.value)),
        _ => None,
    }
}
