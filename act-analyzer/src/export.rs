use act_analyzer_core::report::FinalReport;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;

/// Writes the report as pretty-printed JSON, replacing any existing file.
pub fn export_report(report: &FinalReport, path: &Path) -> Result<()> {
    let json = report
        .to_json_pretty()
        .context("Failed to serialize final report")?;
    fs::write(path, json).with_context(|| format!("Failed to write report to {path:?}"))?;
    info!(path = ?path, rule_checks = report.rule_checks.len(), "[EXPORT] Report written");
    Ok(())
}
