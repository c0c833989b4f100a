//! Session state and report aggregation.
//!
//! A [`Session`] holds the current document and the three derived artifacts.
//! Loading a new document clears every artifact in the same call and bumps the
//! document generation; outcomes computed for an older generation are refused
//! by [`Session::store`], so a report never mixes documents.
//!
//! Field transitions:
//! - summary / sections: set on success, left untouched on failure;
//! - rule checks: always set, with sentinel placeholders on failure;
//! - all fields: cleared by [`Session::reset`] and [`Session::load_document`].

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::contract::LlmProvider;
use crate::error::AnalysisError;
use crate::invoker::{Analyzer, Reported};
use crate::prompts::AnalysisTask;
use crate::report::{FinalReport, ReportUnavailable, RuleCheck, SectionBundle};
use crate::source::DocumentText;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("No document loaded; upload a PDF or paste text first")]
    NoDocument,

    #[error("Outcome belongs to document generation {outcome}, current generation is {current}")]
    StaleOutcome { outcome: u64, current: u64 },
}

/// Result of one task, always renderable.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskResult {
    Summary(Reported<String>),
    Sections(Reported<SectionBundle>),
    RuleChecks(Reported<Vec<RuleCheck>>),
}

impl TaskResult {
    pub fn task(&self) -> AnalysisTask {
        match self {
            TaskResult::Summary(_) => AnalysisTask::Summarize,
            TaskResult::Sections(_) => AnalysisTask::ExtractSections,
            TaskResult::RuleChecks(_) => AnalysisTask::CheckRules,
        }
    }

    pub fn notice(&self) -> Option<&AnalysisError> {
        match self {
            TaskResult::Summary(r) => r.notice.as_ref(),
            TaskResult::Sections(r) => r.notice.as_ref(),
            TaskResult::RuleChecks(r) => r.notice.as_ref(),
        }
    }
}

/// A task result tagged with the document generation it was computed for.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub generation: u64,
    pub result: TaskResult,
}

/// Progress event emitted by [`Session::run_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Task about to run; `None` once everything has finished.
    pub task: Option<AnalysisTask>,
    pub percent: u8,
    pub message: &'static str,
}

#[derive(Debug, Default)]
pub struct Session {
    document: Option<DocumentText>,
    generation: u64,
    summary: Option<String>,
    sections: Option<SectionBundle>,
    rule_checks: Option<Vec<RuleCheck>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the document, clearing every artifact derived from the previous one.
    pub fn load_document(&mut self, document: DocumentText) {
        self.reset();
        self.generation += 1;
        info!(
            generation = self.generation,
            chars = document.char_count(),
            "[SESSION] Loaded new document"
        );
        self.document = Some(document);
    }

    /// Clear the document and all artifacts.
    pub fn reset(&mut self) {
        debug!(generation = self.generation, "[SESSION] Resetting session state");
        self.document = None;
        self.summary = None;
        self.sections = None;
        self.rule_checks = None;
    }

    pub fn document(&self) -> Option<&DocumentText> {
        self.document.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn sections(&self) -> Option<&SectionBundle> {
        self.sections.as_ref()
    }

    pub fn rule_checks(&self) -> Option<&[RuleCheck]> {
        self.rule_checks.as_deref()
    }

    /// Compute one task for the current document without storing it.
    pub async fn analyze<P: LlmProvider>(
        &self,
        task: AnalysisTask,
        analyzer: &Analyzer<P>,
    ) -> Result<AnalysisOutcome, SessionError> {
        let document = self.document.as_ref().ok_or(SessionError::NoDocument)?;
        let result = match task {
            AnalysisTask::Summarize => {
                TaskResult::Summary(analyzer.summarize_or_report(document).await)
            }
            AnalysisTask::ExtractSections => {
                TaskResult::Sections(analyzer.extract_sections_or_report(document).await)
            }
            AnalysisTask::CheckRules => {
                TaskResult::RuleChecks(analyzer.check_rules_or_report(document).await)
            }
        };
        Ok(AnalysisOutcome {
            generation: self.generation,
            result,
        })
    }

    /// Apply an outcome computed earlier. Outcomes for a replaced document are refused.
    pub fn store(&mut self, outcome: AnalysisOutcome) -> Result<(), SessionError> {
        if self.document.is_none() {
            return Err(SessionError::NoDocument);
        }
        if outcome.generation != self.generation {
            warn!(
                outcome = outcome.generation,
                current = self.generation,
                "[SESSION] Discarding outcome for a replaced document"
            );
            return Err(SessionError::StaleOutcome {
                outcome: outcome.generation,
                current: self.generation,
            });
        }

        match outcome.result {
            TaskResult::Summary(reported) => {
                if reported.is_ok() {
                    self.summary = Some(reported.value);
                }
            }
            TaskResult::Sections(reported) => {
                if reported.is_ok() {
                    self.sections = Some(reported.value);
                }
            }
            TaskResult::RuleChecks(reported) => {
                self.rule_checks = Some(reported.value);
            }
        }
        Ok(())
    }

    /// Analyze and store one task; returns the outcome for rendering.
    pub async fn run<P: LlmProvider>(
        &mut self,
        task: AnalysisTask,
        analyzer: &Analyzer<P>,
    ) -> Result<AnalysisOutcome, SessionError> {
        info!(task = %task, generation = self.generation, "[SESSION] Running task");
        let outcome = self.analyze(task, analyzer).await?;
        if let Some(notice) = outcome.result.notice() {
            warn!(task = %task, error = %notice, "[SESSION] Task finished with a notice");
        }
        self.store(outcome.clone())?;
        Ok(outcome)
    }

    /// Run all three tasks strictly in sequence, reporting progress before each.
    pub async fn run_all<P, F>(
        &mut self,
        analyzer: &Analyzer<P>,
        mut on_progress: F,
    ) -> Result<Vec<AnalysisOutcome>, SessionError>
    where
        P: LlmProvider,
        F: FnMut(Progress),
    {
        if self.document.is_none() {
            return Err(SessionError::NoDocument);
        }

        let total = AnalysisTask::ALL.len();
        let mut outcomes = Vec::with_capacity(total);
        for (step, task) in AnalysisTask::ALL.into_iter().enumerate() {
            on_progress(Progress {
                task: Some(task),
                percent: (25 * (step + 1)) as u8,
                message: task.progress_message(),
            });
            outcomes.push(self.run(task, analyzer).await?);
        }
        on_progress(Progress {
            task: None,
            percent: 100,
            message: "All tasks completed!",
        });
        info!(tasks = total, "[SESSION] All tasks completed");
        Ok(outcomes)
    }

    /// Combine the three artifacts, or say which are still missing.
    pub fn assemble_report(&self) -> Result<FinalReport, ReportUnavailable> {
        match (&self.summary, &self.sections, &self.rule_checks) {
            (Some(summary), Some(sections), Some(rule_checks)) => Ok(FinalReport {
                summary: summary.clone(),
                sections: sections.clone(),
                rule_checks: rule_checks.clone(),
            }),
            _ => {
                let missing = AnalysisTask::ALL
                    .into_iter()
                    .filter(|task| match task {
                        AnalysisTask::Summarize => self.summary.is_none(),
                        AnalysisTask::ExtractSections => self.sections.is_none(),
                        AnalysisTask::CheckRules => self.rule_checks.is_none(),
                    })
                    .collect();
                Err(ReportUnavailable { missing })
            }
        }
    }
}
