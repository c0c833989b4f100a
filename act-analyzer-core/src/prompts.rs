//! Prompt and schema library for the three analysis tasks.
//!
//! Pure data, no I/O. Every template embeds the document text cut to the
//! first [`MAX_INPUT_CHARS`] characters; the cut is silent and identical for
//! all tasks.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::contract::{CompletionRequest, ResponseSchema};
use crate::source::DocumentText;

/// Characters of document text sent with each request.
pub const MAX_INPUT_CHARS: usize = 15_000;

/// The six compliance rules, in check order.
pub const RULES: [&str; 6] = [
    "Act must define key terms",
    "Act must specify eligibility criteria",
    "Act must specify responsibilities of the administering authority",
    "Act must include enforcement or penalties",
    "Act must include payment calculation or entitlement structure",
    "Act must include record-keeping or reporting requirements",
];

pub const SUMMARY_TEMPERATURE: f64 = 0.3;
pub const STRUCTURED_TEMPERATURE: f64 = 0.2;

const ANALYST_SYSTEM: &str = "You are a legal document analyst. Provide clear, concise summaries of legislative documents.";
const SECTIONS_SYSTEM: &str = "You are a legal document analyst. Extract structured information and return ONLY valid JSON matching the exact schema.";
const RULES_SYSTEM: &str = "You are a legal compliance checker. Analyze documents and return structured rule checks in JSON format matching the exact schema.";

/// `(key, description)` for every section the extraction asks for.
const SECTION_DESCRIPTIONS: [(&str, &str); 7] = [
    ("definitions", "Extract all key definitions and terms"),
    ("obligations", "Extract all obligations mentioned in the Act"),
    ("responsibilities", "Extract responsibilities of the administering authority"),
    ("eligibility", "Extract eligibility criteria"),
    ("payments", "Extract payment calculations, entitlements, and payment structures"),
    ("penalties", "Extract penalties and enforcement mechanisms"),
    ("record_keeping", "Extract record-keeping and reporting requirements"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisTask {
    Summarize,
    ExtractSections,
    CheckRules,
}

impl AnalysisTask {
    /// Run order for "all tasks".
    pub const ALL: [AnalysisTask; 3] = [
        AnalysisTask::Summarize,
        AnalysisTask::ExtractSections,
        AnalysisTask::CheckRules,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AnalysisTask::Summarize => "summary",
            AnalysisTask::ExtractSections => "sections",
            AnalysisTask::CheckRules => "rule checks",
        }
    }

    /// Status line shown while the task runs.
    pub fn progress_message(&self) -> &'static str {
        match self {
            AnalysisTask::Summarize => "Task 2: Summarizing Act...",
            AnalysisTask::ExtractSections => "Task 3: Extracting legislative sections...",
            AnalysisTask::CheckRules => "Task 4: Checking compliance rules...",
        }
    }

    pub fn system_prompt(&self) -> &'static str {
        match self {
            AnalysisTask::Summarize => ANALYST_SYSTEM,
            AnalysisTask::ExtractSections => SECTIONS_SYSTEM,
            AnalysisTask::CheckRules => RULES_SYSTEM,
        }
    }

    pub fn temperature(&self) -> f64 {
        match self {
            AnalysisTask::Summarize => SUMMARY_TEMPERATURE,
            AnalysisTask::ExtractSections | AnalysisTask::CheckRules => STRUCTURED_TEMPERATURE,
        }
    }

    /// Output schema for structured tasks; `None` for the free-text summary.
    pub fn schema(&self) -> Option<ResponseSchema> {
        match self {
            AnalysisTask::Summarize => None,
            AnalysisTask::ExtractSections => Some(ResponseSchema {
                name: "legislative_sections",
                schema: sections_schema(),
            }),
            AnalysisTask::CheckRules => Some(ResponseSchema {
                name: "rule_checks",
                schema: rule_checks_schema(),
            }),
        }
    }

    /// User instruction with the (truncated) act text embedded.
    pub fn instruction(&self, text: &DocumentText) -> String {
        let act = text.truncated(MAX_INPUT_CHARS);
        match self {
            AnalysisTask::Summarize => format!(
                "Summarize the following Act in 5-10 bullet points focusing on:\n\
                 - Purpose\n\
                 - Key definitions\n\
                 - Eligibility\n\
                 - Obligations\n\
                 - Enforcement elements\n\
                 \n\
                 Act text:\n\
                 {act}\n\
                 \n\
                 Provide a clear, structured summary with bullet points."
            ),
            AnalysisTask::ExtractSections => {
                let listing = SECTION_DESCRIPTIONS
                    .iter()
                    .map(|(key, description)| format!("- {key}: {description}"))
                    .collect::<Vec<_>>()
                    .join("\n");
                format!(
                    "Extract the following key sections from the Act and return a valid JSON object:\n\
                     \n\
                     {listing}\n\
                     \n\
                     Act text:\n\
                     {act}\n\
                     \n\
                     Return ONLY the JSON object matching the required schema, no additional text."
                )
            }
            AnalysisTask::CheckRules => format!(
                "For each of the following rules, check if the Act satisfies it. For each rule, provide:\n\
                 1. status: \"pass\" or \"fail\"\n\
                 2. evidence: The specific section, clause, or text that supports your answer\n\
                 3. confidence: A number between 0-100 indicating your confidence level\n\
                 \n\
                 Rules to check:\n\
                 {rules}\n\
                 \n\
                 Act text:\n\
                 {act}\n\
                 \n\
                 Return a JSON object with a \"rules\" key containing an array with the exact structure specified in the schema.",
                rules = numbered_rules()
            ),
        }
    }

    /// Full provider request for this task.
    pub fn build_request(&self, text: &DocumentText) -> CompletionRequest {
        CompletionRequest {
            task: *self,
            system: self.system_prompt().to_string(),
            user: self.instruction(text),
            temperature: self.temperature(),
            schema: self.schema(),
        }
    }
}

impl std::fmt::Display for AnalysisTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// `1. <rule>` lines, one per rule.
pub fn numbered_rules() -> String {
    RULES
        .iter()
        .enumerate()
        .map(|(i, rule)| format!("{}. {}", i + 1, rule))
        .collect::<Vec<_>>()
        .join("\n")
}

fn sections_schema() -> Value {
    let mut properties = serde_json::Map::new();
    for (key, description) in SECTION_DESCRIPTIONS {
        properties.insert(
            key.to_string(),
            json!({ "type": "string", "description": description }),
        );
    }
    let required: Vec<&str> = SECTION_DESCRIPTIONS.iter().map(|(key, _)| *key).collect();
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false
    })
}

fn rule_checks_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "rules": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "rule": {
                            "type": "string",
                            "description": "The rule being checked"
                        },
                        "status": {
                            "type": "string",
                            "enum": ["pass", "fail"],
                            "description": "Whether the rule passes or fails"
                        },
                        "evidence": {
                            "type": "string",
                            "description": "The specific section, clause, or text that supports the answer"
                        },
                        "confidence": {
                            "type": "integer",
                            "minimum": 0,
                            "maximum": 100,
                            "description": "Confidence level between 0-100"
                        }
                    },
                    "required": ["rule", "status", "evidence", "confidence"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["rules"],
        "additionalProperties": false
    })
}
