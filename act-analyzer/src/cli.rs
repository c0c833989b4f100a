/// # act-analyzer CLI Interface (Module)
///
/// Command parsing, input loading and orchestration for the `act-analyzer`
/// binary. All analysis logic (extraction, prompts, validation, report
/// aggregation) lives in the [`act-analyzer-core`] crate; this module only
/// wires the OpenAI-compatible client into a [`Session`] and prints results.
///
/// ## How To Use
/// - For command-line users: run the installed `act-analyzer` binary with `--help`.
/// - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
///
/// Failed tasks never abort a run. Their notices go to stderr as `[ERROR] ...`
/// and the remaining tasks continue.
///
/// [`act-analyzer-core`]: ../../act-analyzer-core/
use crate::export::export_report;
use crate::load_config::{load_config_or_default, CliConfig};
use crate::provider::OpenAiClient;
use crate::render;
use act_analyzer_core::invoker::Analyzer;
use act_analyzer_core::prompts::AnalysisTask;
use act_analyzer_core::session::{AnalysisOutcome, Session};
use act_analyzer_core::source::{extract, DocumentText, TextSource};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;

/// CLI for act-analyzer: summarize legislative acts, extract key sections and check compliance rules.
#[derive(Debug, Parser)]
#[clap(
    name = "act-analyzer",
    version,
    about = "Analyze legislative acts with an LLM: summary, key sections and compliance rule checks"
)]
pub struct Cli {
    /// Path to an optional YAML config file
    #[clap(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// LLM provider API key
    #[clap(long, global = true, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Extract the document text and print a preview with the character count
    Extract {
        #[clap(flatten)]
        input: InputArgs,
    },
    /// Generate a bullet-point summary of the act
    Summarize {
        #[clap(flatten)]
        input: InputArgs,
    },
    /// Extract the seven key legislative sections
    Sections {
        #[clap(flatten)]
        input: InputArgs,
    },
    /// Check the act against the six compliance rules
    Rules {
        #[clap(flatten)]
        input: InputArgs,
    },
    /// Run every analysis in sequence and export the final JSON report
    Run {
        #[clap(flatten)]
        input: InputArgs,

        /// Where to write the report (defaults to `report.output_path` from the config)
        #[clap(long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

/// Exactly one document source.
#[derive(Debug, Clone, Default, Args)]
#[group(required = true, multiple = false)]
pub struct InputArgs {
    /// Read a PDF file
    #[clap(long, value_name = "PATH")]
    pub pdf: Option<PathBuf>,

    /// Read a UTF-8 text file as pasted text
    #[clap(long, value_name = "PATH")]
    pub text: Option<PathBuf>,

    /// Read pasted text from standard input
    #[clap(long)]
    pub stdin: bool,
}

impl InputArgs {
    pub fn pdf(path: impl Into<PathBuf>) -> Self {
        InputArgs {
            pdf: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn text(path: impl Into<PathBuf>) -> Self {
        InputArgs {
            text: Some(path.into()),
            ..Self::default()
        }
    }
}

/// Reads the selected input and extracts its text.
pub fn read_document(input: &InputArgs) -> Result<DocumentText> {
    let source = if let Some(path) = &input.pdf {
        let bytes = std::fs::read(path).with_context(|| format!("Failed to read PDF {path:?}"))?;
        TextSource::Pdf(bytes)
    } else if let Some(path) = &input.text {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read text file {path:?}"))?;
        TextSource::Pasted(text)
    } else if input.stdin {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read text from stdin")?;
        TextSource::Pasted(text)
    } else {
        anyhow::bail!("No input given; use --pdf, --text or --stdin");
    };

    let document = extract(source).map_err(|e| {
        tracing::error!(error = %e, "Text extraction failed");
        anyhow::Error::new(e)
    })?;
    tracing::info!(chars = document.char_count(), "Document loaded");
    Ok(document)
}

/// The key must be present and non-empty before any provider command does work.
pub fn require_api_key(api_key: Option<&str>) -> Result<String> {
    match api_key.map(str::trim) {
        Some(key) if !key.is_empty() => Ok(key.to_string()),
        _ => {
            tracing::error!("OpenAI API key missing");
            Err(anyhow::anyhow!(
                "OpenAI API key missing; pass --api-key or set OPENAI_API_KEY"
            ))
        }
    }
}

fn build_analyzer(config: &CliConfig, api_key: Option<&str>) -> Result<Analyzer<OpenAiClient>> {
    let key = require_api_key(api_key)?;
    let client = OpenAiClient::new(&config.provider, key)?;
    Ok(Analyzer::new(client))
}

fn print_outcome(outcome: &AnalysisOutcome) {
    if let Some(notice) = outcome.result.notice() {
        eprintln!("{}", render::render_notice(notice));
    }
    if let Some(body) = render::render_result(&outcome.result) {
        println!("{body}\n");
    }
}

async fn run_task(
    task: AnalysisTask,
    input: &InputArgs,
    config: &CliConfig,
    api_key: Option<&str>,
) -> Result<()> {
    let analyzer = build_analyzer(config, api_key)?;
    let mut session = Session::new();
    session.load_document(read_document(input)?);

    tracing::info!(command = task.label(), "Running single analysis");
    let outcome = session.run(task, &analyzer).await?;
    print_outcome(&outcome);
    Ok(())
}

async fn run_all(
    input: &InputArgs,
    output: Option<PathBuf>,
    config: &CliConfig,
    api_key: Option<&str>,
) -> Result<()> {
    let analyzer = build_analyzer(config, api_key)?;
    let mut session = Session::new();
    session.load_document(read_document(input)?);

    tracing::info!(command = "run", "Running all analyses");
    let outcomes = session
        .run_all(&analyzer, |progress| {
            println!("{}", render::render_progress(&progress))
        })
        .await?;
    println!();
    for outcome in &outcomes {
        print_outcome(outcome);
    }

    match session.assemble_report() {
        Ok(report) => {
            let path = output.unwrap_or_else(|| config.report.output_path.clone());
            export_report(&report, &path)?;
            println!("📥 Final report written to {}", path.display());
        }
        Err(unavailable) => {
            tracing::warn!(error = %unavailable, "Final report not exported");
            eprintln!("[ERROR] {unavailable}");
        }
    }
    Ok(())
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    let config = load_config_or_default(cli.config.as_deref())?;
    let api_key = cli.api_key.as_deref();

    match cli.command {
        Commands::Extract { input } => {
            let document = read_document(&input)?;
            println!("{}", render::render_preview(&document, render::PREVIEW_CHARS));
            Ok(())
        }
        Commands::Summarize { input } => {
            run_task(AnalysisTask::Summarize, &input, &config, api_key).await
        }
        Commands::Sections { input } => {
            run_task(AnalysisTask::ExtractSections, &input, &config, api_key).await
        }
        Commands::Rules { input } => {
            run_task(AnalysisTask::CheckRules, &input, &config, api_key).await
        }
        Commands::Run { input, output } => run_all(&input, output, &config, api_key).await,
    }
}
