/// `load_config` module: loads the optional static YAML config into [`CliConfig`].
///
/// The file never carries secrets. The provider API key comes from `--api-key`
/// or the `OPENAI_API_KEY` environment variable and is handled in [`crate::cli`].
///
/// Every key has a default, so an absent file, an empty file, or a file that
/// sets only some keys are all valid. Unknown keys are rejected so typos do not
/// silently fall back to defaults.
///
/// ```yaml
/// provider:
///   base_url: https://api.openai.com/v1
///   model: gpt-4o-mini
///   timeout_secs: 120
/// report:
///   output_path: act_analysis.json
/// ```
use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_OUTPUT_PATH: &str = "act_analysis.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub provider: ProviderSection,
    pub report: ReportSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderSection {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for ProviderSection {
    fn default() -> Self {
        ProviderSection {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportSection {
    pub output_path: PathBuf,
}

impl Default for ReportSection {
    fn default() -> Self {
        ReportSection {
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
        }
    }
}

/// Loads a static YAML config file and validates it.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    if config_content.trim().is_empty() {
        info!(config_path = ?path_ref, "Config file is empty, using defaults");
        return Ok(CliConfig::default());
    }

    let config: CliConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    validate(&config)?;
    Ok(config)
}

/// Loads the file when a path is given, otherwise returns the defaults.
pub fn load_config_or_default(path: Option<&Path>) -> Result<CliConfig> {
    match path {
        Some(path) => load_config(path),
        None => {
            info!("No config file given, using defaults");
            Ok(CliConfig::default())
        }
    }
}

fn validate(config: &CliConfig) -> Result<()> {
    if config.provider.base_url.trim().is_empty() {
        anyhow::bail!("Invalid config: provider.base_url must not be empty");
    }
    if config.provider.model.trim().is_empty() {
        anyhow::bail!("Invalid config: provider.model must not be empty");
    }
    if config.provider.timeout_secs == 0 {
        anyhow::bail!("Invalid config: provider.timeout_secs must be greater than zero");
    }
    if config.report.output_path.as_os_str().is_empty() {
        anyhow::bail!("Invalid config: report.output_path must not be empty");
    }
    Ok(())
}
