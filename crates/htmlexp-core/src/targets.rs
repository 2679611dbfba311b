use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::request::ScrapeRequest;
use crate::ConfigError;

static METRIC_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z_:][a-zA-Z0-9_:]*$").expect("valid regex"));

/// A named scrape target; `name` doubles as the gauge name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetConfig {
    pub name: String,
    pub help: Option<String>,
    #[serde(flatten)]
    pub request: ScrapeRequest,
}

#[derive(Debug, Deserialize)]
pub struct TargetsFile {
    pub targets: Vec<TargetConfig>,
}

/// Load and validate the scrape targets from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_targets(path: &Path) -> Result<TargetsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::TargetsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_targets(&content)
}

/// Parse and validate targets from YAML text.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_targets(content: &str) -> Result<TargetsFile, ConfigError> {
    let targets_file: TargetsFile = serde_yaml::from_str(content)?;
    validate_targets(&targets_file)?;
    Ok(targets_file)
}

fn validate_targets(targets_file: &TargetsFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();

    for target in &targets_file.targets {
        if !METRIC_NAME_RE.is_match(&target.name) {
            return Err(ConfigError::Validation(format!(
                "target name '{}' is not a valid metric name",
                target.name
            )));
        }

        if !seen_names.insert(target.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate target name: '{}'",
                target.name
            )));
        }

        let request = &target.request;
        if !(request.address.starts_with("http://") || request.address.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "target '{}' has address '{}'; must start with http:// or https://",
                target.name, request.address
            )));
        }

        if request.selector.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "target '{}' has an empty selector",
                target.name
            )));
        }

        if request.decimal_point_separator.is_empty() {
            return Err(ConfigError::Validation(format!(
                "target '{}' has an empty decimal point separator",
                target.name
            )));
        }

        if request.thousands_separator == request.decimal_point_separator {
            return Err(ConfigError::Validation(format!(
                "target '{}' uses '{}' as both thousands and decimal separator",
                target.name, request.decimal_point_separator
            )));
        }
    }

    Ok(())
}
