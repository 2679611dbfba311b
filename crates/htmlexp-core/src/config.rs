use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does not read `.env` files; the caller
/// manages the environment.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, default);
        match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" => Ok(false),
            _ => Err(invalid(var, format!("expected a boolean, got '{raw}'"))),
        }
    };

    let targets_path = PathBuf::from(or_default("HTMLEXP_TARGETS_PATH", "./config/targets.yaml"));
    let log_level = or_default("HTMLEXP_LOG_LEVEL", "info");

    // Unset and "0" both mean "no timeout".
    let request_timeout_secs = match lookup("HTMLEXP_REQUEST_TIMEOUT_SECS") {
        Ok(raw) => {
            let secs = raw
                .parse::<u64>()
                .map_err(|e| invalid("HTMLEXP_REQUEST_TIMEOUT_SECS", e.to_string()))?;
            (secs > 0).then_some(secs)
        }
        Err(_) => None,
    };

    let headless_timeout_secs = parse_u64("HTMLEXP_HEADLESS_TIMEOUT_SECS", "15")?;
    if headless_timeout_secs == 0 {
        return Err(invalid(
            "HTMLEXP_HEADLESS_TIMEOUT_SECS",
            "must be greater than zero".to_string(),
        ));
    }

    let headless_settle_ms = parse_u64("HTMLEXP_HEADLESS_SETTLE_MS", "10000")?;
    if headless_settle_ms >= headless_timeout_secs.saturating_mul(1000) {
        return Err(invalid(
            "HTMLEXP_HEADLESS_SETTLE_MS",
            format!(
                "settle delay of {headless_settle_ms}ms must be shorter than the {headless_timeout_secs}s headless timeout"
            ),
        ));
    }

    let headless_wait_for_selector = parse_bool("HTMLEXP_HEADLESS_WAIT_FOR_SELECTOR", "false")?;
    let chrome_path = lookup("HTMLEXP_CHROME_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);
    let max_concurrent_targets = parse_usize("HTMLEXP_MAX_CONCURRENT_TARGETS", "4")?.max(1);

    Ok(AppConfig {
        targets_path,
        log_level,
        request_timeout_secs,
        headless_timeout_secs,
        headless_settle_ms,
        headless_wait_for_selector,
        chrome_path,
        max_concurrent_targets,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
