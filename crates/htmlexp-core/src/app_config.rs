use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub targets_path: PathBuf,
    pub log_level: String,
    /// `None` disables the direct-mode request timeout.
    pub request_timeout_secs: Option<u64>,
    pub headless_timeout_secs: u64,
    pub headless_settle_ms: u64,
    pub headless_wait_for_selector: bool,
    pub chrome_path: Option<PathBuf>,
    pub max_concurrent_targets: usize,
}
