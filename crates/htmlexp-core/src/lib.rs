mod app_config;
mod config;
mod request;
mod targets;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use request::ScrapeRequest;
pub use targets::{load_targets, parse_targets, TargetConfig, TargetsFile};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read targets file {path}: {source}")]
    TargetsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse targets file: {0}")]
    TargetsFileParse(#[from] serde_yaml::Error),

    #[error("target validation failed: {0}")]
    Validation(String),
}
