use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating a [`FetchConfig`](crate::FetchConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config from {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}
