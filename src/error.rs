use thiserror::Error;

/// Problems that prevent a session from being created at all.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("word catalog is empty")]
    EmptyCatalog,

    #[error("sequence length must be at least one word")]
    ZeroSequenceLength,

    #[error("session duration must be at least one second")]
    ZeroSessionDuration,

    #[error("refill poll interval must be at least one second")]
    ZeroRefillInterval,

    #[error("word catalog `{0}` not found")]
    CatalogNotFound(String),

    #[error("word catalog is not valid json: {0}")]
    CatalogFormat(#[from] serde_json::Error),
}
