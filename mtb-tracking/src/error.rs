use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("answer sink rejected payload: {0}")]
    Rejected(String),

    #[error("failed to encode answer payload: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ProvenanceError {
    #[error("provenance store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("persist interval must be greater than zero")]
    ZeroPersistInterval,

    #[error("badge scale must be a positive finite number, got {0}")]
    InvalidBadgeScale(f64),

    #[error("invalid tracking config: {0}")]
    Parse(#[from] serde_json::Error),
}
