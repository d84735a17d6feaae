use thiserror::Error;

/// Failures that can reach the caller of the relay.
///
/// The scoring pipeline itself never fails. These only come from the
/// outer boundary: reading the webhook body, loading configuration, or
/// building the HTTP client.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid config value for {key}: '{value}'")]
    InvalidConfig { key: &'static str, value: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, RelayError>;
