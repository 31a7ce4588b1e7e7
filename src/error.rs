// Error types shared across layers
use crate::domain::quantity::ConversionError;
use thiserror::Error;

/// Missing credentials, detected when a cloud client is built
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SigningConfigurationError {
    #[error("API key is missing")]
    MissingApiKey,

    #[error("API secret is missing")]
    MissingApiSecret,
}

/// Network or HTTP failure reported by the transport
#[derive(Debug, Error)]
#[error("request to {uri} failed: {source}")]
pub struct TransportError {
    pub uri: String,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

impl TransportError {
    pub fn new(uri: impl Into<String>, source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self {
            uri: uri.into(),
            source: source.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    SigningConfiguration(#[from] SigningConfigurationError),

    #[error("local API request failed: {0}")]
    LocalApiRequest(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error(transparent)]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;
