use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The completion result's `Usage` entry exists but cannot be decoded.
    /// This signals an integration defect, not a response without usage data.
    #[error("Malformed usage metadata: {0}")]
    MalformedUsage(String),

    #[error("Unsupported token encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
