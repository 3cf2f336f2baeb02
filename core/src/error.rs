/// Error types for the chat synchronization core
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FiresideError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Malformed document: {0}")]
    Decode(String),

    #[error("No such user: {0}")]
    RecipientUnknown(String),

    #[error("Invalid participant name: {0}")]
    InvalidName(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, FiresideError>;
