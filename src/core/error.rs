use thiserror::Error;

#[derive(Error, Debug)]
pub enum UuidError {
    #[error("Format error: {0}")]
    FormatError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unsupported UUID version: {0}")]
    UnsupportedVersion(u8),

    #[error("UUID generation error: {0}")]
    GenerationError(String),

    #[error("Lock error: {0}")]
    LockError(String),
}

pub type Result<T> = std::result::Result<T, UuidError>;


impl<T> From<std::sync::PoisonError<T>> for UuidError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockError(err.to_string())
    }
}

impl From<serde_json::Error> for UuidError {
    fn from(err: serde_json::Error) -> Self {
        Self::ConfigError(err.to_string())
    }
}
