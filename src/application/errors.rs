//! Application layer errors

use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Telegram API error: {0}")]
    Api(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Command execution errors
#[derive(Error, Debug)]
pub enum CommandError {
    /// Wrong argument count or shape; carries the full reply text
    #[error("{0}")]
    Usage(String),

    /// Argument outside the accepted set; carries the full reply text
    #[error("{0}")]
    InvalidChoice(&'static str),

    #[error("Invalid user id: {0}")]
    MalformedIdentity(String),

    #[error("Permission denied")]
    PermissionDenied,

    #[error("{0}")]
    NotFound(String),

    /// The in-memory change was applied but could not be written out
    #[error("Failed to save changes: {0}")]
    Persistence(#[from] StorageError),
}

impl CommandError {
    /// Outcome label recorded in the audit log
    pub fn outcome(&self) -> &'static str {
        match self {
            CommandError::Usage(_)
            | CommandError::InvalidChoice(_)
            | CommandError::MalformedIdentity(_) => "usage",
            CommandError::PermissionDenied => "denied",
            CommandError::NotFound(_) => "not_found",
            CommandError::Persistence(_) => "persist_failed",
        }
    }
}

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error in {collection}: {message}")]
    Serialization { collection: String, message: String },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
