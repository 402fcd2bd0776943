//! Error types for Wishbot.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, WishbotError>;

#[derive(Debug, Error)]
pub enum WishbotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Roster error: {0}")]
    Roster(String),

    #[error("Channel error: {0}")]
    Channel(String),

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Channel '{0}' is not connected")]
    NotConnected(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
