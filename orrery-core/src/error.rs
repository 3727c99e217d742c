//! Error types for the orrery core library.

use thiserror::Error;

/// Top-level error type for all orrery operations.
#[derive(Error, Debug)]
pub enum OrreryError {
    /// A conversation record was not found in the store.
    #[error("Conversation not found: {0}")]
    ConversationNotFound(crate::ConversationId),

    /// A trait configuration document failed validation.
    #[error("Invalid trait config for '{trait_name}': {reason}")]
    InvalidTraitConfig {
        /// Which trait is misconfigured.
        trait_name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A collaborator (classifier, generator, detector, rewriter) failed.
    ///
    /// Callers degrade on this per the collaborator contracts: neutral
    /// sentiment, no event, or prior state kept. It never reaches the user.
    #[error("Collaborator call failed: {0}")]
    Collaborator(String),

    /// Structured collaborator output failed validation.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Serialization or deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// SQLite persistence error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, OrreryError>;
