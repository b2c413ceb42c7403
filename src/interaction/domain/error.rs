//! Error types for interaction domain validation.

use thiserror::Error;

/// Errors returned while constructing or mutating interaction domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InteractionDomainError {
    /// The command name is empty or blank.
    #[error("command name must not be empty")]
    EmptyCommandName,

    /// The command name contains characters outside `[a-z0-9_-]`, including
    /// uppercase letters and surrounding whitespace.
    #[error(
        "command name '{0}' contains invalid characters (only lowercase alphanumeric, '-' and '_' allowed)"
    )]
    InvalidCommandName(String),

    /// The command name exceeds the platform limit.
    #[error("command name exceeds 32 character limit: {0}")]
    CommandNameTooLong(String),

    /// A deployment target identifier is empty after trimming.
    #[error("deployment target identifier must not be empty")]
    EmptyTargetId,

    /// An option definition is invalid for the command schema.
    #[error("invalid option '{option}' on command '{command}': {reason}")]
    InvalidOption {
        /// Command name.
        command: String,
        /// Option name.
        option: String,
        /// Human-readable reason.
        reason: String,
    },

    /// A handler was already bound to the command.
    #[error("command '{0}' already has a handler bound")]
    CommandHandlerAlreadyBound(String),

    /// A handler was already bound to the button.
    #[error("button '{0}' already has a handler bound")]
    ButtonHandlerAlreadyBound(String),
}
