//! Identifier and validated-name types for interactions.

use super::InteractionDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Maximum length for a command name accepted by the remote platform.
const MAX_COMMAND_NAME_LENGTH: usize = 32;

/// Suffix appended to generated button tokens so they are recognisable in
/// platform payloads.
const BUTTON_TOKEN_SUFFIX: &str = "-ibtn";

/// Validated command name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandName(String);

impl CommandName {
    /// Creates a validated command name.
    ///
    /// The name is stored exactly as given and is the key lookups and inbound
    /// invocations must use, so only characters in `[a-z0-9_-]` are accepted.
    /// Names are never case-folded or trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`InteractionDomainError`] when validation fails.
    pub fn new(value: impl Into<String>) -> Result<Self, InteractionDomainError> {
        let name = value.into();

        if name.trim().is_empty() {
            return Err(InteractionDomainError::EmptyCommandName);
        }

        let is_valid = name.chars().all(|character| {
            character.is_ascii_lowercase()
                || character.is_ascii_digit()
                || character == '_'
                || character == '-'
        });
        if !is_valid {
            return Err(InteractionDomainError::InvalidCommandName(name));
        }

        if name.chars().count() > MAX_COMMAND_NAME_LENGTH {
            return Err(InteractionDomainError::CommandNameTooLong(name));
        }

        Ok(Self(name))
    }

    /// Returns the command name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CommandName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Identifier of a deployment target (for example a single guild) that a
/// scoped command is visible in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(String);

impl TargetId {
    /// Creates a deployment target identifier.
    ///
    /// # Errors
    ///
    /// Returns [`InteractionDomainError::EmptyTargetId`] when the trimmed
    /// value is empty.
    pub fn new(value: impl Into<String>) -> Result<Self, InteractionDomainError> {
        let trimmed = value.into().trim().to_owned();
        if trimmed.is_empty() {
            return Err(InteractionDomainError::EmptyTargetId);
        }
        Ok(Self(trimmed))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Opaque correlation token for an interactive button.
///
/// Tokens are only ever generated locally. Inbound clicks carry the raw
/// token string, which the registry matches by exact key lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ButtonToken(String);

impl ButtonToken {
    /// Generates a fresh random token.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("{}{BUTTON_TOKEN_SUFFIX}", Uuid::new_v4()))
    }

    /// Returns the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ButtonToken {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Platform-assigned identifier of one inbound interaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InteractionId(String);

impl InteractionId {
    /// Wraps a platform interaction identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InteractionId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Platform-side identifier of the actor who triggered an interaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalActorId(String);

impl ExternalActorId {
    /// Wraps a platform actor identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExternalActorId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Unique identifier for a local identity record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityId(Uuid);

impl IdentityId {
    /// Creates a new random identity identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for IdentityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for IdentityId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}
