//! Declarative invocation schema for commands.
//!
//! The schema is only ever consumed by the remote platform; this crate
//! validates its shape and serialises it, nothing more.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use super::{CommandName, InteractionDomainError};

/// Value kind accepted by a command option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandOptionKind {
    /// Free-form string.
    String,
    /// Integer value.
    Integer,
    /// Boolean flag.
    Boolean,
    /// A platform user reference.
    User,
    /// A platform channel reference.
    Channel,
    /// A platform role reference.
    Role,
}

impl CommandOptionKind {
    /// Returns whether options of this kind may declare fixed choices.
    #[must_use]
    pub const fn supports_choices(self) -> bool {
        matches!(self, Self::String | Self::Integer)
    }
}

/// Fixed choice offered for a command option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionChoice {
    /// Label shown to the invoking actor.
    pub name: String,
    /// Value delivered with the invocation.
    pub value: Value,
}

impl OptionChoice {
    /// Creates a choice.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Parameter accepted by a command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandOption {
    /// Option name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Accepted value kind.
    #[serde(rename = "type")]
    pub kind: CommandOptionKind,
    /// Whether the option must be supplied.
    pub required: bool,
    /// Fixed choices, if any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<OptionChoice>,
}

impl CommandOption {
    /// Creates an option.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        kind: CommandOptionKind,
        required: bool,
    ) -> Self {
        Self {
            name: name.into().trim().to_ascii_lowercase(),
            description: description.into(),
            kind,
            required,
            choices: Vec::new(),
        }
    }

    /// Adds fixed choices.
    #[must_use]
    pub fn with_choices(mut self, choices: impl IntoIterator<Item = OptionChoice>) -> Self {
        self.choices.extend(choices);
        self
    }
}

/// Invocation shape of a command: its description and ordered options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandSchema {
    /// Human-readable description.
    pub description: String,
    /// Ordered options.
    #[serde(default)]
    pub options: Vec<CommandOption>,
}

#[derive(Serialize)]
struct CommandPayload<'a> {
    name: &'a str,
    description: &'a str,
    options: &'a [CommandOption],
}

impl CommandSchema {
    /// Creates a schema with a description and no options.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            options: Vec::new(),
        }
    }

    /// Appends an option.
    #[must_use]
    pub fn with_option(mut self, option: CommandOption) -> Self {
        self.options.push(option);
        self
    }

    /// Checks option names are unique and choices are only declared on
    /// kinds that accept them.
    ///
    /// # Errors
    ///
    /// Returns [`InteractionDomainError::InvalidOption`] for the first
    /// offending option.
    pub fn validate(&self, command: &CommandName) -> Result<(), InteractionDomainError> {
        let mut seen = HashSet::new();
        for option in &self.options {
            let reason = if option.name.is_empty() {
                Some("option name must not be empty")
            } else if !seen.insert(option.name.as_str()) {
                Some("duplicate option name")
            } else if !option.choices.is_empty() && !option.kind.supports_choices() {
                Some("choices are only allowed on string and integer options")
            } else {
                None
            };

            if let Some(message) = reason {
                return Err(InteractionDomainError::InvalidOption {
                    command: command.as_str().to_owned(),
                    option: option.name.clone(),
                    reason: message.to_owned(),
                });
            }
        }
        Ok(())
    }

    /// Serialises the schema together with the command name into the
    /// payload sent to the remote platform.
    #[must_use]
    pub fn to_payload(&self, command: &CommandName) -> Value {
        let payload = CommandPayload {
            name: command.as_str(),
            description: &self.description,
            options: &self.options,
        };
        // Every field is a string, bool, or JSON value, so serialisation
        // cannot fail.
        serde_json::to_value(payload).unwrap_or(Value::Null)
    }
}
