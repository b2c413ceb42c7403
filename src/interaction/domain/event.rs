//! Inbound interaction events delivered by the platform.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::{
    ExternalActorId, InteractionId, InteractionReply, InteractionResponder, ResponderError,
};

/// Platform actor who triggered an interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionActor {
    /// Platform-side identifier.
    pub external_id: ExternalActorId,
    /// Display name at the time of the interaction.
    pub display_name: String,
}

impl InteractionActor {
    /// Creates an actor descriptor.
    #[must_use]
    pub fn new(external_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            external_id: ExternalActorId::new(external_id),
            display_name: display_name.into(),
        }
    }
}

/// Invocation of a command by name.
#[derive(Clone)]
pub struct CommandInvocation {
    /// Platform interaction identifier.
    pub interaction_id: InteractionId,
    /// Name of the invoked command as sent by the platform.
    pub command_name: String,
    /// Option values supplied with the invocation.
    pub options: BTreeMap<String, Value>,
    /// Invoking actor.
    pub actor: InteractionActor,
    responder: Arc<dyn InteractionResponder>,
}

impl CommandInvocation {
    /// Creates a command invocation event.
    #[must_use]
    pub fn new(
        interaction_id: InteractionId,
        command_name: impl Into<String>,
        actor: InteractionActor,
        responder: Arc<dyn InteractionResponder>,
    ) -> Self {
        Self {
            interaction_id,
            command_name: command_name.into(),
            options: BTreeMap::new(),
            actor,
            responder,
        }
    }

    /// Adds an option value.
    #[must_use]
    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }

    /// Answers the interaction.
    ///
    /// # Errors
    ///
    /// Returns [`ResponderError`] when the platform rejects the reply.
    pub async fn respond(&self, reply: InteractionReply) -> Result<(), ResponderError> {
        self.responder.respond(reply).await
    }
}

impl fmt::Debug for CommandInvocation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("CommandInvocation")
            .field("interaction_id", &self.interaction_id)
            .field("command_name", &self.command_name)
            .field("options", &self.options)
            .field("actor", &self.actor)
            .finish_non_exhaustive()
    }
}

/// Click on an interactive button.
#[derive(Clone)]
pub struct ButtonClick {
    /// Platform interaction identifier.
    pub interaction_id: InteractionId,
    /// Raw token carried by the clicked button.
    pub token: String,
    /// Clicking actor.
    pub actor: InteractionActor,
    responder: Arc<dyn InteractionResponder>,
}

impl ButtonClick {
    /// Creates a button click event.
    #[must_use]
    pub fn new(
        interaction_id: InteractionId,
        token: impl Into<String>,
        actor: InteractionActor,
        responder: Arc<dyn InteractionResponder>,
    ) -> Self {
        Self {
            interaction_id,
            token: token.into(),
            actor,
            responder,
        }
    }

    /// Answers the interaction.
    ///
    /// # Errors
    ///
    /// Returns [`ResponderError`] when the platform rejects the reply.
    pub async fn respond(&self, reply: InteractionReply) -> Result<(), ResponderError> {
        self.responder.respond(reply).await
    }
}

impl fmt::Debug for ButtonClick {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ButtonClick")
            .field("interaction_id", &self.interaction_id)
            .field("token", &self.token)
            .field("actor", &self.actor)
            .finish_non_exhaustive()
    }
}

/// Inbound interaction, discriminated once at the dispatcher entry point.
#[derive(Debug, Clone)]
pub enum InteractionEvent {
    /// A command was invoked.
    Command(CommandInvocation),
    /// A button was clicked.
    Button(ButtonClick),
}

impl InteractionEvent {
    /// Returns the platform interaction identifier.
    #[must_use]
    pub const fn interaction_id(&self) -> &InteractionId {
        match self {
            Self::Command(invocation) => &invocation.interaction_id,
            Self::Button(click) => &click.interaction_id,
        }
    }
}

impl From<CommandInvocation> for InteractionEvent {
    fn from(invocation: CommandInvocation) -> Self {
        Self::Command(invocation)
    }
}

impl From<ButtonClick> for InteractionEvent {
    fn from(click: ButtonClick) -> Self {
        Self::Button(click)
    }
}
