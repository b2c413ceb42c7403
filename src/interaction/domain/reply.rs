//! Replies sent back to the platform in answer to an interaction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Reply content for an interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionReply {
    /// Message text.
    pub content: String,
    /// Whether only the invoking actor can see the reply.
    pub ephemeral: bool,
}

impl InteractionReply {
    /// Creates a reply visible to everyone in the channel.
    #[must_use]
    pub fn public(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: false,
        }
    }

    /// Creates a reply visible only to the invoking actor.
    #[must_use]
    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: true,
        }
    }
}

/// Channel back to the platform for one interaction.
#[async_trait]
pub trait InteractionResponder: Send + Sync {
    /// Sends a reply for the interaction.
    async fn respond(&self, reply: InteractionReply) -> Result<(), ResponderError>;
}

/// Errors returned when a reply cannot be delivered.
#[derive(Debug, Clone, Error)]
pub enum ResponderError {
    /// The interaction was already answered.
    #[error("interaction has already been answered")]
    AlreadyAnswered,

    /// Delivery failed.
    #[error("reply delivery failed: {0}")]
    Delivery(Arc<dyn std::error::Error + Send + Sync>),
}

impl ResponderError {
    /// Wraps a delivery failure.
    pub fn delivery(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Delivery(Arc::new(err))
    }
}
