//! Handler contracts bound to commands and buttons.

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

use super::{ActorIdentity, ButtonClick, CommandInvocation, ResponderError};

/// Result type returned by interaction handlers.
pub type HandlerResult = Result<(), HandlerError>;

/// Errors returned by interaction handlers.
#[derive(Debug, Clone, Error)]
pub enum HandlerError {
    /// The handler rejected the interaction with a message.
    #[error("{0}")]
    Rejected(String),

    /// Replying to the interaction failed.
    #[error(transparent)]
    Reply(#[from] ResponderError),

    /// The handler failed with an underlying error.
    #[error("handler failed: {0}")]
    Failed(Arc<dyn std::error::Error + Send + Sync>),
}

impl HandlerError {
    /// Creates a rejection with a message.
    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }

    /// Wraps an underlying handler failure.
    pub fn failed(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Failed(Arc::new(err))
    }
}

/// Handler invoked when a registered command is executed.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Executes the command for the resolved actor identity.
    async fn execute(&self, invocation: &CommandInvocation, identity: &ActorIdentity)
    -> HandlerResult;
}

/// Handler invoked when a registered button is clicked.
#[async_trait]
pub trait ButtonHandler: Send + Sync {
    /// Handles the click.
    async fn click(&self, click: &ButtonClick) -> HandlerResult;
}

/// Adapts an async closure into a [`CommandHandler`].
///
/// ```
/// use switchboard::interaction::domain::{CommandHandlerFn, HandlerError, InteractionReply};
///
/// let handler = CommandHandlerFn::new(|invocation, _identity| async move {
///     invocation
///         .respond(InteractionReply::public("pong"))
///         .await
///         .map_err(HandlerError::from)
/// });
/// # let _ = handler;
/// ```
pub struct CommandHandlerFn<F>(F);

impl<F, Fut> CommandHandlerFn<F>
where
    F: Fn(CommandInvocation, ActorIdentity) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    /// Wraps the closure.
    #[must_use]
    pub const fn new(callback: F) -> Self {
        Self(callback)
    }
}

#[async_trait]
impl<F, Fut> CommandHandler for CommandHandlerFn<F>
where
    F: Fn(CommandInvocation, ActorIdentity) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    async fn execute(
        &self,
        invocation: &CommandInvocation,
        identity: &ActorIdentity,
    ) -> HandlerResult {
        (self.0)(invocation.clone(), identity.clone()).await
    }
}

/// Adapts an async closure into a [`ButtonHandler`].
pub struct ButtonHandlerFn<F>(F);

impl<F, Fut> ButtonHandlerFn<F>
where
    F: Fn(ButtonClick) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    /// Wraps the closure.
    #[must_use]
    pub const fn new(callback: F) -> Self {
        Self(callback)
    }
}

#[async_trait]
impl<F, Fut> ButtonHandler for ButtonHandlerFn<F>
where
    F: Fn(ButtonClick) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    async fn click(&self, click: &ButtonClick) -> HandlerResult {
        (self.0)(click.clone()).await
    }
}
