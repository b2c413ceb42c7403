//! Interactive button definition.

use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use super::{ButtonClick, ButtonHandler, ButtonToken, InteractionDomainError, InteractionId};

/// Registered button correlated to inbound clicks by its generated token.
pub struct ButtonDefinition {
    token: ButtonToken,
    handler: OnceLock<Arc<dyn ButtonHandler>>,
    last_interaction: Mutex<Option<ButtonClick>>,
}

impl ButtonDefinition {
    /// Creates a button with the given token.
    #[must_use]
    pub const fn new(token: ButtonToken) -> Self {
        Self {
            token,
            handler: OnceLock::new(),
            last_interaction: Mutex::new(None),
        }
    }

    /// Returns the correlation token to embed in the rendered button.
    #[must_use]
    pub const fn token(&self) -> &ButtonToken {
        &self.token
    }

    /// Binds the handler invoked on click.
    ///
    /// # Errors
    ///
    /// Returns [`InteractionDomainError::ButtonHandlerAlreadyBound`] when a
    /// handler is already bound.
    pub fn bind_handler(&self, handler: Arc<dyn ButtonHandler>) -> Result<(), InteractionDomainError> {
        self.handler.set(handler).map_err(|_| {
            InteractionDomainError::ButtonHandlerAlreadyBound(self.token.as_str().to_owned())
        })
    }

    /// Returns the bound handler, if any.
    #[must_use]
    pub fn handler(&self) -> Option<Arc<dyn ButtonHandler>> {
        self.handler.get().cloned()
    }

    /// Returns the click currently being handled, if any.
    ///
    /// Concurrent clicks on the same button overwrite each other here.
    #[must_use]
    pub fn last_interaction(&self) -> Option<ButtonClick> {
        self.last_interaction
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn begin_interaction(&self, click: &ButtonClick) {
        *self
            .last_interaction
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(click.clone());
    }

    /// Clears the recorded click unless a newer one replaced it.
    pub(crate) fn end_interaction(&self, interaction_id: &InteractionId) {
        let mut last = self
            .last_interaction
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if last
            .as_ref()
            .is_some_and(|click| &click.interaction_id == interaction_id)
        {
            *last = None;
        }
    }
}

impl fmt::Debug for ButtonDefinition {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ButtonDefinition")
            .field("token", &self.token)
            .field("has_handler", &self.handler.get().is_some())
            .finish_non_exhaustive()
    }
}
