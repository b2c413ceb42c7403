//! Recording responder for tests and local flows.

use crate::interaction::domain::{InteractionReply, InteractionResponder, ResponderError};
use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};

/// Responder that stores the reply instead of sending it.
///
/// Like the platform, it accepts a single reply per interaction.
#[derive(Debug, Default)]
pub struct RecordingResponder {
    reply: Mutex<Option<InteractionReply>>,
}

impl RecordingResponder {
    /// Creates a responder with no reply recorded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded reply, if any.
    #[must_use]
    pub fn reply(&self) -> Option<InteractionReply> {
        self.reply
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl InteractionResponder for RecordingResponder {
    async fn respond(&self, reply: InteractionReply) -> Result<(), ResponderError> {
        let mut recorded = self.reply.lock().unwrap_or_else(PoisonError::into_inner);
        if recorded.is_some() {
            return Err(ResponderError::AlreadyAnswered);
        }
        *recorded = Some(reply);
        Ok(())
    }
}
