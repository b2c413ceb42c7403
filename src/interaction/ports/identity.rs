//! Identity directory port.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::interaction::domain::{ActorIdentity, InteractionActor};

/// Result type for identity directory operations.
pub type IdentityResult<T> = Result<T, IdentityError>;

/// Lookup-or-create contract for local actor identities.
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    /// Returns the identity bound to the actor, creating it on first sight.
    async fn resolve_or_create(&self, actor: &InteractionActor) -> IdentityResult<ActorIdentity>;
}

/// Errors returned by identity directory adapters.
#[derive(Debug, Clone, Error)]
pub enum IdentityError {
    /// The actor is not allowed a local identity.
    #[error("actor {0} cannot be resolved to a local identity")]
    Refused(String),

    /// Persistence-layer failure.
    #[error("identity persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl IdentityError {
    /// Wraps a persistence-layer failure.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
