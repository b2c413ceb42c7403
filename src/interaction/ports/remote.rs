//! Remote command registry port.
//!
//! The remote platform is the system of record for which commands users can
//! invoke. It exposes create and update for global and scoped commands.

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::interaction::domain::{CommandScope, TargetId};

/// Result type for remote command registry operations.
pub type RemoteCommandResult<T> = Result<T, RemoteCommandError>;

/// Remote write contract for command definitions.
///
/// Every method receives the serialised command payload. Implementations
/// must not retry internally; the synchroniser decides when to try again.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteCommandApi: Send + Sync {
    /// Creates a platform-wide command.
    async fn create_global(&self, payload: &Value) -> RemoteCommandResult<()>;

    /// Updates a platform-wide command.
    async fn update_global(&self, payload: &Value) -> RemoteCommandResult<()>;

    /// Creates a command visible only within `target`.
    async fn create_in_scope(&self, target: &TargetId, payload: &Value) -> RemoteCommandResult<()>;

    /// Updates a command visible only within `target`.
    async fn update_in_scope(&self, target: &TargetId, payload: &Value) -> RemoteCommandResult<()>;
}

/// Errors returned by remote command registry adapters.
///
/// Transient and permanent failures are not distinguished by callers; both
/// leave the command dirty for the next attempt.
#[derive(Debug, Clone, Error)]
pub enum RemoteCommandError {
    /// The platform refused the payload.
    #[error("remote platform rejected command: {0}")]
    Rejected(String),

    /// The request did not complete.
    #[error("remote transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl RemoteCommandError {
    /// Creates a rejection with the platform's reason.
    #[must_use]
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected(reason.into())
    }

    /// Wraps a transport failure.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}

/// One of the four remote writes, selected from scope and push history.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RemoteOperation {
    /// First push of a global command.
    CreateGlobal,
    /// Later push of a global command.
    UpdateGlobal,
    /// First push of a scoped command.
    CreateInScope(TargetId),
    /// Later push of a scoped command.
    UpdateInScope(TargetId),
}

impl RemoteOperation {
    /// Selects the remote write for a command.
    #[must_use]
    pub fn select(scope: &CommandScope, ever_pushed: bool) -> Self {
        match (scope, ever_pushed) {
            (CommandScope::Target(target), false) => Self::CreateInScope(target.clone()),
            (CommandScope::Target(target), true) => Self::UpdateInScope(target.clone()),
            (CommandScope::Global, false) => Self::CreateGlobal,
            (CommandScope::Global, true) => Self::UpdateGlobal,
        }
    }

    /// Returns whether this write creates the command remotely.
    #[must_use]
    pub const fn is_create(&self) -> bool {
        matches!(self, Self::CreateGlobal | Self::CreateInScope(_))
    }

    /// Issues the write against `api`.
    ///
    /// # Errors
    ///
    /// Returns the adapter's [`RemoteCommandError`] unchanged.
    pub async fn apply<A>(&self, api: &A, payload: &Value) -> RemoteCommandResult<()>
    where
        A: RemoteCommandApi + ?Sized,
    {
        match self {
            Self::CreateGlobal => api.create_global(payload).await,
            Self::UpdateGlobal => api.update_global(payload).await,
            Self::CreateInScope(target) => api.create_in_scope(target, payload).await,
            Self::UpdateInScope(target) => api.update_in_scope(target, payload).await,
        }
    }
}

impl fmt::Display for RemoteOperation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateGlobal => formatter.write_str("create-global"),
            Self::UpdateGlobal => formatter.write_str("update-global"),
            Self::CreateInScope(target) => write!(formatter, "create-in-scope({target})"),
            Self::UpdateInScope(target) => write!(formatter, "update-in-scope({target})"),
        }
    }
}
