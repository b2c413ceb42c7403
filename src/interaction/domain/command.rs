//! Command definition and its remote synchronisation state.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{
    CommandHandler, CommandName, CommandSchema, InteractionDomainError, InteractionId, TargetId,
};

/// Visibility of a command on the remote platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "target")]
pub enum CommandScope {
    /// Visible platform-wide.
    Global,
    /// Visible only within one deployment target.
    Target(TargetId),
}

impl CommandScope {
    /// Returns the deployment target for scoped commands.
    #[must_use]
    pub const fn target(&self) -> Option<&TargetId> {
        match self {
            Self::Global => None,
            Self::Target(target) => Some(target),
        }
    }
}

impl fmt::Display for CommandScope {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => formatter.write_str("global"),
            Self::Target(target) => write!(formatter, "target:{target}"),
        }
    }
}

/// Synchronisation flags of a command.
///
/// `needs_sync` stays set until a remote write reflecting the latest local
/// definition succeeds. `ever_pushed` flips once, after the first successful
/// create, and selects update over create for every later sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncStatus {
    /// Local definition differs from what the remote platform last accepted.
    pub needs_sync: bool,
    /// The command has been created remotely at least once.
    pub ever_pushed: bool,
}

impl SyncStatus {
    /// Returns whether the remote platform reflects the local definition.
    #[must_use]
    pub const fn is_synchronized(self) -> bool {
        !self.needs_sync
    }
}

/// Point-in-time copy of a dirty command taken before a remote call.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncSnapshot {
    /// Serialised schema payload.
    pub payload: Value,
    /// Local revision the payload was taken from.
    pub revision: u64,
    /// Whether the command had already been created remotely.
    pub ever_pushed: bool,
}

#[derive(Debug)]
struct CommandState {
    schema: CommandSchema,
    revision: u64,
    needs_sync: bool,
    ever_pushed: bool,
    last_interaction: Option<InteractionId>,
}

/// Registered command with mutable remote-visible state.
///
/// Name and scope are fixed at registration. The schema may be edited
/// through [`CommandDefinition::update_schema`], which marks the command
/// dirty again. The handler can be bound once.
pub struct CommandDefinition {
    name: CommandName,
    scope: CommandScope,
    state: RwLock<CommandState>,
    handler: OnceLock<Arc<dyn CommandHandler>>,
}

impl CommandDefinition {
    /// Creates a dirty, never-pushed command with an empty schema.
    #[must_use]
    pub fn new(name: CommandName, scope: CommandScope) -> Self {
        Self {
            name,
            scope,
            state: RwLock::new(CommandState {
                schema: CommandSchema::default(),
                revision: 0,
                needs_sync: true,
                ever_pushed: false,
                last_interaction: None,
            }),
            handler: OnceLock::new(),
        }
    }

    /// Returns the command name.
    #[must_use]
    pub const fn name(&self) -> &CommandName {
        &self.name
    }

    /// Returns the command scope.
    #[must_use]
    pub const fn scope(&self) -> &CommandScope {
        &self.scope
    }

    /// Returns a copy of the current schema.
    #[must_use]
    pub fn schema(&self) -> CommandSchema {
        self.read_state().schema.clone()
    }

    /// Returns the local revision, bumped on every schema edit.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.read_state().revision
    }

    /// Returns the synchronisation flags.
    #[must_use]
    pub fn sync_status(&self) -> SyncStatus {
        let state = self.read_state();
        SyncStatus {
            needs_sync: state.needs_sync,
            ever_pushed: state.ever_pushed,
        }
    }

    /// Returns the serialised payload the remote platform receives.
    #[must_use]
    pub fn payload(&self) -> Value {
        self.read_state().schema.to_payload(&self.name)
    }

    /// Edits the schema in place and marks the command dirty.
    ///
    /// The edit is applied to a copy with no lock held, so it may read this
    /// command. The copy is only stored when it validates, so a rejected edit
    /// leaves the command untouched. Concurrent edits are last-writer-wins;
    /// each one bumps the revision, so a sync snapshot taken before either
    /// is never committed as current.
    ///
    /// # Errors
    ///
    /// Returns [`InteractionDomainError::InvalidOption`] when the edited
    /// schema is invalid.
    pub fn update_schema(
        &self,
        edit: impl FnOnce(&mut CommandSchema),
    ) -> Result<(), InteractionDomainError> {
        let mut schema = self.schema();
        edit(&mut schema);
        schema.validate(&self.name)?;

        let mut state = self.write_state();
        state.schema = schema;
        state.revision += 1;
        state.needs_sync = true;
        Ok(())
    }

    /// Replaces the schema and marks the command dirty.
    ///
    /// # Errors
    ///
    /// Returns [`InteractionDomainError::InvalidOption`] when the schema is
    /// invalid.
    pub fn replace_schema(&self, schema: CommandSchema) -> Result<(), InteractionDomainError> {
        self.update_schema(move |current| *current = schema)
    }

    /// Binds the handler invoked when the command is executed.
    ///
    /// # Errors
    ///
    /// Returns [`InteractionDomainError::CommandHandlerAlreadyBound`] when a
    /// handler is already bound.
    pub fn bind_handler(&self, handler: Arc<dyn CommandHandler>) -> Result<(), InteractionDomainError> {
        self.handler.set(handler).map_err(|_| {
            InteractionDomainError::CommandHandlerAlreadyBound(self.name.as_str().to_owned())
        })
    }

    /// Returns the bound handler, if any.
    #[must_use]
    pub fn handler(&self) -> Option<Arc<dyn CommandHandler>> {
        self.handler.get().cloned()
    }

    /// Returns the most recent interaction routed to this command.
    #[must_use]
    pub fn last_interaction(&self) -> Option<InteractionId> {
        self.read_state().last_interaction.clone()
    }

    pub(crate) fn record_interaction(&self, interaction_id: &InteractionId) {
        self.write_state().last_interaction = Some(interaction_id.clone());
    }

    /// Snapshots the command for a remote write when it is dirty.
    #[must_use]
    pub fn pending_sync(&self) -> Option<SyncSnapshot> {
        let state = self.read_state();
        state.needs_sync.then(|| SyncSnapshot {
            payload: state.schema.to_payload(&self.name),
            revision: state.revision,
            ever_pushed: state.ever_pushed,
        })
    }

    /// Records a confirmed remote write of `snapshot`.
    ///
    /// `ever_pushed` is set after any successful create. `needs_sync` is
    /// only cleared when no edit landed after the snapshot was taken.
    /// Returns whether the command is now synchronised.
    pub(crate) fn mark_committed(&self, snapshot: &SyncSnapshot, created: bool) -> bool {
        let mut state = self.write_state();
        if created {
            state.ever_pushed = true;
        }
        if state.revision == snapshot.revision {
            state.needs_sync = false;
        }
        !state.needs_sync
    }

    fn read_state(&self) -> RwLockReadGuard<'_, CommandState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, CommandState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for CommandDefinition {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read_state();
        formatter
            .debug_struct("CommandDefinition")
            .field("name", &self.name)
            .field("scope", &self.scope)
            .field("revision", &state.revision)
            .field("needs_sync", &state.needs_sync)
            .field("ever_pushed", &state.ever_pushed)
            .field("has_handler", &self.handler.get().is_some())
            .finish_non_exhaustive()
    }
}
