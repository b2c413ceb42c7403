//! Authoritative in-process catalogue of commands and buttons.
//!
//! Entries are only ever added. Command state changes go through the
//! definitions themselves, so readers never see a half-registered entry.

use crate::interaction::domain::{
    ButtonDefinition, ButtonToken, CommandDefinition, CommandName, CommandScope,
    InteractionDomainError, SyncSnapshot,
};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;

/// Errors returned by registration calls.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] InteractionDomainError),

    /// A command with the same name is already registered.
    #[error("command '{0}' is already registered")]
    DuplicateCommand(CommandName),
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Registry of commands keyed by name and buttons keyed by token.
#[derive(Debug, Default)]
pub struct InteractionRegistry {
    state: RwLock<RegistryState>,
}

#[derive(Debug, Default)]
struct RegistryState {
    commands: Vec<Arc<CommandDefinition>>,
    name_index: HashMap<String, Arc<CommandDefinition>>,
    buttons: HashMap<String, Arc<ButtonDefinition>>,
}

impl InteractionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new command. It starts dirty and never pushed.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateCommand`] when the name is taken, in
    /// which case the registry is left unchanged, or a domain error when the
    /// name is invalid.
    pub fn register_command(
        &self,
        name: impl Into<String>,
        scope: CommandScope,
    ) -> RegistryResult<Arc<CommandDefinition>> {
        let command_name = CommandName::new(name)?;
        let mut state = self.write_state();

        if state.name_index.contains_key(command_name.as_str()) {
            return Err(RegistryError::DuplicateCommand(command_name));
        }

        let command = Arc::new(CommandDefinition::new(command_name, scope));
        state
            .name_index
            .insert(command.name().as_str().to_owned(), Arc::clone(&command));
        state.commands.push(Arc::clone(&command));
        tracing::debug!(command = %command.name(), scope = %command.scope(), "command registered");
        Ok(command)
    }

    /// Registers a new button under a freshly generated token.
    ///
    /// A generated token that is already taken is discarded and a new one
    /// drawn; existing buttons are never replaced.
    #[must_use]
    pub fn register_button(&self) -> Arc<ButtonDefinition> {
        let mut state = self.write_state();
        loop {
            let token = ButtonToken::generate();
            match state.buttons.entry(token.as_str().to_owned()) {
                Entry::Vacant(slot) => {
                    let button = Arc::new(ButtonDefinition::new(token));
                    slot.insert(Arc::clone(&button));
                    return button;
                }
                Entry::Occupied(_) => {
                    tracing::warn!(token = %token, "button token collision, regenerating");
                }
            }
        }
    }

    /// Finds a command by its registered name.
    #[must_use]
    pub fn command(&self, name: &str) -> Option<Arc<CommandDefinition>> {
        self.read_state().name_index.get(name).cloned()
    }

    /// Finds a button by exact token.
    #[must_use]
    pub fn button(&self, token: &str) -> Option<Arc<ButtonDefinition>> {
        self.read_state().buttons.get(token).cloned()
    }

    /// Returns every command in registration order.
    #[must_use]
    pub fn commands(&self) -> Vec<Arc<CommandDefinition>> {
        self.read_state().commands.clone()
    }

    /// Returns commands whose remote state is behind, in registration order.
    #[must_use]
    pub fn dirty_commands(&self) -> Vec<Arc<CommandDefinition>> {
        self.read_state()
            .commands
            .iter()
            .filter(|command| command.sync_status().needs_sync)
            .cloned()
            .collect()
    }

    /// Returns the number of registered buttons.
    #[must_use]
    pub fn button_count(&self) -> usize {
        self.read_state().buttons.len()
    }

    /// Records a confirmed remote write for `command`.
    ///
    /// Returns whether the command is now synchronised.
    pub(crate) fn mark_committed(
        &self,
        command: &CommandDefinition,
        snapshot: &SyncSnapshot,
        created: bool,
    ) -> bool {
        command.mark_committed(snapshot, created)
    }

    fn read_state(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
