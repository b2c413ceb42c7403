//! In-memory identity directory.

use crate::interaction::{
    domain::{ActorIdentity, ExternalActorId, InteractionActor},
    ports::{IdentityDirectory, IdentityError, IdentityResult},
};
use async_trait::async_trait;
use mockable::Clock;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Thread-safe in-memory identity directory keyed by platform actor id.
#[derive(Debug, Clone)]
pub struct InMemoryIdentityDirectory<C>
where
    C: Clock + Send + Sync,
{
    clock: Arc<C>,
    state: Arc<RwLock<DirectoryState>>,
}

#[derive(Debug, Default)]
struct DirectoryState {
    identities: HashMap<ExternalActorId, ActorIdentity>,
    refused: HashSet<ExternalActorId>,
}

impl<C> InMemoryIdentityDirectory<C>
where
    C: Clock + Send + Sync,
{
    /// Creates an empty directory.
    #[must_use]
    pub fn new(clock: Arc<C>) -> Self {
        Self {
            clock,
            state: Arc::default(),
        }
    }

    /// Refuses to resolve the given actor from now on.
    pub fn refuse(&self, external_id: ExternalActorId) {
        self.write_state().refused.insert(external_id);
    }

    /// Finds an existing identity without creating one.
    #[must_use]
    pub fn find(&self, external_id: &ExternalActorId) -> Option<ActorIdentity> {
        self.read_state().identities.get(external_id).cloned()
    }

    /// Returns the number of known identities.
    #[must_use]
    pub fn count(&self) -> usize {
        self.read_state().identities.len()
    }

    fn read_state(&self) -> RwLockReadGuard<'_, DirectoryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, DirectoryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl<C> IdentityDirectory for InMemoryIdentityDirectory<C>
where
    C: Clock + Send + Sync,
{
    async fn resolve_or_create(&self, actor: &InteractionActor) -> IdentityResult<ActorIdentity> {
        let mut state = self.write_state();

        if state.refused.contains(&actor.external_id) {
            return Err(IdentityError::Refused(actor.external_id.to_string()));
        }

        let identity = state
            .identities
            .entry(actor.external_id.clone())
            .and_modify(|existing| existing.refresh_display_name(actor))
            .or_insert_with(|| ActorIdentity::new(actor, &*self.clock));
        Ok(identity.clone())
    }
}
