//! Local identity record for a platform actor.

use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

use super::{ExternalActorId, IdentityId, InteractionActor};

/// Local identity bound to a platform actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorIdentity {
    id: IdentityId,
    external_id: ExternalActorId,
    display_name: String,
    created_at: DateTime<Utc>,
}

impl ActorIdentity {
    /// Creates a fresh identity for the actor.
    #[must_use]
    pub fn new(actor: &InteractionActor, clock: &impl Clock) -> Self {
        Self {
            id: IdentityId::new(),
            external_id: actor.external_id.clone(),
            display_name: actor.display_name.clone(),
            created_at: clock.utc(),
        }
    }

    /// Returns the local identifier.
    #[must_use]
    pub const fn id(&self) -> IdentityId {
        self.id
    }

    /// Returns the platform-side identifier.
    #[must_use]
    pub const fn external_id(&self) -> &ExternalActorId {
        &self.external_id
    }

    /// Returns the display name last seen for this actor.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns when the identity was created.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Refreshes the display name from a newer interaction.
    pub fn refresh_display_name(&mut self, actor: &InteractionActor) {
        if self.display_name != actor.display_name {
            self.display_name.clone_from(&actor.display_name);
        }
    }
}
