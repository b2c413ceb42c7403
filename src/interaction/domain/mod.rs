//! Domain model for the interaction registry.
//!
//! Commands and buttons, their handler contracts, the inbound events routed
//! to them, and the local identity resolved for the invoking actor. Remote
//! platform and persistence concerns stay outside this boundary.

mod button;
mod command;
mod error;
mod event;
mod handler;
mod identity;
mod ids;
mod reply;
mod schema;

pub use button::ButtonDefinition;
pub use command::{CommandDefinition, CommandScope, SyncSnapshot, SyncStatus};
pub use error::InteractionDomainError;
pub use event::{ButtonClick, CommandInvocation, InteractionActor, InteractionEvent};
pub use handler::{
    ButtonHandler, ButtonHandlerFn, CommandHandler, CommandHandlerFn, HandlerError, HandlerResult,
};
pub use identity::ActorIdentity;
pub use ids::{ButtonToken, CommandName, ExternalActorId, IdentityId, InteractionId, TargetId};
pub use reply::{InteractionReply, InteractionResponder, ResponderError};
pub use schema::{CommandOption, CommandOptionKind, CommandSchema, OptionChoice};
