//! Application services for the interaction registry.

mod dispatcher;
mod registry;
mod runtime;
mod synchronizer;

pub use dispatcher::{DEFAULT_DRAIN_TIMEOUT, DispatchOutcome, InteractionDispatcher};
pub use registry::{InteractionRegistry, RegistryError, RegistryResult};
pub use runtime::{DEFAULT_EVENT_BUFFER, InteractionRuntime, RuntimeConfig};
pub use synchronizer::{
    CommandSynchronizer, DEFAULT_SYNC_INTERVAL, SyncConfig, SyncFailurePolicy, SyncReport,
    SynchronizerHandle,
};
