//! Wiring of the registry, synchroniser, and dispatcher into one running
//! service with a single stop signal.

use crate::interaction::{
    domain::InteractionEvent,
    ports::{IdentityDirectory, RemoteCommandApi},
    services::{
        CommandSynchronizer, DEFAULT_DRAIN_TIMEOUT, InteractionDispatcher, InteractionRegistry,
        SyncConfig, SyncReport, SynchronizerHandle,
    },
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Default capacity of the inbound event queue.
pub const DEFAULT_EVENT_BUFFER: usize = 256;

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Synchroniser settings.
    pub sync: SyncConfig,
    /// Capacity of the inbound event queue.
    pub event_buffer: usize,
    /// Time in-flight handlers get to finish on shutdown.
    pub drain_timeout: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            sync: SyncConfig::default(),
            event_buffer: DEFAULT_EVENT_BUFFER,
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
        }
    }
}

impl RuntimeConfig {
    /// Replaces the synchroniser settings.
    #[must_use]
    pub fn with_sync(mut self, sync: SyncConfig) -> Self {
        self.sync = sync;
        self
    }

    /// Sets how long shutdown waits for in-flight handlers.
    #[must_use]
    pub const fn with_drain_timeout(mut self, drain_timeout: Duration) -> Self {
        self.drain_timeout = drain_timeout;
        self
    }
}

/// Running interaction service.
///
/// Commands and buttons are registered through [`Self::registry`]; the event
/// source feeds [`Self::event_sender`]. Cancelling the lifecycle token passed
/// to [`Self::start`] stops both background loops, as does
/// [`Self::shutdown`].
pub struct InteractionRuntime<A>
where
    A: RemoteCommandApi + 'static,
{
    registry: Arc<InteractionRegistry>,
    synchronizer: CommandSynchronizer<A>,
    events: mpsc::Sender<InteractionEvent>,
    shutdown: CancellationToken,
    sync_handle: SynchronizerHandle,
    dispatch_task: JoinHandle<()>,
}

impl<A> InteractionRuntime<A>
where
    A: RemoteCommandApi + 'static,
{
    /// Starts the periodic synchroniser and the event loop.
    #[must_use]
    pub fn start<I>(
        registry: Arc<InteractionRegistry>,
        remote: Arc<A>,
        identities: Arc<I>,
        config: RuntimeConfig,
        lifecycle: &CancellationToken,
    ) -> Self
    where
        I: IdentityDirectory + 'static,
    {
        let shutdown = lifecycle.child_token();
        let synchronizer = CommandSynchronizer::new(Arc::clone(&registry), remote, config.sync);
        let sync_handle = synchronizer.spawn(&shutdown);

        let (events, receiver) = mpsc::channel(config.event_buffer.max(1));
        let dispatcher = InteractionDispatcher::new(Arc::clone(&registry), identities)
            .with_drain_timeout(config.drain_timeout);
        let dispatch_task = tokio::spawn(dispatcher.run(receiver, shutdown.clone()));

        Self {
            registry,
            synchronizer,
            events,
            shutdown,
            sync_handle,
            dispatch_task,
        }
    }

    /// Returns the shared registry.
    #[must_use]
    pub const fn registry(&self) -> &Arc<InteractionRegistry> {
        &self.registry
    }

    /// Returns a sender the event source delivers interactions through.
    #[must_use]
    pub fn event_sender(&self) -> mpsc::Sender<InteractionEvent> {
        self.events.clone()
    }

    /// Runs a reconciliation tick immediately, outside the schedule.
    pub async fn sync_now(&self) -> SyncReport {
        self.synchronizer.sync_pending().await
    }

    /// Stops both background loops and waits for them to exit.
    ///
    /// Handlers still running after the configured drain timeout are
    /// aborted.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        self.sync_handle.stop().await;
        if let Err(error) = self.dispatch_task.await {
            tracing::error!(error = %error, "interaction dispatcher task failed");
        }
    }
}
