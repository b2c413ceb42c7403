//! Routing of inbound interaction events to registered handlers.
//!
//! Every event is handled on its own: a lookup miss, an identity failure, or
//! a failing handler is logged and turned into a [`DispatchOutcome`], never
//! propagated to the caller or to other events.

use crate::interaction::{
    domain::{ButtonClick, CommandInvocation, InteractionEvent},
    ports::IdentityDirectory,
    services::InteractionRegistry,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;

/// Default time in-flight handlers get to finish once the event loop stops.
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of dispatching one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchOutcome {
    /// The bound handler completed successfully.
    Handled,
    /// The bound handler returned an error; it was logged.
    HandlerFailed,
    /// The target exists but has no handler bound.
    NoHandler,
    /// No command with the invoked name is registered.
    UnknownCommand,
    /// No button with the clicked token is registered.
    UnknownButton,
    /// The invoking actor could not be resolved to a local identity.
    IdentityUnavailable,
}

/// Routes interaction events to command and button handlers.
pub struct InteractionDispatcher<I>
where
    I: IdentityDirectory,
{
    registry: Arc<InteractionRegistry>,
    identities: Arc<I>,
    drain_timeout: Duration,
}

impl<I> Clone for InteractionDispatcher<I>
where
    I: IdentityDirectory,
{
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            identities: Arc::clone(&self.identities),
            drain_timeout: self.drain_timeout,
        }
    }
}

impl<I> InteractionDispatcher<I>
where
    I: IdentityDirectory,
{
    /// Creates a dispatcher over the shared registry.
    #[must_use]
    pub const fn new(registry: Arc<InteractionRegistry>, identities: Arc<I>) -> Self {
        Self {
            registry,
            identities,
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
        }
    }

    /// Sets how long [`Self::run`] waits for in-flight handlers on exit
    /// before aborting them.
    #[must_use]
    pub const fn with_drain_timeout(mut self, drain_timeout: Duration) -> Self {
        self.drain_timeout = drain_timeout;
        self
    }

    /// Dispatches one event to its handler.
    pub async fn dispatch(&self, event: InteractionEvent) -> DispatchOutcome {
        match event {
            InteractionEvent::Command(invocation) => self.dispatch_command(&invocation).await,
            InteractionEvent::Button(click) => self.dispatch_button(&click).await,
        }
    }

    /// Consumes events until the channel closes or `shutdown` is cancelled.
    ///
    /// Each event is handled on its own task, started in delivery order, so
    /// a slow or panicking handler does not hold up later events. Handlers
    /// still running on exit get the drain timeout to finish and are then
    /// aborted.
    pub async fn run(self, mut events: mpsc::Receiver<InteractionEvent>, shutdown: CancellationToken)
    where
        I: 'static,
    {
        let mut in_flight = JoinSet::new();
        tracing::info!("interaction dispatcher started");

        loop {
            tokio::select! {
                biased;
                () = shutdown.cancelled() => break,
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    reap(joined);
                }
                received = events.recv() => {
                    let Some(event) = received else { break };
                    tracing::trace!(interaction = %event.interaction_id(), "interaction received");
                    let dispatcher = self.clone();
                    in_flight.spawn(async move { dispatcher.dispatch(event).await });
                }
            }
        }

        if tokio::time::timeout(self.drain_timeout, drain(&mut in_flight))
            .await
            .is_err()
        {
            tracing::warn!(
                remaining = in_flight.len(),
                timeout = ?self.drain_timeout,
                "interaction handlers still running at shutdown, aborting"
            );
            in_flight.abort_all();
            drain(&mut in_flight).await;
        }
        tracing::info!("interaction dispatcher stopped");
    }

    async fn dispatch_command(&self, invocation: &CommandInvocation) -> DispatchOutcome {
        let Some(command) = self.registry.command(&invocation.command_name) else {
            tracing::warn!(
                command = %invocation.command_name,
                interaction = %invocation.interaction_id,
                "command invoked but not registered locally"
            );
            return DispatchOutcome::UnknownCommand;
        };

        let identity = match self.identities.resolve_or_create(&invocation.actor).await {
            Ok(identity) => identity,
            Err(error) => {
                tracing::error!(
                    command = %command.name(),
                    actor = %invocation.actor.external_id,
                    error = %error,
                    "could not resolve invoking actor"
                );
                return DispatchOutcome::IdentityUnavailable;
            }
        };

        command.record_interaction(&invocation.interaction_id);
        let Some(handler) = command.handler() else {
            tracing::debug!(command = %command.name(), "command has no handler bound");
            return DispatchOutcome::NoHandler;
        };

        match handler.execute(invocation, &identity).await {
            Ok(()) => DispatchOutcome::Handled,
            Err(error) => {
                tracing::error!(
                    command = %command.name(),
                    interaction = %invocation.interaction_id,
                    error = %error,
                    "command handler failed"
                );
                DispatchOutcome::HandlerFailed
            }
        }
    }

    async fn dispatch_button(&self, click: &ButtonClick) -> DispatchOutcome {
        let Some(button) = self.registry.button(&click.token) else {
            // Stale tokens are routine.
            tracing::debug!(token = %click.token, "click on unknown button ignored");
            return DispatchOutcome::UnknownButton;
        };

        button.begin_interaction(click);
        let outcome = match button.handler() {
            None => DispatchOutcome::NoHandler,
            Some(handler) => match handler.click(click).await {
                Ok(()) => DispatchOutcome::Handled,
                Err(error) => {
                    tracing::error!(
                        token = %click.token,
                        interaction = %click.interaction_id,
                        error = %error,
                        "button handler failed"
                    );
                    DispatchOutcome::HandlerFailed
                }
            },
        };
        button.end_interaction(&click.interaction_id);
        outcome
    }
}

async fn drain(in_flight: &mut JoinSet<DispatchOutcome>) {
    while let Some(joined) = in_flight.join_next().await {
        reap(joined);
    }
}

fn reap(joined: Result<DispatchOutcome, JoinError>) {
    match joined {
        Ok(outcome) => tracing::trace!(?outcome, "interaction dispatched"),
        Err(error) if error.is_panic() => {
            tracing::error!(error = %error, "interaction handler panicked");
        }
        Err(error) => tracing::debug!(error = %error, "interaction task cancelled"),
    }
}
