//! Shared helpers for in-memory interaction runtime tests.

use std::sync::Arc;
use std::time::Duration;

use mockable::DefaultClock;
use rstest::fixture;
use switchboard::interaction::{
    adapters::memory::{InMemoryIdentityDirectory, InMemoryRemoteCommandApi, RecordingResponder},
    domain::{ButtonClick, CommandInvocation, InteractionActor, InteractionEvent, InteractionId},
    services::InteractionRegistry,
};
use tokio::sync::mpsc;

/// Identity directory used across the runtime tests.
pub type TestDirectory = InMemoryIdentityDirectory<DefaultClock>;

/// Provides a fresh registry for each test.
#[fixture]
pub fn registry() -> Arc<InteractionRegistry> {
    Arc::new(InteractionRegistry::new())
}

/// Provides an empty in-memory remote platform.
#[fixture]
pub fn remote() -> Arc<InMemoryRemoteCommandApi> {
    Arc::new(InMemoryRemoteCommandApi::new())
}

/// Provides an empty identity directory.
#[fixture]
pub fn identities() -> Arc<TestDirectory> {
    Arc::new(InMemoryIdentityDirectory::new(Arc::new(DefaultClock)))
}

/// Builds a command invocation with a recording responder.
pub fn invoke(id: &str, command: &str) -> (InteractionEvent, Arc<RecordingResponder>) {
    let responder = Arc::new(RecordingResponder::new());
    let invocation = CommandInvocation::new(
        InteractionId::new(id),
        command,
        InteractionActor::new("1001", "ada"),
        responder.clone(),
    );
    (invocation.into(), responder)
}

/// Builds a button click with a recording responder.
pub fn click(id: &str, token: &str) -> (InteractionEvent, Arc<RecordingResponder>) {
    let responder = Arc::new(RecordingResponder::new());
    let event = ButtonClick::new(
        InteractionId::new(id),
        token,
        InteractionActor::new("1001", "ada"),
        responder.clone(),
    );
    (event.into(), responder)
}

/// Waits for a handler to signal completion.
///
/// # Panics
///
/// Panics when no signal arrives within five seconds.
pub async fn await_signal(signals: &mut mpsc::UnboundedReceiver<String>) -> String {
    tokio::time::timeout(Duration::from_secs(5), signals.recv())
        .await
        .expect("handler should run before the timeout")
        .expect("signal channel should stay open")
}
