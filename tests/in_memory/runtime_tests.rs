//! In-memory integration tests for the assembled interaction runtime.

use std::sync::Arc;
use std::time::Duration;

use rstest::rstest;
use switchboard::interaction::{
    adapters::memory::InMemoryRemoteCommandApi,
    domain::{
        ButtonHandlerFn, CommandHandlerFn, CommandScope, HandlerError, HandlerResult,
        InteractionReply,
    },
    ports::RemoteOperation,
    services::{InteractionRegistry, InteractionRuntime, RuntimeConfig, SyncConfig},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::helpers::{TestDirectory, await_signal, click, identities, invoke, registry, remote};

fn start(
    registry: &Arc<InteractionRegistry>,
    remote: &Arc<InMemoryRemoteCommandApi>,
    identities: Arc<TestDirectory>,
    sync: SyncConfig,
    lifecycle: &CancellationToken,
) -> InteractionRuntime<InMemoryRemoteCommandApi> {
    InteractionRuntime::start(
        Arc::clone(registry),
        Arc::clone(remote),
        identities,
        RuntimeConfig::default().with_sync(sync),
        lifecycle,
    )
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn commands_registered_before_start_are_pushed_immediately(
    registry: Arc<InteractionRegistry>,
    remote: Arc<InMemoryRemoteCommandApi>,
    identities: Arc<TestDirectory>,
) {
    registry
        .register_command("ping", CommandScope::Global)
        .expect("registration should succeed");
    let lifecycle = CancellationToken::new();
    let runtime = start(
        &registry,
        &remote,
        identities,
        SyncConfig::default(),
        &lifecycle,
    );

    tokio::time::sleep(Duration::from_millis(1)).await;

    assert!(remote.global_command("ping").is_some());
    runtime.shutdown().await;
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn periodic_sync_waits_for_the_interval(
    registry: Arc<InteractionRegistry>,
    remote: Arc<InMemoryRemoteCommandApi>,
    identities: Arc<TestDirectory>,
) {
    let lifecycle = CancellationToken::new();
    let sync = SyncConfig::default()
        .with_interval(Duration::from_secs(5))
        .without_initial_sync();
    let runtime = start(&registry, &remote, identities, sync, &lifecycle);
    registry
        .register_command("ping", CommandScope::Global)
        .expect("registration should succeed");

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(remote.calls().is_empty());

    tokio::time::sleep(Duration::from_secs(4)).await;
    let operations: Vec<_> = remote.calls().into_iter().map(|call| call.operation).collect();
    assert_eq!(operations, vec![RemoteOperation::CreateGlobal]);

    runtime.shutdown().await;
}

#[rstest]
#[tokio::test]
async fn sync_now_runs_outside_the_schedule(
    registry: Arc<InteractionRegistry>,
    remote: Arc<InMemoryRemoteCommandApi>,
    identities: Arc<TestDirectory>,
) {
    let lifecycle = CancellationToken::new();
    let sync = SyncConfig::default()
        .with_interval(Duration::from_secs(3_600))
        .without_initial_sync();
    let runtime = start(&registry, &remote, identities, sync, &lifecycle);
    let ping = runtime
        .registry()
        .register_command("ping", CommandScope::Global)
        .expect("registration should succeed");

    let report = runtime.sync_now().await;

    assert_eq!(report.attempted(), 1);
    assert!(ping.sync_status().is_synchronized());
    runtime.shutdown().await;
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn events_reach_command_and_button_handlers(
    registry: Arc<InteractionRegistry>,
    remote: Arc<InMemoryRemoteCommandApi>,
    identities: Arc<TestDirectory>,
) {
    let (signal, mut signals) = mpsc::unbounded_channel();
    let command_signal = signal.clone();
    registry
        .register_command("ping", CommandScope::Global)
        .expect("registration should succeed")
        .bind_handler(Arc::new(CommandHandlerFn::new(move |invocation, _identity| {
            let command_signal = command_signal.clone();
            async move {
                let replied = invocation
                    .respond(InteractionReply::public("pong"))
                    .await
                    .map_err(HandlerError::from);
                let _ = command_signal.send("ping".to_owned());
                replied
            }
        })))
        .expect("handler bind should succeed");
    let button = registry.register_button();
    button
        .bind_handler(Arc::new(ButtonHandlerFn::new(move |clicked| {
            let _ = signal.send(clicked.token);
            async { Ok(()) }
        })))
        .expect("handler bind should succeed");
    let lifecycle = CancellationToken::new();
    let runtime = start(
        &registry,
        &remote,
        identities,
        SyncConfig::default(),
        &lifecycle,
    );
    let events = runtime.event_sender();

    let (command_event, responder) = invoke("1", "ping");
    events.send(command_event).await.expect("runtime should accept events");
    assert_eq!(await_signal(&mut signals).await, "ping");
    assert_eq!(responder.reply(), Some(InteractionReply::public("pong")));

    let token = button.token().as_str().to_owned();
    let (click_event, _) = click("2", &token);
    events.send(click_event).await.expect("runtime should accept events");
    assert_eq!(await_signal(&mut signals).await, token);

    runtime.shutdown().await;
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cancelling_the_lifecycle_stops_the_runtime(
    registry: Arc<InteractionRegistry>,
    remote: Arc<InMemoryRemoteCommandApi>,
    identities: Arc<TestDirectory>,
) {
    let lifecycle = CancellationToken::new();
    let runtime = start(
        &registry,
        &remote,
        identities,
        SyncConfig::default(),
        &lifecycle,
    );
    let events = runtime.event_sender();

    lifecycle.cancel();
    runtime.shutdown().await;
    registry
        .register_command("late", CommandScope::Global)
        .expect("registration should succeed");
    let (event, _) = invoke("1", "late");

    assert!(events.send(event).await.is_err());
    assert!(remote.global_command("late").is_none());
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn shutdown_aborts_handlers_that_outlive_the_drain_timeout(
    registry: Arc<InteractionRegistry>,
    remote: Arc<InMemoryRemoteCommandApi>,
    identities: Arc<TestDirectory>,
) {
    let (signal, mut signals) = mpsc::unbounded_channel();
    registry
        .register_command("stuck", CommandScope::Global)
        .expect("registration should succeed")
        .bind_handler(Arc::new(CommandHandlerFn::new(move |_, _| {
            let _ = signal.send("stuck".to_owned());
            std::future::pending::<HandlerResult>()
        })))
        .expect("handler bind should succeed");
    let lifecycle = CancellationToken::new();
    let runtime = InteractionRuntime::start(
        Arc::clone(&registry),
        Arc::clone(&remote),
        identities,
        RuntimeConfig::default().with_drain_timeout(Duration::from_secs(3)),
        &lifecycle,
    );
    let (event, responder) = invoke("1", "stuck");
    runtime
        .event_sender()
        .send(event)
        .await
        .expect("runtime should accept events");
    assert_eq!(await_signal(&mut signals).await, "stuck");

    let stopping = tokio::time::Instant::now();
    tokio::time::timeout(Duration::from_secs(60), runtime.shutdown())
        .await
        .expect("shutdown should finish once the drain timeout elapses");

    assert!(stopping.elapsed() >= Duration::from_secs(3));
    assert!(responder.reply().is_none());
}
