//! Periodic reconciliation of registered commands with the remote platform.
//!
//! Each tick collects the dirty commands and pushes them one at a time, in
//! registration order. A failed push leaves the command dirty for the next
//! tick. Only one tick runs at a time, so no two remote writes are ever in
//! flight together.

use crate::interaction::{
    domain::{CommandDefinition, CommandName},
    ports::{RemoteCommandApi, RemoteOperation},
    services::InteractionRegistry,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Default period between reconciliation ticks.
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(20);

const MIN_SYNC_INTERVAL: Duration = Duration::from_millis(1);

/// What a tick does after a remote write fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncFailurePolicy {
    /// Keep pushing the remaining dirty commands.
    #[default]
    ContinueRemaining,
    /// Leave the remaining dirty commands for the next tick.
    AbortTick,
}

/// Synchroniser configuration.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use switchboard::interaction::services::{SyncConfig, SyncFailurePolicy};
///
/// let config = SyncConfig::default();
/// assert_eq!(config.interval, Duration::from_secs(20));
/// assert_eq!(config.failure_policy, SyncFailurePolicy::ContinueRemaining);
///
/// let strict = SyncConfig::default().with_failure_policy(SyncFailurePolicy::AbortTick);
/// assert_eq!(strict.failure_policy, SyncFailurePolicy::AbortTick);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Period between ticks.
    pub interval: Duration,
    /// Whether the periodic task pushes immediately on start.
    pub sync_on_start: bool,
    /// Behaviour after a failed remote write.
    pub failure_policy: SyncFailurePolicy,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_SYNC_INTERVAL,
            sync_on_start: true,
            failure_policy: SyncFailurePolicy::ContinueRemaining,
        }
    }
}

impl SyncConfig {
    /// Sets the tick period.
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the failure policy.
    #[must_use]
    pub const fn with_failure_policy(mut self, failure_policy: SyncFailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }

    /// Waits one full period before the first tick.
    #[must_use]
    pub const fn without_initial_sync(mut self) -> Self {
        self.sync_on_start = false;
        self
    }
}

/// Outcome of one reconciliation tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Commands written successfully, with the write used.
    pub committed: Vec<(CommandName, RemoteOperation)>,
    /// Commands whose write failed.
    pub failed: Vec<CommandName>,
    /// Dirty commands left untouched by an aborted or stopped tick.
    pub skipped: Vec<CommandName>,
}

impl SyncReport {
    /// Returns whether the tick found nothing to do.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.committed.is_empty() && self.failed.is_empty() && self.skipped.is_empty()
    }

    /// Returns the number of remote writes issued.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.committed.len() + self.failed.len()
    }
}

enum PushOutcome {
    Committed(RemoteOperation),
    Failed,
    AlreadyClean,
}

/// Pushes dirty commands from the registry to the remote platform.
pub struct CommandSynchronizer<A>
where
    A: RemoteCommandApi,
{
    registry: Arc<InteractionRegistry>,
    remote: Arc<A>,
    config: SyncConfig,
    tick_gate: Arc<Mutex<()>>,
}

impl<A> Clone for CommandSynchronizer<A>
where
    A: RemoteCommandApi,
{
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            remote: Arc::clone(&self.remote),
            config: self.config.clone(),
            tick_gate: Arc::clone(&self.tick_gate),
        }
    }
}

impl<A> CommandSynchronizer<A>
where
    A: RemoteCommandApi,
{
    /// Creates a synchroniser over the shared registry.
    #[must_use]
    pub fn new(registry: Arc<InteractionRegistry>, remote: Arc<A>, config: SyncConfig) -> Self {
        Self {
            registry,
            remote,
            config,
            tick_gate: Arc::new(Mutex::new(())),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Runs one reconciliation tick now.
    ///
    /// Waits for a tick already in progress to finish first.
    pub async fn sync_pending(&self) -> SyncReport {
        self.run_tick(None).await
    }

    /// Starts the periodic task.
    ///
    /// The task stops when `shutdown` is cancelled or when
    /// [`SynchronizerHandle::stop`] is called, whichever comes first.
    #[must_use]
    pub fn spawn(&self, shutdown: &CancellationToken) -> SynchronizerHandle
    where
        A: 'static,
    {
        let token = shutdown.child_token();
        let synchronizer = self.clone();
        let task_token = token.clone();
        let join = tokio::spawn(async move { synchronizer.run(task_token).await });
        SynchronizerHandle { token, join }
    }

    async fn run(self, shutdown: CancellationToken) {
        let mut interval = tokio::time::interval(self.config.interval.max(MIN_SYNC_INTERVAL));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        if !self.config.sync_on_start {
            // The first tick completes immediately; consume it.
            interval.tick().await;
        }
        tracing::info!(interval = ?self.config.interval, "command synchronizer started");

        loop {
            tokio::select! {
                biased;
                () = shutdown.cancelled() => break,
                _ = interval.tick() => {
                    let report = self.run_tick(Some(&shutdown)).await;
                    if !report.is_noop() {
                        tracing::debug!(
                            committed = report.committed.len(),
                            failed = report.failed.len(),
                            skipped = report.skipped.len(),
                            "command sync tick finished"
                        );
                    }
                }
            }
        }

        tracing::info!("command synchronizer stopped");
    }

    async fn run_tick(&self, shutdown: Option<&CancellationToken>) -> SyncReport {
        let mut report = SyncReport::default();
        if self.registry.dirty_commands().is_empty() {
            return report;
        }

        let _tick = self.tick_gate.lock().await;
        let mut halted = false;
        // Re-read under the gate: a tick that just finished may have
        // committed some of them.
        for command in self.registry.dirty_commands() {
            if halted || shutdown.is_some_and(CancellationToken::is_cancelled) {
                report.skipped.push(command.name().clone());
                continue;
            }

            match self.push(&command).await {
                PushOutcome::Committed(operation) => {
                    report.committed.push((command.name().clone(), operation));
                }
                PushOutcome::Failed => {
                    report.failed.push(command.name().clone());
                    halted = self.config.failure_policy == SyncFailurePolicy::AbortTick;
                }
                PushOutcome::AlreadyClean => {}
            }
        }

        report
    }

    async fn push(&self, command: &CommandDefinition) -> PushOutcome {
        let Some(snapshot) = command.pending_sync() else {
            return PushOutcome::AlreadyClean;
        };
        let operation = RemoteOperation::select(command.scope(), snapshot.ever_pushed);

        match operation.apply(&*self.remote, &snapshot.payload).await {
            Ok(()) => {
                let synchronized = self
                    .registry
                    .mark_committed(command, &snapshot, operation.is_create());
                tracing::info!(
                    command = %command.name(),
                    operation = %operation,
                    synchronized,
                    "command pushed to remote platform"
                );
                PushOutcome::Committed(operation)
            }
            Err(error) => {
                tracing::error!(
                    command = %command.name(),
                    operation = %operation,
                    error = %error,
                    "command push failed, will retry next tick"
                );
                PushOutcome::Failed
            }
        }
    }
}

/// Handle to the running periodic task.
///
/// [`SynchronizerHandle::stop`] consumes the handle, so the task can only be
/// stopped once through it.
#[derive(Debug)]
pub struct SynchronizerHandle {
    token: CancellationToken,
    join: JoinHandle<()>,
}

impl SynchronizerHandle {
    /// Returns whether the periodic task has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Cancels the periodic task and waits for it to exit.
    ///
    /// A remote write already in flight is allowed to complete; no further
    /// writes start afterwards.
    pub async fn stop(self) {
        self.token.cancel();
        if let Err(error) = self.join.await {
            tracing::error!(error = %error, "command synchronizer task failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::{
        adapters::memory::InMemoryRemoteCommandApi,
        domain::{CommandScope, TargetId},
        ports::{MockRemoteCommandApi, RemoteCommandError},
    };
    use rstest::rstest;
    use serde_json::Value;

    fn named(payload: &Value, name: &str) -> bool {
        payload.get("name").and_then(Value::as_str) == Some(name)
    }

    fn registry_with(names: &[&str]) -> Arc<InteractionRegistry> {
        let registry = Arc::new(InteractionRegistry::new());
        for name in names {
            registry
                .register_command(*name, CommandScope::Global)
                .expect("registration should succeed");
        }
        registry
    }

    #[tokio::test]
    async fn empty_registry_tick_is_noop() {
        let remote = MockRemoteCommandApi::new();
        let synchronizer = CommandSynchronizer::new(
            Arc::new(InteractionRegistry::new()),
            Arc::new(remote),
            SyncConfig::default(),
        );

        assert!(synchronizer.sync_pending().await.is_noop());
    }

    #[tokio::test]
    async fn failed_push_stays_dirty_and_is_retried() {
        let registry = registry_with(&["ping"]);
        let mut remote = MockRemoteCommandApi::new();
        let mut attempts = 0;
        remote.expect_create_global().times(2).returning(move |_| {
            attempts += 1;
            if attempts == 1 {
                Err(RemoteCommandError::rejected("rate limited"))
            } else {
                Ok(())
            }
        });
        remote.expect_update_global().never();
        let synchronizer =
            CommandSynchronizer::new(Arc::clone(&registry), Arc::new(remote), SyncConfig::default());

        let first = synchronizer.sync_pending().await;
        let ping = registry.command("ping").expect("ping should exist");
        assert_eq!(first.failed.len(), 1);
        assert!(ping.sync_status().needs_sync);
        assert!(!ping.sync_status().ever_pushed);

        let second = synchronizer.sync_pending().await;
        assert_eq!(second.committed.len(), 1);
        assert!(ping.sync_status().is_synchronized());
        assert!(ping.sync_status().ever_pushed);
    }

    #[rstest]
    #[case(SyncFailurePolicy::ContinueRemaining, 1, 0)]
    #[case(SyncFailurePolicy::AbortTick, 0, 1)]
    #[tokio::test]
    async fn failure_policy_controls_rest_of_tick(
        #[case] policy: SyncFailurePolicy,
        #[case] expected_committed: usize,
        #[case] expected_skipped: usize,
    ) {
        let registry = registry_with(&["alpha", "beta"]);
        let mut remote = MockRemoteCommandApi::new();
        remote
            .expect_create_global()
            .withf(|payload| named(payload, "alpha"))
            .times(1)
            .returning(|_| Err(RemoteCommandError::rejected("malformed")));
        remote
            .expect_create_global()
            .withf(|payload| named(payload, "beta"))
            .times(expected_committed)
            .returning(|_| Ok(()));
        let synchronizer = CommandSynchronizer::new(
            Arc::clone(&registry),
            Arc::new(remote),
            SyncConfig::default().with_failure_policy(policy),
        );

        let report = synchronizer.sync_pending().await;

        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.committed.len(), expected_committed);
        assert_eq!(report.skipped.len(), expected_skipped);
        let beta = registry.command("beta").expect("beta should exist");
        assert_eq!(beta.sync_status().needs_sync, expected_committed == 0);
    }

    #[tokio::test]
    async fn scoped_command_uses_scoped_writes() {
        let registry = Arc::new(InteractionRegistry::new());
        let guild = TargetId::new("guild-7").expect("valid target");
        let command = registry
            .register_command("ban", CommandScope::Target(guild.clone()))
            .expect("registration should succeed");
        let mut remote = MockRemoteCommandApi::new();
        let expected_target = guild.clone();
        remote
            .expect_create_in_scope()
            .withf(move |target, _| *target == expected_target)
            .times(1)
            .returning(|_, _| Ok(()));
        remote
            .expect_update_in_scope()
            .times(1)
            .returning(|_, _| Ok(()));
        let synchronizer =
            CommandSynchronizer::new(Arc::clone(&registry), Arc::new(remote), SyncConfig::default());

        synchronizer.sync_pending().await;
        command
            .update_schema(|schema| schema.description = "Bans a member".to_owned())
            .expect("schema edit should validate");
        let report = synchronizer.sync_pending().await;

        assert_eq!(
            report.committed,
            vec![(command.name().clone(), RemoteOperation::UpdateInScope(guild))]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_ticks_never_overlap_remote_calls() {
        let registry = registry_with(&["alpha", "beta", "gamma"]);
        let remote = Arc::new(InMemoryRemoteCommandApi::new().with_latency(Duration::from_millis(50)));
        let synchronizer =
            CommandSynchronizer::new(Arc::clone(&registry), Arc::clone(&remote), SyncConfig::default());

        let (first, second) = tokio::join!(synchronizer.sync_pending(), synchronizer.sync_pending());

        assert_eq!(first.attempted() + second.attempted(), 3);
        assert_eq!(remote.max_concurrent_calls(), 1);
        assert!(registry.dirty_commands().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn periodic_task_ticks_until_stopped() {
        let registry = registry_with(&["ping"]);
        let remote = Arc::new(InMemoryRemoteCommandApi::new());
        let synchronizer = CommandSynchronizer::new(
            Arc::clone(&registry),
            Arc::clone(&remote),
            SyncConfig::default()
                .with_interval(Duration::from_secs(20))
                .without_initial_sync(),
        );
        let shutdown = CancellationToken::new();
        let handle = synchronizer.spawn(&shutdown);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(remote.calls().is_empty());

        tokio::time::sleep(Duration::from_secs(15)).await;
        assert_eq!(remote.calls().len(), 1);

        handle.stop().await;
        registry
            .command("ping")
            .expect("ping should exist")
            .update_schema(|schema| schema.description = "after stop".to_owned())
            .expect("schema edit should validate");
        tokio::time::sleep(Duration::from_secs(60)).await;

        assert_eq!(remote.calls().len(), 1);
    }
}
