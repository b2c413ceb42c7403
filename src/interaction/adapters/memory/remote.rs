//! In-memory remote command registry adapter.

use crate::interaction::{
    domain::TargetId,
    ports::{RemoteCommandApi, RemoteCommandError, RemoteCommandResult, RemoteOperation},
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// One recorded remote write.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteCall {
    /// Write that was issued.
    pub operation: RemoteOperation,
    /// Command name taken from the payload.
    pub command: String,
    /// When the call started.
    pub started_at: Instant,
    /// When the call returned.
    pub finished_at: Instant,
    /// Whether the call succeeded.
    pub succeeded: bool,
}

/// In-memory stand-in for the remote platform's command registry.
///
/// Keeps the resulting remote catalogue, records every call with start and
/// end instants, and supports failure injection and artificial latency.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRemoteCommandApi {
    state: Arc<Mutex<RemoteState>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    latency: Duration,
}

#[derive(Debug, Default)]
struct RemoteState {
    global: BTreeMap<String, Value>,
    scoped: HashMap<TargetId, BTreeMap<String, Value>>,
    calls: Vec<RemoteCall>,
    pending_failures: usize,
    rejected_commands: HashSet<String>,
}

impl InMemoryRemoteCommandApi {
    /// Creates an empty remote registry that answers immediately.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every call by `latency` before it completes.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Fails the next `count` calls with a transport error.
    pub fn fail_next(&self, count: usize) {
        self.lock().pending_failures += count;
    }

    /// Rejects every write for `command` until [`Self::accept_command`].
    pub fn reject_command(&self, command: impl Into<String>) {
        self.lock().rejected_commands.insert(command.into());
    }

    /// Stops rejecting writes for `command`.
    pub fn accept_command(&self, command: &str) {
        self.lock().rejected_commands.remove(command);
    }

    /// Returns every recorded call in completion order.
    #[must_use]
    pub fn calls(&self) -> Vec<RemoteCall> {
        self.lock().calls.clone()
    }

    /// Returns the highest number of calls observed in flight at once.
    #[must_use]
    pub fn max_concurrent_calls(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Returns the payload of a global command as last accepted.
    #[must_use]
    pub fn global_command(&self, command: &str) -> Option<Value> {
        self.lock().global.get(command).cloned()
    }

    /// Returns the payload of a scoped command as last accepted.
    #[must_use]
    pub fn scoped_command(&self, target: &TargetId, command: &str) -> Option<Value> {
        self.lock()
            .scoped
            .get(target)
            .and_then(|commands| commands.get(command))
            .cloned()
    }

    fn lock(&self) -> MutexGuard<'_, RemoteState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn record(&self, operation: RemoteOperation, payload: &Value) -> RemoteCommandResult<()> {
        let started_at = Instant::now();
        let concurrent = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(concurrent, Ordering::SeqCst);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let command = payload
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();

        let result = {
            let mut state = self.lock();
            let outcome = state.apply(&operation, &command, payload);
            state.calls.push(RemoteCall {
                operation,
                command,
                started_at,
                finished_at: Instant::now(),
                succeeded: outcome.is_ok(),
            });
            outcome
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

impl RemoteState {
    fn apply(
        &mut self,
        operation: &RemoteOperation,
        command: &str,
        payload: &Value,
    ) -> RemoteCommandResult<()> {
        if self.pending_failures > 0 {
            self.pending_failures -= 1;
            return Err(RemoteCommandError::transport(std::io::Error::other(
                "injected transport failure",
            )));
        }

        if command.is_empty() {
            return Err(RemoteCommandError::rejected("payload has no command name"));
        }

        if self.rejected_commands.contains(command) {
            return Err(RemoteCommandError::rejected(format!(
                "command '{command}' is rejected"
            )));
        }

        let catalogue = match operation {
            RemoteOperation::CreateGlobal | RemoteOperation::UpdateGlobal => &mut self.global,
            RemoteOperation::CreateInScope(target) | RemoteOperation::UpdateInScope(target) => {
                self.scoped.entry(target.clone()).or_default()
            }
        };

        if !operation.is_create() && !catalogue.contains_key(command) {
            return Err(RemoteCommandError::rejected(format!(
                "unknown command '{command}'"
            )));
        }

        catalogue.insert(command.to_owned(), payload.clone());
        Ok(())
    }
}

#[async_trait]
impl RemoteCommandApi for InMemoryRemoteCommandApi {
    async fn create_global(&self, payload: &Value) -> RemoteCommandResult<()> {
        self.record(RemoteOperation::CreateGlobal, payload).await
    }

    async fn update_global(&self, payload: &Value) -> RemoteCommandResult<()> {
        self.record(RemoteOperation::UpdateGlobal, payload).await
    }

    async fn create_in_scope(&self, target: &TargetId, payload: &Value) -> RemoteCommandResult<()> {
        self.record(RemoteOperation::CreateInScope(target.clone()), payload)
            .await
    }

    async fn update_in_scope(&self, target: &TargetId, payload: &Value) -> RemoteCommandResult<()> {
        self.record(RemoteOperation::UpdateInScope(target.clone()), payload)
            .await
    }
}
