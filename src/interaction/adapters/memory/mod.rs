//! In-memory adapters for the interaction ports.
//!
//! Suitable for unit and integration tests and for local deterministic
//! flows without a live platform connection.

mod identity;
mod remote;
mod responder;

pub use identity::InMemoryIdentityDirectory;
pub use remote::{InMemoryRemoteCommandApi, RemoteCall};
pub use responder::RecordingResponder;
