//! Port contracts for command synchronisation and interaction dispatch.

mod identity;
mod remote;

pub use identity::{IdentityDirectory, IdentityError, IdentityResult};
#[cfg(test)]
pub use remote::MockRemoteCommandApi;
pub use remote::{RemoteCommandApi, RemoteCommandError, RemoteCommandResult, RemoteOperation};
