//! Interaction registry and remote command synchronisation.
//!
//! Keeps the authoritative in-process catalogue of commands and buttons,
//! reconciles commands against the remote platform on a fixed schedule, and
//! routes inbound interaction events to the handler bound to each entry.
//! The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
