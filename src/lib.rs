//! Switchboard: interaction registry for chat-platform applications.
//!
//! This crate keeps a local registry of invocable commands and interactive
//! buttons, keeps the remote platform's command set in step with it, and
//! routes inbound interactions to the handlers bound locally.
//!
//! # Architecture
//!
//! Switchboard follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (in-memory stand-ins)
//!
//! # Modules
//!
//! - [`interaction`]: Command and button registry, remote synchronisation,
//!   and event dispatch

pub mod interaction;
