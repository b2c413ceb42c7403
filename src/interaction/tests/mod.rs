//! Unit tests for the interaction module.
//!
//! Exercises dispatch and the command sync lifecycle through the in-memory
//! adapters.
