//! UMA resource synchronization library crate.
//!
//! Registers an application's entity types as UMA resource sets on an
//! authorization server, with each entity's permitted operations as scopes.

pub mod config;
pub mod errors;
pub mod registry;
pub mod slug;
pub mod sync;
pub mod uma;
