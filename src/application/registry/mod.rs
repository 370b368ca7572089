//! In-memory registries backed by a durable store

pub mod roles;
pub mod commands;

pub use roles::{Membership, RoleRegistry};
pub use commands::{CommandTable, Removal, Upsert};
