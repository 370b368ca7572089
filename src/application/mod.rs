//! Application layer - Use cases and business logic
//! 
//! This layer contains:
//! - Registry: Role registry and custom command table
//! - Auth: Authorization gate
//! - Audit: Structured audit records
//! - Messaging: Message parsing and command dispatching
//! - Services: Message loop orchestration
//! - Errors: Domain-specific errors

pub mod errors;
pub mod registry;
pub mod auth;
pub mod audit;
pub mod messaging;
pub mod services;
