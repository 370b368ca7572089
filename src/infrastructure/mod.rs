//! Infrastructure layer - External concerns
//! 
//! This layer contains:
//! - Config: Configuration loading
//! - Logging: Tracing subscriber setup
//! - Storage: Data persistence
//! - Adapters: Platform integrations (Telegram, console)

pub mod config;
pub mod logging;
pub mod storage;
pub mod adapters;
