//! Role-gated command bot: admins and moderators manage a table of custom
//! chat commands through a small set of built-in management commands.

pub mod domain;
pub mod application;
pub mod infrastructure;
