use serde::{Deserialize, Serialize};

use super::UserId;

/// Authorization level required to run a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    AdminOnly,
    AdminOrModerator,
    Any,
}

/// A custom command stored in the command table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandEntry {
    pub token: String,
    pub response: String,
}

impl CommandEntry {
    pub fn new(token: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            response: response.into(),
        }
    }
}

/// One parsed inbound command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub sender: UserId,
    pub token: String,
    pub args: Vec<String>,
}

impl CommandInvocation {
    pub fn new(sender: UserId, token: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            sender,
            token: token.into(),
            args,
        }
    }

    /// Token as addressed to `username`: a `@username` suffix naming this
    /// bot is dropped, any other suffix stays part of the token
    pub fn token_for(&self, username: Option<&str>) -> &str {
        match username {
            Some(username) => strip_mention(&self.token, username),
            None => &self.token,
        }
    }
}

/// Drop a trailing `@username` when it names `username`. Telegram usernames
/// are case-insensitive.
pub fn strip_mention<'a>(token: &'a str, username: &str) -> &'a str {
    match token.rsplit_once('@') {
        Some((bare, mention)) if !bare.is_empty() && mention.eq_ignore_ascii_case(username) => bare,
        _ => token,
    }
}

/// Management commands handled by the dispatcher itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    AddCommand,
    RemoveCommand,
    ListCommands,
    AssignRole,
    ViewRoles,
}

impl Builtin {
    pub const ALL: [Builtin; 5] = [
        Builtin::AddCommand,
        Builtin::RemoveCommand,
        Builtin::AssignRole,
        Builtin::ViewRoles,
        Builtin::ListCommands,
    ];

    /// Resolve a token (marker included) to a built-in
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "/add_command" | "/add-command" => Some(Builtin::AddCommand),
            "/remove_command" | "/remove-command" => Some(Builtin::RemoveCommand),
            "/help" | "/list_commands" | "/list-commands" => Some(Builtin::ListCommands),
            "/assign" | "/assign_role" | "/assign-role" => Some(Builtin::AssignRole),
            "/view_roles" | "/view-roles" => Some(Builtin::ViewRoles),
            _ => None,
        }
    }

    pub fn tier(&self) -> Tier {
        match self {
            Builtin::ListCommands => Tier::AdminOrModerator,
            _ => Tier::AdminOnly,
        }
    }

    /// Action name used in logs and audit records
    pub fn action(&self) -> &'static str {
        match self {
            Builtin::AddCommand => "add_command",
            Builtin::RemoveCommand => "remove_command",
            Builtin::ListCommands => "list_commands",
            Builtin::AssignRole => "assign_role",
            Builtin::ViewRoles => "view_roles",
        }
    }

    /// Telegram command name (no slash)
    pub fn command_name(&self) -> &'static str {
        match self {
            Builtin::AddCommand => "add_command",
            Builtin::RemoveCommand => "remove_command",
            Builtin::ListCommands => "help",
            Builtin::AssignRole => "assign",
            Builtin::ViewRoles => "view_roles",
        }
    }

    pub fn usage(&self) -> &'static str {
        match self {
            Builtin::AddCommand => "/add_command <command> <response>",
            Builtin::RemoveCommand => "/remove_command <command>",
            Builtin::ListCommands => "/help",
            Builtin::AssignRole => "/assign <admin|moderator> <add|remove> <user_id>",
            Builtin::ViewRoles => "/view_roles",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Builtin::AddCommand => "Add a new command (Admins only)",
            Builtin::RemoveCommand => "Remove an existing command (Admins only)",
            Builtin::ListCommands => "Show this help message",
            Builtin::AssignRole => "Assign roles (Admins only)",
            Builtin::ViewRoles => "List admins and moderators (Admins only)",
        }
    }
}
