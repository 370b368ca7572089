//! Command dispatcher - Authorizes invocations and routes them to handlers

use std::sync::Arc;
use uuid::Uuid;

use crate::application::audit::AuditRecord;
use crate::application::auth::AuthorizationGate;
use crate::application::errors::CommandError;
use crate::application::registry::{CommandTable, Membership, Removal, RoleRegistry, Upsert};
use crate::domain::entities::{strip_mention, Builtin, CommandInvocation, ParseMode, Role, Tier, UserId};

/// Reply to send back to the chat the invocation came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub parse_mode: Option<ParseMode>,
    /// Delete the triggering message once the reply is sent
    pub delete_trigger: bool,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parse_mode: None,
            delete_trigger: false,
        }
    }
}

/// Result of dispatching one invocation. `reply: None` means stay silent.
#[derive(Debug, Clone)]
pub struct Dispatch {
    pub reply: Option<Reply>,
    pub audit: Option<AuditRecord>,
}

impl Dispatch {
    fn ignored() -> Self {
        Self { reply: None, audit: None }
    }

    fn silent(record: AuditRecord) -> Self {
        Self { reply: None, audit: Some(record) }
    }

    fn reply(reply: Reply, record: AuditRecord) -> Self {
        Self { reply: Some(reply), audit: Some(record) }
    }
}

/// Successful handler result
struct Handled {
    text: String,
    outcome: &'static str,
    detail: Option<String>,
}

impl Handled {
    fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            outcome: "ok",
            detail: None,
        }
    }

    fn noop(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            outcome: "noop",
            detail: None,
        }
    }

    fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Routes invocations to built-in handlers or the custom command table
pub struct Dispatcher {
    roles: Arc<RoleRegistry>,
    commands: Arc<CommandTable>,
    gate: AuthorizationGate,
    /// Username whose `@mention` suffix is dropped from tokens
    bot_username: Option<String>,
}

impl Dispatcher {
    pub fn new(roles: Arc<RoleRegistry>, commands: Arc<CommandTable>) -> Self {
        Self {
            gate: AuthorizationGate::new(roles.clone()),
            roles,
            commands,
            bot_username: None,
        }
    }

    pub fn with_bot_username(mut self, username: impl Into<String>) -> Self {
        self.bot_username = Some(username.into());
        self
    }

    /// Command token with a mention of this bot removed
    fn own_token<'a>(&self, token: &'a str) -> &'a str {
        match &self.bot_username {
            Some(username) => strip_mention(token, username),
            None => token,
        }
    }

    pub async fn dispatch(&self, invocation: &CommandInvocation) -> Dispatch {
        let invocation_id = Uuid::new_v4();
        let token = invocation.token_for(self.bot_username.as_deref());

        match Builtin::from_token(token) {
            Some(builtin) => self.dispatch_builtin(invocation_id, builtin, invocation).await,
            None => self.dispatch_custom(invocation_id, token, invocation).await,
        }
    }

    async fn dispatch_builtin(&self, invocation_id: Uuid, builtin: Builtin, inv: &CommandInvocation) -> Dispatch {
        let action = builtin.action();
        if !self.gate.authorize(inv.sender, builtin.tier()).await.is_allowed() {
            let outcome = CommandError::PermissionDenied.outcome();
            return Dispatch::silent(AuditRecord::new(invocation_id, inv.sender, action, outcome));
        }

        let result = match builtin {
            Builtin::AddCommand => self.add_command(inv.sender, &inv.args).await,
            Builtin::RemoveCommand => self.remove_command(inv.sender, &inv.args).await,
            Builtin::ListCommands => Ok(self.list_commands().await),
            Builtin::AssignRole => self.assign_role(inv.sender, &inv.args).await,
            Builtin::ViewRoles => Ok(self.view_roles().await),
        };

        match result {
            Ok(handled) => {
                let mut record = AuditRecord::new(invocation_id, inv.sender, action, handled.outcome);
                if let Some(detail) = handled.detail {
                    record = record.with_detail(detail);
                }
                Dispatch::reply(Reply::text(handled.text), record)
            }
            Err(e) => {
                if let CommandError::Persistence(err) = &e {
                    tracing::error!("{} by user {} applied in memory but not saved: {}", action, inv.sender, err);
                }
                let text = match &e {
                    CommandError::MalformedIdentity(_) => format!("{}\nUsage: {}", e, builtin.usage()),
                    _ => e.to_string(),
                };
                let record = AuditRecord::new(invocation_id, inv.sender, action, e.outcome());
                Dispatch::reply(Reply::text(text), record)
            }
        }
    }

    async fn dispatch_custom(&self, invocation_id: Uuid, token: &str, inv: &CommandInvocation) -> Dispatch {
        let Some(response) = self.commands.lookup(token).await else {
            if self.roles.is_admin(inv.sender).await || self.roles.is_moderator(inv.sender).await {
                tracing::debug!("No command registered for {} (user {})", token, inv.sender);
            } else {
                tracing::warn!("Unauthorized command attempt by user {}: {}", inv.sender, token);
            }
            return Dispatch::ignored();
        };

        let record = |outcome: &str| {
            AuditRecord::new(invocation_id, inv.sender, "custom_command", outcome).with_detail(token)
        };

        if !self.gate.authorize(inv.sender, Tier::AdminOrModerator).await.is_allowed() {
            return Dispatch::silent(record(CommandError::PermissionDenied.outcome()));
        }

        tracing::info!("Command {} executed by user {}", token, inv.sender);
        let reply = Reply {
            text: response,
            parse_mode: Some(ParseMode::Markdown),
            delete_trigger: true,
        };
        Dispatch::reply(reply, record("ok"))
    }

    async fn add_command(&self, sender: UserId, args: &[String]) -> Result<Handled, CommandError> {
        if args.len() < 2 {
            return Err(usage(Builtin::AddCommand));
        }

        let token = self.own_token(&args[0]);
        let response = args[1..].join(" ");

        match self.commands.add(token, &response).await? {
            Upsert::Created => tracing::info!("Command {} added by admin {}", token, sender),
            Upsert::Replaced => tracing::warn!("Command {} overwritten by admin {}", token, sender),
        }
        Ok(Handled::ok(format!("Command {} added.", token)).with_detail(token))
    }

    async fn remove_command(&self, sender: UserId, args: &[String]) -> Result<Handled, CommandError> {
        let [token] = args else {
            return Err(usage(Builtin::RemoveCommand));
        };
        let token = self.own_token(token);

        match self.commands.remove(token).await? {
            Removal::Removed => {
                tracing::info!("Command {} removed by admin {}", token, sender);
                Ok(Handled::ok(format!("Command {} removed.", token)).with_detail(token))
            }
            Removal::NotFound => Err(CommandError::NotFound(format!("Command {} does not exist.", token))),
        }
    }

    async fn list_commands(&self) -> Handled {
        let mut lines: Vec<String> = Builtin::ALL
            .iter()
            .map(|b| format!("{} - {}", b.usage(), b.description()))
            .collect();

        lines.push("Custom Commands:".to_string());
        let entries = self.commands.list_all().await;
        if entries.is_empty() {
            lines.push("(none)".to_string());
        }
        lines.extend(entries.iter().map(|e| format!("{} - {}", e.token, e.response)));

        Handled::ok(format!("Available commands:\n{}", lines.join("\n")))
    }

    async fn view_roles(&self) -> Handled {
        let admins = join_ids(&self.roles.list_admins().await, "No admins.");
        let moderators = join_ids(&self.roles.list_moderators().await, "No moderators.");

        Handled::ok(format!("Admins:\n{}\n\nModerators:\n{}", admins, moderators))
    }

    async fn assign_role(&self, sender: UserId, args: &[String]) -> Result<Handled, CommandError> {
        let [role, action, target] = args else {
            return Err(usage(Builtin::AssignRole));
        };

        let target: UserId = target
            .parse()
            .map_err(|_| CommandError::MalformedIdentity(target.clone()))?;
        let role: Role = role
            .parse()
            .map_err(|_| CommandError::InvalidChoice("Invalid role. Use \"admin\" or \"moderator\"."))?;

        let membership = match action.as_str() {
            "add" => self.roles.add(role, target).await?,
            "remove" => self.roles.remove(role, target).await?,
            _ => return Err(CommandError::InvalidChoice("Invalid action. Use \"add\" or \"remove\".")),
        };

        let detail = format!("{} {} {}", role, action, target);
        let handled = match membership {
            Membership::Added => {
                tracing::info!("User {} added as {} by {}", target, role, sender);
                Handled::ok(format!("User {} added as {}.", target, role))
            }
            Membership::Removed => {
                tracing::info!("User {} removed from {} by {}", target, role.plural(), sender);
                Handled::ok(format!("User {} removed from {}.", target, role.plural()))
            }
            Membership::AlreadyPresent => {
                Handled::noop(format!("User {} is already {}.", target, role.with_article()))
            }
            Membership::NotPresent => Handled::noop(format!("User {} is not {}.", target, role.with_article())),
        };
        Ok(handled.with_detail(detail))
    }
}

fn usage(builtin: Builtin) -> CommandError {
    CommandError::Usage(format!("Usage: {}", builtin.usage()))
}

fn join_ids(ids: &[UserId], empty: &str) -> String {
    if ids.is_empty() {
        return empty.to_string();
    }
    ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join("\n")
}
