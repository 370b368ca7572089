//! Authorization gate

use std::sync::Arc;

use crate::application::registry::RoleRegistry;
use crate::domain::entities::{Tier, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Denied,
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed)
    }
}

/// Decides whether a sender may run a command of a given tier
pub struct AuthorizationGate {
    roles: Arc<RoleRegistry>,
}

impl AuthorizationGate {
    pub fn new(roles: Arc<RoleRegistry>) -> Self {
        Self { roles }
    }

    pub async fn authorize(&self, sender: UserId, tier: Tier) -> Decision {
        let allowed = match tier {
            Tier::Any => true,
            Tier::AdminOnly => self.roles.is_admin(sender).await,
            Tier::AdminOrModerator => {
                self.roles.is_admin(sender).await || self.roles.is_moderator(sender).await
            }
        };

        if allowed {
            Decision::Allowed
        } else {
            Decision::Denied
        }
    }
}
