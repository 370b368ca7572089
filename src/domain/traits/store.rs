use async_trait::async_trait;
use crate::application::errors::StorageError;
use crate::domain::entities::{CommandEntry, UserId};

/// Named durable collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Admins,
    Moderators,
    Commands,
}

impl Collection {
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Admins => "admins",
            Collection::Moderators => "moderators",
            Collection::Commands => "commands",
        }
    }
}

/// Store trait - abstraction for data persistence
///
/// Every save rewrites the whole collection. Loading a collection that was
/// never saved yields an empty one.
#[async_trait]
pub trait Store: Send + Sync {
    // Identity lists (admins, moderators)
    async fn load_ids(&self, collection: Collection) -> Result<Vec<UserId>, StorageError>;
    async fn save_ids(&self, collection: Collection, ids: &[UserId]) -> Result<(), StorageError>;

    // Command table, in table order
    async fn load_commands(&self) -> Result<Vec<CommandEntry>, StorageError>;
    async fn save_commands(&self, entries: &[CommandEntry]) -> Result<(), StorageError>;
}
