//! Custom command table

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::application::errors::StorageError;
use crate::domain::entities::CommandEntry;
use crate::domain::traits::Store;

/// Result of adding a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Created,
    Replaced,
}

/// Result of removing a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Removed,
    NotFound,
}

/// Token to response mapping, kept in insertion order
pub struct CommandTable {
    entries: RwLock<Vec<CommandEntry>>,
    store: Arc<dyn Store>,
}

impl CommandTable {
    pub async fn load(store: Arc<dyn Store>) -> Result<Self, StorageError> {
        let entries = store.load_commands().await?;
        tracing::info!("Loaded {} custom commands", entries.len());

        Ok(Self {
            entries: RwLock::new(entries),
            store,
        })
    }

    pub async fn lookup(&self, token: &str) -> Option<String> {
        self.entries
            .read()
            .await
            .iter()
            .find(|entry| entry.token == token)
            .map(|entry| entry.response.clone())
    }

    /// Insert or overwrite. A replaced entry keeps its position.
    pub async fn add(&self, token: &str, response: &str) -> Result<Upsert, StorageError> {
        let mut entries = self.entries.write().await;
        let upsert = match entries.iter_mut().find(|entry| entry.token == token) {
            Some(entry) => {
                entry.response = response.to_string();
                Upsert::Replaced
            }
            None => {
                entries.push(CommandEntry::new(token, response));
                Upsert::Created
            }
        };

        self.store.save_commands(&entries).await?;
        Ok(upsert)
    }

    pub async fn remove(&self, token: &str) -> Result<Removal, StorageError> {
        let mut entries = self.entries.write().await;
        let Some(pos) = entries.iter().position(|entry| entry.token == token) else {
            return Ok(Removal::NotFound);
        };

        entries.remove(pos);
        self.store.save_commands(&entries).await?;
        Ok(Removal::Removed)
    }

    pub async fn list_all(&self) -> Vec<CommandEntry> {
        self.entries.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::memory::MemoryStore;

    async fn table(entries: &[(&str, &str)]) -> (CommandTable, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::with_commands(entries));
        let table = CommandTable::load(store.clone()).await.unwrap();
        (table, store)
    }

    #[tokio::test]
    async fn test_add_then_lookup() {
        let (table, store) = table(&[]).await;

        assert_eq!(table.add("!greet", "Hello there").await.unwrap(), Upsert::Created);
        assert_eq!(table.lookup("!greet").await.as_deref(), Some("Hello there"));
        assert_eq!(store.commands(), vec![CommandEntry::new("!greet", "Hello there")]);
    }

    #[tokio::test]
    async fn test_add_overwrites_in_place() {
        let (table, store) = table(&[("!a", "one"), ("!b", "two")]).await;

        assert_eq!(table.add("!a", "uno").await.unwrap(), Upsert::Replaced);
        assert_eq!(
            table.list_all().await,
            vec![CommandEntry::new("!a", "uno"), CommandEntry::new("!b", "two")]
        );
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn test_remove_unknown_does_not_persist() {
        let (table, store) = table(&[("!rules", "Be nice")]).await;

        assert_eq!(table.remove("!missing").await.unwrap(), Removal::NotFound);
        assert_eq!(table.list_all().await.len(), 1);
        assert_eq!(store.save_count(), 0);

        assert_eq!(table.remove("!rules").await.unwrap(), Removal::Removed);
        assert!(table.lookup("!rules").await.is_none());
        assert!(store.commands().is_empty());
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn test_lookup_is_exact() {
        let (table, _) = table(&[("!Greet", "hi")]).await;
        assert!(table.lookup("!greet").await.is_none());
        assert!(table.lookup("!Greet ").await.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_adds_all_persist() {
        let (table, store) = table(&[]).await;
        let table = Arc::new(table);

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let table = table.clone();
                tokio::spawn(async move {
                    table.add(&format!("!c{}", i), "x").await.unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(table.list_all().await.len(), 16);
        assert_eq!(store.commands().len(), 16);
        assert_eq!(store.save_count(), 16);
    }
}
