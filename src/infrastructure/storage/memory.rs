//! In-memory store for tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::application::errors::StorageError;
use crate::domain::entities::{CommandEntry, UserId};
use crate::domain::traits::{Collection, Store};

/// Store that keeps collections in memory and counts successful saves
#[derive(Default)]
pub struct MemoryStore {
    ids: Mutex<HashMap<Collection, Vec<UserId>>>,
    commands: Mutex<Vec<CommandEntry>>,
    saves: AtomicUsize,
    fail: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_roles(admins: &[i64], moderators: &[i64]) -> Self {
        let store = Self::new();
        {
            let mut ids = store.ids.lock().unwrap();
            ids.insert(Collection::Admins, admins.iter().copied().map(UserId).collect());
            ids.insert(Collection::Moderators, moderators.iter().copied().map(UserId).collect());
        }
        store
    }

    pub fn with_commands(entries: &[(&str, &str)]) -> Self {
        let store = Self::new();
        *store.commands.lock().unwrap() = entries
            .iter()
            .map(|(token, response)| CommandEntry::new(*token, *response))
            .collect();
        store
    }

    /// Make every subsequent save fail
    pub fn fail_saves(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn ids(&self, collection: Collection) -> Vec<UserId> {
        self.ids.lock().unwrap().get(&collection).cloned().unwrap_or_default()
    }

    pub fn commands(&self) -> Vec<CommandEntry> {
        self.commands.lock().unwrap().clone()
    }

    fn check_fail(&self) -> Result<(), StorageError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StorageError::Io(io::Error::new(io::ErrorKind::Other, "disk full")));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn load_ids(&self, collection: Collection) -> Result<Vec<UserId>, StorageError> {
        Ok(self.ids(collection))
    }

    async fn save_ids(&self, collection: Collection, ids: &[UserId]) -> Result<(), StorageError> {
        self.check_fail()?;
        self.ids.lock().unwrap().insert(collection, ids.to_vec());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn load_commands(&self) -> Result<Vec<CommandEntry>, StorageError> {
        Ok(self.commands())
    }

    async fn save_commands(&self, entries: &[CommandEntry]) -> Result<(), StorageError> {
        self.check_fail()?;
        *self.commands.lock().unwrap() = entries.to_vec();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
