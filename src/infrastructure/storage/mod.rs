//! File-based storage implementation

use async_trait::async_trait;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::domain::traits::{Collection, Store};
use crate::domain::entities::{CommandEntry, UserId};
use crate::application::errors::StorageError;
use crate::infrastructure::config::StorageConfig;

#[cfg(test)]
pub mod memory;

/// JSON file-based store, one file per collection
pub struct JsonStore {
    directory: PathBuf,
    admins_path: PathBuf,
    moderators_path: PathBuf,
    commands_path: PathBuf,
}

impl JsonStore {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            directory: config.directory.clone(),
            admins_path: config.directory.join(&config.admins_file),
            moderators_path: config.directory.join(&config.moderators_file),
            commands_path: config.directory.join(&config.commands_file),
        }
    }

    /// Create the data directory if missing
    pub async fn init(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.directory).await?;
        Ok(())
    }

    fn path(&self, collection: Collection) -> &Path {
        match collection {
            Collection::Admins => &self.admins_path,
            Collection::Moderators => &self.moderators_path,
            Collection::Commands => &self.commands_path,
        }
    }

    /// Read a collection file, `None` if it does not exist yet
    async fn read(&self, collection: Collection) -> Result<Option<String>, StorageError> {
        let path = self.path(collection);
        match tokio::fs::read_to_string(path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::warn!("{} not found, starting with empty {}", path.display(), collection.name());
                Ok(None)
            }
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    /// Replace a collection file via write-then-rename
    async fn write<T: Serialize + ?Sized>(&self, collection: Collection, value: &T) -> Result<(), StorageError> {
        let bytes = to_pretty_json(value).map_err(|e| serialization(collection, e))?;
        let path = self.path(collection);
        let tmp = path.with_extension("json.tmp");

        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, path).await?;
        tracing::debug!("Saved {} to {}", collection.name(), path.display());
        Ok(())
    }
}

/// Pretty JSON with four-space indentation
fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(buf)
}

fn serialization(collection: Collection, e: serde_json::Error) -> StorageError {
    StorageError::Serialization {
        collection: collection.name().to_string(),
        message: e.to_string(),
    }
}

/// Serializes entries as a JSON object, keys in table order
struct CommandMapRef<'a>(&'a [CommandEntry]);

impl Serialize for CommandMapRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|e| (&e.token, &e.response)))
    }
}

/// Deserializes a JSON object into entries, keeping key order
struct CommandMap(Vec<CommandEntry>);

impl<'de> Deserialize<'de> for CommandMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CommandMapVisitor;

        impl<'de> Visitor<'de> for CommandMapVisitor {
            type Value = CommandMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of command tokens to responses")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries: Vec<CommandEntry> = Vec::new();
                while let Some((token, response)) = access.next_entry::<String, String>()? {
                    match entries.iter_mut().find(|e| e.token == token) {
                        Some(existing) => existing.response = response,
                        None => entries.push(CommandEntry { token, response }),
                    }
                }
                Ok(CommandMap(entries))
            }
        }

        deserializer.deserialize_map(CommandMapVisitor)
    }
}

#[async_trait]
impl Store for JsonStore {
    async fn load_ids(&self, collection: Collection) -> Result<Vec<UserId>, StorageError> {
        match self.read(collection).await? {
            Some(content) => serde_json::from_str(&content).map_err(|e| serialization(collection, e)),
            None => Ok(Vec::new()),
        }
    }

    async fn save_ids(&self, collection: Collection, ids: &[UserId]) -> Result<(), StorageError> {
        if collection == Collection::Commands {
            return Err(StorageError::Serialization {
                collection: collection.name().to_string(),
                message: "not an identity list".to_string(),
            });
        }
        self.write(collection, ids).await
    }

    async fn load_commands(&self) -> Result<Vec<CommandEntry>, StorageError> {
        match self.read(Collection::Commands).await? {
            Some(content) => serde_json::from_str::<CommandMap>(&content)
                .map(|map| map.0)
                .map_err(|e| serialization(Collection::Commands, e)),
            None => Ok(Vec::new()),
        }
    }

    async fn save_commands(&self, entries: &[CommandEntry]) -> Result<(), StorageError> {
        self.write(Collection::Commands, &CommandMapRef(entries)).await
    }
}
