//! Audit trail for authorization decisions, mutations and executions

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::entities::UserId;

/// One audit entry
#[derive(Debug, Clone, Serialize)]
pub struct AuditRecord {
    pub timestamp: String,
    pub invocation_id: Uuid,
    pub actor: i64,
    pub action: String,
    pub outcome: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl AuditRecord {
    pub fn new(invocation_id: Uuid, actor: UserId, action: &str, outcome: &str) -> Self {
        Self::at(Utc::now(), invocation_id, actor, action, outcome)
    }

    pub fn at(time: DateTime<Utc>, invocation_id: Uuid, actor: UserId, action: &str, outcome: &str) -> Self {
        Self {
            timestamp: time.to_rfc3339_opts(SecondsFormat::Millis, true),
            invocation_id,
            actor: actor.get(),
            action: action.to_string(),
            outcome: outcome.to_string(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Emits audit records to tracing (target `audit`) and optionally to a
/// JSON-lines file
pub struct AuditLog {
    file: Option<Mutex<tokio::fs::File>>,
    path: Option<PathBuf>,
}

impl AuditLog {
    /// Tracing-only audit log
    pub fn disabled() -> Self {
        Self { file: None, path: None }
    }

    /// Open (append) the audit file, creating parent directories
    pub async fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;

        Ok(Self {
            file: Some(Mutex::new(file)),
            path: Some(path.to_path_buf()),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub async fn record(&self, record: AuditRecord) {
        if record.outcome == "denied" {
            tracing::warn!(
                target: "audit",
                invocation = %record.invocation_id,
                actor = record.actor,
                action = %record.action,
                outcome = %record.outcome,
                "Unauthorized {} attempt by user {}", record.action, record.actor
            );
        } else {
            tracing::info!(
                target: "audit",
                invocation = %record.invocation_id,
                actor = record.actor,
                action = %record.action,
                outcome = %record.outcome,
                detail = record.detail.as_deref().unwrap_or(""),
                "audit"
            );
        }

        let Some(file) = &self.file else {
            return;
        };

        let mut line = match serde_json::to_vec(&record) {
            Ok(line) => line,
            Err(e) => {
                tracing::error!("Failed to encode audit record: {}", e);
                return;
            }
        };
        line.push(b'\n');

        let mut file = file.lock().await;
        if let Err(e) = file.write_all(&line).await {
            tracing::error!("Failed to write audit record: {}", e);
            return;
        }
        if let Err(e) = file.flush().await {
            tracing::error!("Failed to flush audit log: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_record_serialization() {
        let time = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let id = Uuid::nil();
        let record = AuditRecord::at(time, id, UserId(111), "add_command", "ok").with_detail("!greet");

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["timestamp"], "2024-05-01T12:30:00.000Z");
        assert_eq!(json["actor"], 111);
        assert_eq!(json["action"], "add_command");
        assert_eq!(json["outcome"], "ok");
        assert_eq!(json["detail"], "!greet");
        assert_eq!(json["invocation_id"], "00000000-0000-0000-0000-000000000000");
    }

    #[tokio::test]
    async fn test_records_append_as_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/audit.jsonl");

        let audit = AuditLog::open(&path).await.unwrap();
        audit.record(AuditRecord::new(Uuid::new_v4(), UserId(1), "view_roles", "ok")).await;
        audit.record(AuditRecord::new(Uuid::new_v4(), UserId(2), "view_roles", "denied")).await;

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["outcome"], "denied");
        assert!(lines[0].get("detail").is_none());
    }
}
