//! Audit log storage — trait + in-memory and append-only JSONL backends.
//!
//! The audit log is the canonical history of a case: every entry gets a
//! store-assigned monotonic id and timestamp, entries are never mutated or
//! removed, and `history` orders by `(created_at, id)` ascending. Failures
//! are storage-layer only; application-level conditions never make a
//! record call fail.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use casetrail_core::{AuditAction, CaseId};

/// Errors from audit storage operations.
#[derive(Debug, thiserror::Error)]
pub enum AuditStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// One appended action against a case.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditLogEntry {
    /// Monotonic, store-assigned.
    pub id: u64,
    pub case_id: CaseId,
    pub action: AuditAction,
    /// Structured payload; for `sar_generated` this is the serialized
    /// reasoning trace.
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Trait for audit persistence backends.
pub trait AuditStore: Send + Sync {
    /// Append an entry, assigning its id and timestamp. A successful
    /// return means the entry is durably stored.
    fn record(
        &self,
        case_id: CaseId,
        action: AuditAction,
        details: serde_json::Value,
    ) -> Result<AuditLogEntry, AuditStoreError>;

    /// A case's history, ordered by `(created_at, id)` ascending.
    fn history(&self, case_id: CaseId) -> Result<Vec<AuditLogEntry>, AuditStoreError>;
}

// ── In-memory store ───────────────────────────────────────────────

#[derive(Default)]
struct MemoryLog {
    entries: Vec<AuditLogEntry>,
    next_id: u64,
}

/// Append-only in-memory audit store.
#[derive(Default)]
pub struct InMemoryAuditStore {
    inner: Mutex<MemoryLog>,
}

impl InMemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AuditStore for InMemoryAuditStore {
    fn record(
        &self,
        case_id: CaseId,
        action: AuditAction,
        details: serde_json::Value,
    ) -> Result<AuditLogEntry, AuditStoreError> {
        let mut log = self.inner.lock().expect("audit log lock poisoned");
        log.next_id += 1;
        let entry = AuditLogEntry {
            id: log.next_id,
            case_id,
            action,
            details,
            created_at: Utc::now(),
        };
        log.entries.push(entry.clone());
        drop(log);

        tracing::debug!(case_id = %case_id, action = %action, "Audit entry recorded");
        Ok(entry)
    }

    fn history(&self, case_id: CaseId) -> Result<Vec<AuditLogEntry>, AuditStoreError> {
        let log = self.inner.lock().expect("audit log lock poisoned");
        let mut entries: Vec<AuditLogEntry> = log
            .entries
            .iter()
            .filter(|e| e.case_id == case_id)
            .cloned()
            .collect();
        drop(log);

        entries.sort_by_key(|e| (e.created_at, e.id));
        Ok(entries)
    }
}

// ── JSONL store ───────────────────────────────────────────────────

struct JsonlState {
    file: File,
    next_id: u64,
}

/// Append-only JSONL audit store: one entry per line, synced to disk
/// before `record` returns. Ids continue from whatever the file already
/// contains, so the log survives restarts.
pub struct JsonlAuditStore {
    path: PathBuf,
    state: Mutex<JsonlState>,
}

impl JsonlAuditStore {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, AuditStoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let next_id = Self::read_entries(&path)?
            .iter()
            .map(|e| e.id)
            .max()
            .unwrap_or(0);

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            state: Mutex::new(JsonlState { file, next_id }),
        })
    }

    fn read_entries(path: &PathBuf) -> Result<Vec<AuditLogEntry>, AuditStoreError> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(path)?;
        let mut entries = Vec::new();
        for line in raw.lines().filter(|l| !l.trim().is_empty()) {
            entries.push(serde_json::from_str(line)?);
        }
        Ok(entries)
    }
}

impl AuditStore for JsonlAuditStore {
    fn record(
        &self,
        case_id: CaseId,
        action: AuditAction,
        details: serde_json::Value,
    ) -> Result<AuditLogEntry, AuditStoreError> {
        let mut state = self.state.lock().expect("audit log lock poisoned");
        let entry = AuditLogEntry {
            id: state.next_id + 1,
            case_id,
            action,
            details,
            created_at: Utc::now(),
        };

        let mut line = serde_json::to_string(&entry)?;
        line.push('\n');
        state.file.write_all(line.as_bytes())?;
        state.file.sync_all()?;
        state.next_id = entry.id;
        drop(state);

        tracing::debug!(case_id = %case_id, action = %action, "Audit entry appended");
        Ok(entry)
    }

    fn history(&self, case_id: CaseId) -> Result<Vec<AuditLogEntry>, AuditStoreError> {
        // Hold the append lock so a concurrent half-written line is never read.
        let _state = self.state.lock().expect("audit log lock poisoned");
        let mut entries: Vec<AuditLogEntry> = Self::read_entries(&self.path)?
            .into_iter()
            .filter(|e| e.case_id == case_id)
            .collect();
        entries.sort_by_key(|e| (e.created_at, e.id));
        Ok(entries)
    }
}
