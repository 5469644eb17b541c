//! File-based snapshot of remote reference data at ~/.moving_estimate/reference.json.
//!
//! TTL: 30 days. Entries are keyed by source URL. Stale snapshots are kept
//! on disk and only served when the remote source cannot be reached.

use super::types::ReferenceRow;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

const SNAPSHOT_TTL_MS: i64 = 30 * 24 * 3600 * 1000; // 30 days in ms

#[derive(Serialize, Deserialize, Clone)]
struct SnapshotEntry {
    timestamp: i64,
    rows: Vec<ReferenceRow>,
}

/// The reference data snapshot cache.
pub struct SnapshotCache {
    path: PathBuf,
    entries: HashMap<String, SnapshotEntry>,
}

impl SnapshotCache {
    /// Load from the default location (~/.moving_estimate/reference.json).
    pub fn load() -> Self {
        Self::load_from(Self::default_path())
    }

    /// Load from a specific path. A missing or unreadable file yields an empty cache.
    pub fn load_from(path: PathBuf) -> Self {
        let entries = Self::read_file(&path).unwrap_or_default();
        Self { path, entries }
    }

    pub fn default_path() -> PathBuf {
        crate::config::data_dir().join("reference.json")
    }

    fn read_file(path: &Path) -> Option<HashMap<String, SnapshotEntry>> {
        let data = fs::read_to_string(path).ok()?;
        match serde_json::from_str(&data) {
            Ok(entries) => Some(entries),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable reference snapshot");
                None
            }
        }
    }

    /// Rows for `origin` if a snapshot younger than the TTL exists.
    pub fn get_fresh(&self, origin: &str) -> Option<Vec<ReferenceRow>> {
        let entry = self.entries.get(origin)?;
        let now = chrono::Utc::now().timestamp_millis();
        if now - entry.timestamp > SNAPSHOT_TTL_MS {
            return None; // expired
        }
        Some(entry.rows.clone())
    }

    /// Rows for `origin` regardless of age.
    pub fn get_stale(&self, origin: &str) -> Option<Vec<ReferenceRow>> {
        self.entries.get(origin).map(|e| e.rows.clone())
    }

    /// Store a snapshot and persist to disk.
    pub fn put(&mut self, origin: &str, rows: &[ReferenceRow]) {
        let entry = SnapshotEntry {
            timestamp: chrono::Utc::now().timestamp_millis(),
            rows: rows.to_vec(),
        };
        self.entries.insert(origin.to_string(), entry);
        self.persist();
    }

    fn persist(&self) {
        if let Some(parent) = self.path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        match serde_json::to_string_pretty(&self.entries) {
            Ok(json) => {
                if let Err(e) = fs::write(&self.path, json) {
                    tracing::warn!(path = %self.path.display(), error = %e, "could not write reference snapshot");
                }
            }
            Err(e) => tracing::warn!(error = %e, "could not serialize reference snapshot"),
        }
    }

    /// Number of cached sources.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
