//! Durable, size-bounded query history.
//!
//! The store owns an in-memory newest-first sequence of entries
//! mirrored to a single JSON document on disk. Every mutation persists
//! the full sequence immediately; load failures degrade to an empty
//! store instead of failing startup. The file is assumed single-writer;
//! concurrent external writers are not coordinated.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use directories::BaseDirs;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::config::{APP_DIR, DEFAULT_MAX_HISTORY, HISTORY_DEDUP_WINDOW, HISTORY_FILE};
use crate::models::RecordType;

/// One row of query history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub domain: String,
    pub record_type: RecordType,
    pub nameserver: Option<String>,
    /// ISO-8601 on disk via chrono's RFC 3339 serialization.
    pub timestamp: DateTime<Utc>,
    pub status: String,
    pub query_time_ms: Option<u32>,
}

/// On-disk schema: `{ "entries": [ ... ] }`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct HistoryFile {
    #[serde(default)]
    entries: Vec<HistoryEntry>,
}

/// Aggregate statistics over the history.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryStats {
    pub total_queries: usize,
    pub unique_domains: usize,
    /// Record type with the highest count; ties go to the type
    /// encountered first during the scan. `None` for empty history.
    pub most_common_type: Option<String>,
    /// Percentage of entries with status NOERROR.
    pub success_rate: f64,
    /// Type code → count, in first-seen order.
    pub type_distribution: Vec<(String, usize)>,
}

impl HistoryStats {
    fn empty() -> Self {
        HistoryStats {
            total_queries: 0,
            unique_domains: 0,
            most_common_type: None,
            success_rate: 0.0,
            type_distribution: Vec::new(),
        }
    }
}

/// Newest-first, deduplicating, size-bounded query log.
#[derive(Debug)]
pub struct QueryHistory {
    max_entries: usize,
    entries: Vec<HistoryEntry>,
    path: PathBuf,
}

impl QueryHistory {
    /// Opens the per-user history file (`digger/history.json` under the
    /// XDG data directory) with the given capacity.
    pub fn open(max_entries: usize) -> Self {
        let path = match BaseDirs::new() {
            Some(dirs) => dirs.data_dir().join(APP_DIR).join(HISTORY_FILE),
            None => PathBuf::from(HISTORY_FILE),
        };
        Self::with_path(&path, max_entries)
    }

    /// Opens the default location with the default capacity.
    pub fn open_default() -> Self {
        Self::open(DEFAULT_MAX_HISTORY)
    }

    /// Opens an explicit history file, creating parent directories.
    pub fn with_path(path: &Path, max_entries: usize) -> Self {
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!("Could not create history directory {}: {e}", parent.display());
            }
        }
        let mut history = QueryHistory {
            max_entries,
            entries: Vec::new(),
            path: path.to_path_buf(),
        };
        history.load();
        history
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Loads entries from disk. A missing, corrupted, or schema-invalid
    /// file leaves the store empty rather than failing.
    fn load(&mut self) {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(_) => return,
        };
        match serde_json::from_str::<HistoryFile>(&contents) {
            Ok(file) => {
                self.entries = file.entries;
                self.entries
                    .sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
            }
            Err(e) => {
                warn!("Could not load history from {}: {e}", self.path.display());
                self.entries.clear();
            }
        }
    }

    /// Persists the full sequence. Write failures are logged, not
    /// propagated; the in-memory state stays authoritative.
    fn save(&self) {
        let file = HistoryFile {
            entries: self.entries.clone(),
        };
        let json = match serde_json::to_string_pretty(&file) {
            Ok(json) => json,
            Err(e) => {
                warn!("Could not serialize history: {e}");
                return;
            }
        };
        if let Err(e) = std::fs::write(&self.path, json) {
            warn!("Could not save history to {}: {e}", self.path.display());
        }
    }

    /// Records a completed query.
    ///
    /// A repeat of the same query (domain compared case-insensitively,
    /// plus record type and nameserver) within the dedup window replaces
    /// its existing entry at position 0 instead of appending, so
    /// retried queries do not inflate the history.
    pub fn add_entry(
        &mut self,
        domain: &str,
        record_type: RecordType,
        nameserver: Option<&str>,
        status: &str,
        query_time_ms: Option<u32>,
    ) {
        let now = Utc::now();
        let window = Duration::from_std(HISTORY_DEDUP_WINDOW).unwrap_or_else(|_| Duration::zero());

        let entry = HistoryEntry {
            domain: domain.to_string(),
            record_type,
            nameserver: nameserver.map(str::to_string),
            timestamp: now,
            status: status.to_string(),
            query_time_ms,
        };

        let duplicate = self.entries.iter().position(|existing| {
            existing.domain.eq_ignore_ascii_case(domain)
                && existing.record_type == record_type
                && existing.nameserver.as_deref() == nameserver
                && now.signed_duration_since(existing.timestamp) < window
        });

        if let Some(index) = duplicate {
            self.entries.remove(index);
            self.entries.insert(0, entry);
            self.save();
            return;
        }

        self.entries.insert(0, entry);
        if self.max_entries > 0 && self.entries.len() > self.max_entries {
            self.entries.truncate(self.max_entries);
        }
        self.save();
    }

    /// Returns a copy of the first `limit` entries, or all of them.
    pub fn get_entries(&self, limit: Option<usize>) -> Vec<HistoryEntry> {
        match limit {
            Some(limit) => self.entries.iter().take(limit).cloned().collect(),
            None => self.entries.clone(),
        }
    }

    /// Distinct domains in newest-first order of first occurrence.
    pub fn get_recent_domains(&self, limit: usize) -> Vec<String> {
        let mut domains: Vec<String> = Vec::new();
        for entry in &self.entries {
            if !domains.contains(&entry.domain) {
                domains.push(entry.domain.clone());
                if domains.len() >= limit {
                    break;
                }
            }
        }
        domains
    }

    /// Case-insensitive substring match against the domain.
    pub fn search_history(&self, query: &str) -> Vec<HistoryEntry> {
        let query = query.to_lowercase();
        self.entries
            .iter()
            .filter(|entry| entry.domain.to_lowercase().contains(&query))
            .cloned()
            .collect()
    }

    /// Aggregate statistics; zeroed defaults for an empty history.
    pub fn get_stats(&self) -> HistoryStats {
        if self.entries.is_empty() {
            return HistoryStats::empty();
        }

        let mut distribution: Vec<(String, usize)> = Vec::new();
        let mut successful = 0usize;
        let mut domains: Vec<&str> = Vec::new();

        for entry in &self.entries {
            let code = entry.record_type.as_str();
            match distribution.iter_mut().find(|(name, _)| name == code) {
                Some((_, count)) => *count += 1,
                None => distribution.push((code.to_string(), 1)),
            }

            if entry.status == "NOERROR" {
                successful += 1;
            }

            if !domains.contains(&entry.domain.as_str()) {
                domains.push(&entry.domain);
            }
        }

        // Strictly-greater comparison keeps the first-seen type on ties.
        let most_common_type = distribution
            .iter()
            .fold(None::<&(String, usize)>, |best, candidate| match best {
                Some(best) if best.1 >= candidate.1 => Some(best),
                _ => Some(candidate),
            })
            .map(|(name, _)| name.clone());

        HistoryStats {
            total_queries: self.entries.len(),
            unique_domains: domains.len(),
            most_common_type,
            success_rate: successful as f64 / self.entries.len() as f64 * 100.0,
            type_distribution: distribution,
        }
    }

    /// Removes the entry at `index`; false (and no write) if out of range.
    pub fn remove_entry(&mut self, index: usize) -> bool {
        if index >= self.entries.len() {
            return false;
        }
        self.entries.remove(index);
        self.save();
        true
    }

    /// Empties the history and persists the empty sequence.
    pub fn clear_history(&mut self) {
        self.entries.clear();
        self.save();
    }

    /// Drops entries older than `days` days. No-op for `days <= 0`;
    /// persists only when something was actually removed.
    pub fn cleanup_old_entries(&mut self, days: i64) {
        if days <= 0 {
            return;
        }
        let cutoff = Utc::now() - Duration::days(days);
        let before = self.entries.len();
        self.entries.retain(|entry| entry.timestamp > cutoff);
        if self.entries.len() < before {
            self.save();
        }
    }

    /// Trims to the newest `max` entries. `0` means unlimited (no-op).
    pub fn enforce_limit(&mut self, max: usize) {
        if max == 0 {
            return;
        }
        if self.entries.len() > max {
            self.entries.truncate(max);
            self.save();
        }
    }

    /// Updates the capacity and enforces it immediately.
    pub fn set_max_entries(&mut self, max: usize) {
        self.max_entries = max;
        self.enforce_limit(max);
    }
}
