// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Domain Memory Store (Append-Only Log)
// ─────────────────────────────────────────────────────────────────────
//! Append-only log of decision observations with per-domain queries.
//!
//! One observation per line, serialized with alphabetically ordered
//! keys so records are byte-stable. Loading ignores unknown keys
//! (forward evolution) and a torn trailing line (crash mid-append).
//! The writer lock is held only for the append+flush of one entry;
//! readers share the lock and receive cloned snapshots.

use std::collections::{BTreeMap, HashMap};
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use arbiter_types::{ArbiterError, ArbiterResult, Outcome};

use crate::reputation::{score_entries, DomainReputation};

/// One decision observation. Append-only; never mutated after `store`.
///
/// Field order is alphabetical so the serialized record is key-ordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub domain: String,
    pub matched_rules: Vec<String>,
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
    pub outcome: Outcome,
    /// Monotonic seconds. Clamped forward on append if it runs backwards.
    pub timestamp: f64,
}

/// Aggregate statistics over the whole log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryStats {
    pub total_entries: usize,
    pub distinct_domains: usize,
    pub oldest_timestamp: Option<f64>,
    pub newest_timestamp: Option<f64>,
}

struct StoreState {
    entries: Vec<KnowledgeEntry>,
    by_domain: HashMap<String, Vec<usize>>,
    file: File,
    last_timestamp: f64,
}

impl StoreState {
    fn index(&mut self, entry: KnowledgeEntry) {
        let idx = self.entries.len();
        self.by_domain
            .entry(entry.domain.clone())
            .or_default()
            .push(idx);
        self.last_timestamp = self.last_timestamp.max(entry.timestamp);
        self.entries.push(entry);
    }
}

/// Durable per-domain decision memory.
pub struct MemoryStore {
    path: PathBuf,
    half_life_s: f64,
    state: RwLock<StoreState>,
}

impl MemoryStore {
    /// Open (or create) the log at `path` and load every committed entry.
    ///
    /// A trailing line without a terminator is a torn write: it is
    /// skipped and logged. A malformed committed line is a read error
    /// and surfaces as `StoreUnavailable`.
    pub fn open(path: &Path, half_life_seconds: u64) -> ArbiterResult<Self> {
        let mut raw = String::new();
        match File::open(path) {
            Ok(mut f) => {
                f.read_to_string(&mut raw)
                    .map_err(|e| ArbiterError::StoreUnavailable(format!("read {path:?}: {e}")))?;
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(ArbiterError::StoreUnavailable(format!("open {path:?}: {e}")));
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| ArbiterError::StoreUnavailable(format!("append {path:?}: {e}")))?;

        let mut state = StoreState {
            entries: Vec::new(),
            by_domain: HashMap::new(),
            file,
            last_timestamp: f64::NEG_INFINITY,
        };

        let committed = match raw.rfind('\n') {
            Some(end) => {
                if end + 1 < raw.len() {
                    log::warn!(
                        "memory log {path:?}: ignoring torn trailing line ({} bytes)",
                        raw.len() - end - 1
                    );
                }
                &raw[..end]
            }
            None => {
                if !raw.is_empty() {
                    log::warn!("memory log {path:?}: ignoring torn trailing line");
                }
                ""
            }
        };

        for (line_no, line) in committed.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            let entry: KnowledgeEntry = serde_json::from_str(line).map_err(|e| {
                ArbiterError::StoreUnavailable(format!(
                    "corrupt record at {path:?}:{}: {e}",
                    line_no + 1
                ))
            })?;
            state.index(entry);
        }

        if state.last_timestamp == f64::NEG_INFINITY {
            state.last_timestamp = 0.0;
        }

        Ok(Self {
            path: path.to_path_buf(),
            half_life_s: half_life_seconds as f64,
            state: RwLock::new(state),
        })
    }

    /// Append one observation. Durable on return: the line is flushed
    /// and synced before the writer lock is released.
    ///
    /// A timestamp older than the last accepted one is clamped forward
    /// and the original value is recorded under `meta["clamped_from"]`.
    pub fn store(&self, mut entry: KnowledgeEntry) -> ArbiterResult<()> {
        let mut state = self.state.write();

        if entry.timestamp < state.last_timestamp {
            entry
                .meta
                .insert("clamped_from".to_string(), entry.timestamp.to_string());
            entry.timestamp = state.last_timestamp;
        }

        let mut line = serde_json::to_string(&entry)
            .map_err(|e| ArbiterError::StoreUnavailable(format!("encode entry: {e}")))?;
        line.push('\n');

        state
            .file
            .write_all(line.as_bytes())
            .and_then(|()| state.file.flush())
            .and_then(|()| state.file.sync_data())
            .map_err(|e| {
                log::error!("memory log {:?}: append failed: {e}", self.path);
                ArbiterError::StoreUnavailable(format!("append {:?}: {e}", self.path))
            })?;

        state.index(entry);
        Ok(())
    }

    /// Entries for `domain`, most recent first, optionally bounded by a
    /// minimum timestamp and a result limit.
    pub fn query(
        &self,
        domain: &str,
        since: Option<f64>,
        limit: Option<usize>,
    ) -> Vec<KnowledgeEntry> {
        let state = self.state.read();
        let Some(indices) = state.by_domain.get(domain) else {
            return Vec::new();
        };
        let floor = since.unwrap_or(f64::NEG_INFINITY);
        let cap = limit.unwrap_or(usize::MAX);
        indices
            .iter()
            .rev()
            .map(|&i| &state.entries[i])
            .filter(|e| e.timestamp >= floor)
            .take(cap)
            .cloned()
            .collect()
    }

    /// Recency-weighted reputation for `domain` at time `now`.
    pub fn reputation(&self, domain: &str, now: f64) -> DomainReputation {
        let state = self.state.read();
        let entries = state
            .by_domain
            .get(domain)
            .map(|indices| indices.iter().map(|&i| &state.entries[i]).collect::<Vec<_>>())
            .unwrap_or_default();
        score_entries(domain, entries.into_iter(), now, self.half_life_s)
    }

    /// Aggregate statistics over the whole log.
    pub fn stats(&self) -> MemoryStats {
        let state = self.state.read();
        let mut oldest: Option<f64> = None;
        let mut newest: Option<f64> = None;
        for e in &state.entries {
            oldest = Some(oldest.map_or(e.timestamp, |t: f64| t.min(e.timestamp)));
            newest = Some(newest.map_or(e.timestamp, |t: f64| t.max(e.timestamp)));
        }
        MemoryStats {
            total_entries: state.entries.len(),
            distinct_domains: state.by_domain.len(),
            oldest_timestamp: oldest,
            newest_timestamp: newest,
        }
    }

    /// Path of the backing log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
