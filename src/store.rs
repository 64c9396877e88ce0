//! The history store — the single owner of persisted analysis records.
//!
//! The whole collection is one durable blob behind an injected
//! [`StorageBackend`]: every mutation is a read-modify-write of the
//! full collection, newest record first, capped at
//! [`HISTORY_CAP`](crate::config::HISTORY_CAP) entries.
//!
//! Public operations never panic and never surface an error type:
//! storage failures come back as `None` / `false` / an empty `Vec`,
//! with the cause logged. The callers (results and history views)
//! decide whether to tell the user.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde_json::{json, Value};

use crate::config::{DEDUP_WINDOW_SECS, HISTORY_CAP, SCHEMA_VERSION};
use crate::models::{AnalysisRecord, HistoryStats, Prediction};
use crate::normalize::normalize;
use crate::storage::{FileBackend, MemoryBackend, StorageBackend, StorageError};

const ID_SUFFIX_LEN: usize = 7;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Local analysis-history store over an injected storage backend.
pub struct HistoryStore<B: StorageBackend> {
    backend: B,
}

impl HistoryStore<MemoryBackend> {
    /// Ephemeral store holding records in memory only.
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }
}

impl HistoryStore<FileBackend> {
    /// Durable store at the default application location.
    pub fn at_default_location() -> Self {
        Self::new(FileBackend::at_default_location())
    }
}

impl<B: StorageBackend> HistoryStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    // ── Mutators ─────────────────────────────────────────

    /// Normalize and persist a raw prediction payload.
    ///
    /// A save within [`DEDUP_WINDOW_SECS`] of an existing record with
    /// identical disease, confidence and symptoms returns that record
    /// unchanged instead of creating a duplicate (the results view is
    /// known to double-invoke on re-render).
    ///
    /// Returns `None` only when storage fails: either the existing
    /// collection cannot be read (saving blind would overwrite it) or
    /// the updated collection cannot be written.
    pub fn save(&mut self, raw: &Value) -> Option<AnalysisRecord> {
        let normalized = normalize(raw);
        let mut records = match self.try_load_records() {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(error = %e, "Cannot read history, save dropped to avoid overwrite");
                return None;
            }
        };

        let now = Utc::now();
        if let Some(existing) = find_duplicate(&records, &normalized, now) {
            tracing::debug!(
                disease = %existing.result.disease,
                id = %existing.id,
                "Duplicate save within dedup window, returning existing record"
            );
            return Some(existing.clone());
        }

        let record = AnalysisRecord {
            id: generate_record_id(now),
            timestamp: now,
            result: normalized,
        };

        records.insert(0, record.clone());
        records.truncate(HISTORY_CAP);

        match self.persist(&records) {
            Ok(()) => {
                tracing::debug!(id = %record.id, disease = %record.result.disease, "Saved analysis to history");
                Some(record)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to persist history, save dropped");
                None
            }
        }
    }

    /// Remove the record with the given id. Persisting the remainder is
    /// what can fail; an unknown id is a successful no-op.
    pub fn delete(&mut self, id: &str) -> bool {
        let mut records = match self.try_load_records() {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(error = %e, id, "Cannot read history, delete dropped to avoid overwrite");
                return false;
            }
        };
        records.retain(|r| r.id != id);

        match self.persist(&records) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, id, "Failed to persist history after delete");
                false
            }
        }
    }

    /// Remove the entire collection.
    pub fn clear(&mut self) -> bool {
        match self.backend.remove() {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to clear history");
                false
            }
        }
    }

    // ── Readers ──────────────────────────────────────────

    /// The full collection, newest first. Every record's result is in
    /// canonical shape even when it was written under a legacy schema.
    /// Missing, unreadable or corrupt storage reads as empty.
    pub fn list(&self) -> Vec<AnalysisRecord> {
        self.load_records()
    }

    /// Look up a single record by id.
    pub fn get(&self, id: &str) -> Option<AnalysisRecord> {
        self.load_records().into_iter().find(|r| r.id == id)
    }

    /// Aggregate counts for the history screen. All-zero on an empty
    /// store; the average is rounded to one decimal.
    pub fn stats(&self) -> HistoryStats {
        let records = self.load_records();
        if records.is_empty() {
            return HistoryStats::default();
        }

        let mut stats = HistoryStats {
            total: records.len(),
            ..Default::default()
        };

        let mut confidence_sum = 0.0;
        for record in &records {
            *stats
                .diseases
                .entry(record.result.disease.clone())
                .or_insert(0) += 1;
            confidence_sum += record.result.confidence;
        }

        stats.avg_confidence = (confidence_sum / records.len() as f64 * 10.0).round() / 10.0;
        stats
    }

    /// Case-insensitive substring search over disease, symptoms,
    /// duration and severity. An empty or whitespace-only query returns
    /// the full list.
    pub fn search(&self, query: &str) -> Vec<AnalysisRecord> {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return self.load_records();
        }

        self.load_records()
            .into_iter()
            .filter(|record| {
                let r = &record.result;
                r.disease.to_lowercase().contains(&q)
                    || field_matches(r.symptoms(), &q)
                    || field_matches(r.duration(), &q)
                    || field_matches(r.severity(), &q)
            })
            .collect()
    }

    /// Serialize the normalized collection as formatted JSON. The
    /// delivery mechanism (file download, HTTP response, clipboard) is
    /// the caller's concern.
    pub fn export_json(&self) -> Vec<u8> {
        match serde_json::to_vec_pretty(&self.load_records()) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize history for export");
                Vec::new()
            }
        }
    }

    /// Distinct disease names, in first-seen (newest-first) order.
    pub fn unique_diseases(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.load_records()
            .into_iter()
            .map(|r| r.result.disease)
            .filter(|d| seen.insert(d.clone()))
            .collect()
    }

    /// Records whose timestamp falls inclusively within `[start, end]`,
    /// newest first.
    pub fn by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<AnalysisRecord> {
        self.load_records()
            .into_iter()
            .filter(|r| r.timestamp >= start && r.timestamp <= end)
            .collect()
    }

    // ── Persistence ──────────────────────────────────────

    /// Read the stored collection for the read-only operations.
    /// A backend read failure reads as empty here; the mutators use
    /// [`Self::try_load_records`] so they never overwrite history they
    /// could not read.
    fn load_records(&self) -> Vec<AnalysisRecord> {
        match self.try_load_records() {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read history, treating as empty");
                Vec::new()
            }
        }
    }

    /// Read and upgrade the stored collection.
    ///
    /// The versioned envelope holds records the store itself wrote in
    /// canonical shape, so they deserialize directly — re-applying the
    /// confidence-scale heuristic here would misread a known-percent
    /// score at the fractional boundary (a stored 1% would come back as
    /// 100%). Only the legacy unversioned array, whose records may
    /// predate normalization (flat `prediction` field, nested
    /// `prediction.disease`, fractional confidence), goes through
    /// `normalize` on read.
    fn try_load_records(&self) -> Result<Vec<AnalysisRecord>, StorageError> {
        let Some(bytes) = self.backend.read()? else {
            return Ok(Vec::new());
        };

        let value: Value = match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, "Corrupt history blob, treating as empty");
                return Ok(Vec::new());
            }
        };

        let records = match &value {
            Value::Object(map) => match map.get("records").and_then(Value::as_array) {
                Some(items) => items
                    .iter()
                    .filter_map(|item| serde_json::from_value(item.clone()).ok())
                    .collect(),
                None => {
                    tracing::warn!("History envelope has no records array, treating as empty");
                    Vec::new()
                }
            },
            // Legacy format: a bare array of records, no version tag.
            Value::Array(items) => items.iter().filter_map(parse_record_lenient).collect(),
            _ => {
                tracing::warn!("Unexpected history blob shape, treating as empty");
                Vec::new()
            }
        };

        Ok(records)
    }

    fn persist(&self, records: &[AnalysisRecord]) -> Result<(), StorageError> {
        let envelope = json!({
            "version": SCHEMA_VERSION,
            "records": records,
        });
        let bytes = serde_json::to_vec(&envelope).map_err(|e| {
            StorageError::Unavailable(format!("history serialization failed: {e}"))
        })?;
        self.backend.write(&bytes)
    }
}

/// Parse one record from the legacy unversioned array, upgrading its
/// result to the canonical shape. Items without a usable id or
/// timestamp are skipped.
fn parse_record_lenient(item: &Value) -> Option<AnalysisRecord> {
    let id = item.get("id")?.as_str()?.to_string();
    let timestamp = item
        .get("timestamp")?
        .as_str()?
        .parse::<DateTime<Utc>>()
        .ok()?;
    let result = normalize(item.get("result").unwrap_or(&Value::Null));

    Some(AnalysisRecord {
        id,
        timestamp,
        result,
    })
}

fn find_duplicate<'a>(
    records: &'a [AnalysisRecord],
    candidate: &Prediction,
    now: DateTime<Utc>,
) -> Option<&'a AnalysisRecord> {
    let window = Duration::seconds(DEDUP_WINDOW_SECS);
    records.iter().find(|existing| {
        let age = now.signed_duration_since(existing.timestamp);
        age >= Duration::zero()
            && age <= window
            && existing.result.disease == candidate.disease
            && existing.result.confidence == candidate.confidence
            && existing.result.symptoms() == candidate.symptoms()
    })
}

/// `<unix-millis>-<7 base-36 chars>`. Collisions are negligible for a
/// per-client store; the id is only a lookup key, not a global handle.
fn generate_record_id(now: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{}-{}", now.timestamp_millis(), suffix)
}

fn field_matches(field: Option<&str>, query: &str) -> bool {
    field.is_some_and(|f| f.to_lowercase().contains(query))
}
