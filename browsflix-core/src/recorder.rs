//! Search usage recording.
//!
//! Keeps one record per search term with a hit counter and the movie that
//! topped the results the first time the term was searched.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::movie::Movie;

/// Errors raised by usage recorder backends.
#[derive(Debug, thiserror::Error)]
pub enum RecorderError {
    #[error("Search store I/O failed at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Search store is corrupt: {reason}")]
    Corrupt { reason: String },

    #[error("Recorder unavailable: {reason}")]
    Unavailable { reason: String },
}

/// One tracked search term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRecord {
    pub search_term: String,
    pub count: u64,
    pub movie_id: u64,
    pub poster_url: Option<String>,
    pub last_searched_at: DateTime<Utc>,
}

/// Sink for "query led to this top result" signals.
///
/// Implementations may fail independently of the search flow; callers log
/// the failure and move on.
#[async_trait]
pub trait UsageRecorder: Send + Sync + std::fmt::Debug {
    /// Creates or increments the record for `query`.
    ///
    /// # Errors
    ///
    /// - `RecorderError::Io` - Backing store could not be read or written
    /// - `RecorderError::Corrupt` - Backing store contents could not be decoded
    /// - `RecorderError::Unavailable` - Backend refused the write
    async fn record_search(&self, query: &str, top_result: &Movie) -> Result<(), RecorderError>;
}

/// Increments the existing record for `query` or creates a fresh one.
fn apply_search(records: &mut Vec<SearchRecord>, query: &str, top_result: &Movie, now: DateTime<Utc>) {
    if let Some(record) = records.iter_mut().find(|r| r.search_term == query) {
        record.count += 1;
        record.last_searched_at = now;
        return;
    }

    records.push(SearchRecord {
        search_term: query.to_string(),
        count: 1,
        movie_id: top_result.id,
        poster_url: top_result.poster_url(),
        last_searched_at: now,
    });
}

/// Most searched terms first, most recent first on ties.
fn rank_trending(mut records: Vec<SearchRecord>, limit: usize) -> Vec<SearchRecord> {
    records.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| b.last_searched_at.cmp(&a.last_searched_at))
    });
    records.truncate(limit);
    records
}

/// Process-local recorder.
#[derive(Debug, Default)]
pub struct InMemoryUsageRecorder {
    records: Mutex<Vec<SearchRecord>>,
}

impl InMemoryUsageRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all records in insertion order.
    pub fn records(&self) -> Vec<SearchRecord> {
        self.records.lock().clone()
    }

    /// Record for a single term, if it was ever searched.
    pub fn record(&self, search_term: &str) -> Option<SearchRecord> {
        self.records
            .lock()
            .iter()
            .find(|r| r.search_term == search_term)
            .cloned()
    }

    pub fn trending(&self, limit: usize) -> Vec<SearchRecord> {
        rank_trending(self.records(), limit)
    }
}

#[async_trait]
impl UsageRecorder for InMemoryUsageRecorder {
    async fn record_search(&self, query: &str, top_result: &Movie) -> Result<(), RecorderError> {
        apply_search(&mut self.records.lock(), query, top_result, Utc::now());
        Ok(())
    }
}

/// Recorder persisting records as a JSON array on disk.
#[derive(Debug)]
pub struct JsonFileUsageRecorder {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    write_lock: tokio::sync::Mutex<()>,
}

impl JsonFileUsageRecorder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads all records. A missing store is an empty store.
    ///
    /// # Errors
    ///
    /// - `RecorderError::Io` - Store exists but could not be read
    /// - `RecorderError::Corrupt` - Store is not a valid record list
    pub async fn load(&self) -> Result<Vec<SearchRecord>, RecorderError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(RecorderError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&bytes).map_err(|e| RecorderError::Corrupt {
            reason: format!("{}: {e}", self.path.display()),
        })
    }

    /// Top `limit` records by search count.
    ///
    /// # Errors
    ///
    /// - `RecorderError::Io` - Store exists but could not be read
    /// - `RecorderError::Corrupt` - Store is not a valid record list
    pub async fn trending(&self, limit: usize) -> Result<Vec<SearchRecord>, RecorderError> {
        Ok(rank_trending(self.load().await?, limit))
    }

    async fn store(&self, records: &[SearchRecord]) -> Result<(), RecorderError> {
        let encoded = serde_json::to_vec_pretty(records).map_err(|e| RecorderError::Corrupt {
            reason: format!("failed to encode records: {e}"),
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| RecorderError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        // Readers only ever see the old or the new store, never a partial write
        let staging = self.staging_path();
        tokio::fs::write(&staging, encoded)
            .await
            .map_err(|source| RecorderError::Io {
                path: staging.clone(),
                source,
            })?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .map_err(|source| RecorderError::Io {
                path: self.path.clone(),
                source,
            })
    }

    /// Sibling file new contents are written to before replacing the store.
    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(ToOwned::to_owned)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl UsageRecorder for JsonFileUsageRecorder {
    async fn record_search(&self, query: &str, top_result: &Movie) -> Result<(), RecorderError> {
        let _guard = self.write_lock.lock().await;

        let mut records = self.load().await?;
        apply_search(&mut records, query, top_result, Utc::now());
        self.store(&records).await?;

        tracing::debug!(query, movie_id = top_result.id, "Recorded search");
        Ok(())
    }
}

/// Recorder that drops every signal.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopUsageRecorder;

#[async_trait]
impl UsageRecorder for NoopUsageRecorder {
    async fn record_search(&self, _query: &str, _top_result: &Movie) -> Result<(), RecorderError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tokio_test::assert_ok;

    use super::*;

    fn movie(id: u64, title: &str) -> Movie {
        Movie {
            poster_path: Some(format!("/{id}.jpg")),
            ..Movie::new(id, title)
        }
    }

    #[tokio::test]
    async fn test_first_search_creates_record() {
        let recorder = InMemoryUsageRecorder::new();
        assert_ok!(recorder.record_search("matrix", &movie(603, "The Matrix")).await);

        let record = recorder.record("matrix").unwrap();
        assert_eq!(record.count, 1);
        assert_eq!(record.movie_id, 603);
        assert_eq!(
            record.poster_url.as_deref(),
            Some("https://image.tmdb.org/t/p/w500/603.jpg")
        );
    }

    #[tokio::test]
    async fn test_repeat_search_increments_and_keeps_first_movie() {
        let recorder = InMemoryUsageRecorder::new();
        recorder
            .record_search("alien", &movie(348, "Alien"))
            .await
            .unwrap();
        recorder
            .record_search("alien", &movie(679, "Aliens"))
            .await
            .unwrap();

        let records = recorder.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].count, 2);
        assert_eq!(records[0].movie_id, 348);
    }

    #[tokio::test]
    async fn test_trending_orders_by_count() {
        let recorder = InMemoryUsageRecorder::new();
        for query in ["dune", "heat", "dune", "up", "dune", "heat"] {
            recorder.record_search(query, &movie(1, query)).await.unwrap();
        }

        let terms: Vec<_> = recorder
            .trending(2)
            .into_iter()
            .map(|r| (r.search_term, r.count))
            .collect();
        assert_eq!(terms, vec![("dune".to_string(), 3), ("heat".to_string(), 2)]);
    }

    #[tokio::test]
    async fn test_json_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("searches.json");

        let recorder = JsonFileUsageRecorder::new(&path);
        assert!(recorder.load().await.unwrap().is_empty());
        recorder
            .record_search("batman", &movie(268, "Batman"))
            .await
            .unwrap();

        let reopened = JsonFileUsageRecorder::new(&path);
        reopened
            .record_search("batman", &movie(272, "Batman Begins"))
            .await
            .unwrap();

        let records = reopened.load().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].count, 2);
        assert_eq!(records[0].movie_id, 268);
    }

    #[tokio::test]
    async fn test_json_store_reports_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("searches.json");
        std::fs::write(&path, b"{not json").unwrap();

        let recorder = JsonFileUsageRecorder::new(&path);
        let result = recorder.record_search("x", &movie(1, "X")).await;
        assert!(matches!(result, Err(RecorderError::Corrupt { .. })));
    }

    #[tokio::test]
    async fn test_interrupted_write_leaves_store_readable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("searches.json");
        let recorder = JsonFileUsageRecorder::new(&path);
        recorder
            .record_search("heat", &movie(949, "Heat"))
            .await
            .unwrap();
        assert!(!dir.path().join("searches.json.tmp").exists());

        // A write cut short before the rename leaves only the staging file torn
        std::fs::write(dir.path().join("searches.json.tmp"), b"[{\"search_te").unwrap();

        assert_eq!(recorder.load().await.unwrap().len(), 1);
        assert_ok!(recorder.record_search("heat", &movie(949, "Heat")).await);
        assert_eq!(recorder.load().await.unwrap()[0].count, 2);
        assert!(!dir.path().join("searches.json.tmp").exists());
    }
}
