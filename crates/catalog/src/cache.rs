//! File-backed TTL cache.
//!
//! One JSON file per key under the cache directory:
//!
//! ```text
//! {cache_dir}/{key}.json
//! { "payload": <any JSON>, "stored_at": "2026-10-19T08:00:00Z", "ttl_secs": 86400 }
//! ```
//!
//! An entry is expired when `now - stored_at > ttl`; expired and corrupt
//! entries are deleted on read and reported as a miss. Writes go to a temp file
//! in the same directory and are renamed into place, so concurrent readers see
//! either the old entry or the new one.
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::CatalogError;

/// Source of "now". Injectable so expiry can be tested without sleeping.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Serialize, Deserialize)]
struct CacheEntry {
    payload: serde_json::Value,
    stored_at: DateTime<Utc>,
    #[serde(rename = "ttl_secs", with = "crate::serde_secs")]
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        // A stored_at in the future yields a negative age, which never expires.
        match (now - self.stored_at).to_std() {
            Ok(age) => age > self.ttl,
            Err(_) => false,
        }
    }
}

/// On-disk cache for catalog listings.
///
/// Constructed once at process start and passed to
/// [`fetch_models`](crate::fetch_models).
#[derive(Clone)]
pub struct ModelCache {
    dir: PathBuf,
    ttl: Duration,
    clock: Clock,
}

impl fmt::Debug for ModelCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelCache")
            .field("dir", &self.dir)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl ModelCache {
    /// A cache rooted at `dir` that stamps new entries with `ttl`.
    ///
    /// The directory is created lazily on the first write.
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            dir: dir.into(),
            ttl,
            clock: Arc::new(Utc::now),
        }
    }

    /// Replaces the wall clock.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached value for `key`, or `None` on any kind of miss.
    ///
    /// Absent, unreadable, corrupt, expired and type-mismatched entries all
    /// count as misses; expired and corrupt files are removed.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = match self.entry_path(key) {
            Ok(path) => path,
            Err(err) => {
                warn!(key, error = %err, "cache_get_rejected");
                return None;
            }
        };

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(key, "cache_miss");
                return None;
            }
            Err(err) => {
                warn!(key, error = %err, "cache_unreadable");
                return None;
            }
        };

        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(err) => {
                debug!(key, error = %err, "cache_corrupt");
                self.discard(&path);
                return None;
            }
        };

        if entry.is_expired((self.clock)()) {
            debug!(
                key,
                stored_at = %entry.stored_at,
                ttl_secs = entry.ttl.as_secs(),
                "cache_expired"
            );
            self.discard(&path);
            return None;
        }

        match serde_json::from_value(entry.payload) {
            Ok(value) => {
                debug!(key, "cache_hit");
                Some(value)
            }
            Err(err) => {
                debug!(key, error = %err, "cache_payload_mismatch");
                None
            }
        }
    }

    /// Stores `value` under `key` with a fresh timestamp and the cache TTL.
    pub fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CatalogError> {
        self.put_with_ttl(key, value, self.ttl)
    }

    /// Stores `value` under `key` with its own lifetime.
    ///
    /// The TTL is recorded in the entry, so later reads honour it even if the
    /// cache default changes.
    pub fn put_with_ttl<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), CatalogError> {
        let path = self.entry_path(key)?;
        let entry = CacheEntry {
            payload: serde_json::to_value(value)?,
            stored_at: (self.clock)(),
            ttl,
        };
        let bytes = serde_json::to_vec(&entry)?;

        fs::create_dir_all(&self.dir)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&bytes)?;
        tmp.flush()?;
        tmp.persist(&path).map_err(|err| {
            CatalogError::Cache(format!("persist {}: {}", path.display(), err.error))
        })?;

        debug!(key, bytes = bytes.len(), ttl_secs = ttl.as_secs(), "cache_store");
        Ok(())
    }

    /// Deletes the entry for `key`. Removing a missing entry is not an error.
    pub fn remove(&self, key: &str) -> Result<(), CatalogError> {
        let path = self.entry_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn entry_path(&self, key: &str) -> Result<PathBuf, CatalogError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(CatalogError::Cache(format!("invalid cache key '{key}'")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }

    fn discard(&self, path: &Path) {
        if let Err(err) = fs::remove_file(path) {
            if err.kind() != io::ErrorKind::NotFound {
                warn!(path = %path.display(), error = %err, "cache_discard_failed");
            }
        }
    }
}
