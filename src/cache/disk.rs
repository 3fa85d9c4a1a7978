use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::Entry;

/// Stable file name for a cache key: lowercase SHA-256 hex.
pub fn key_hash(key: &str) -> String {
  let mut hasher = Sha256::new();
  hasher.update(key.as_bytes());
  hex::encode(hasher.finalize())
}

pub(crate) fn is_expired(cached_at: DateTime<Utc>, ttl: Duration) -> bool {
  // entries stamped in the future (clock skew) count as fresh
  Utc::now()
    .signed_duration_since(cached_at)
    .to_std()
    .map(|age| age > ttl)
    .unwrap_or(false)
}

const TMP_PREFIX: &str = ".prx-";

fn persist(tmp: NamedTempFile, path: &Path) -> std::io::Result<()> {
  tmp.persist(path).map(|_| ()).map_err(|e| e.error)
}

/// Temp files left behind by an interrupted write.
fn is_leftover_tmp(path: &Path, ttl: Duration) -> bool {
  let named_tmp = path
    .file_name()
    .and_then(|n| n.to_str())
    .is_some_and(|n| n.starts_with(TMP_PREFIX) && n.ends_with(".tmp"));
  if !named_tmp {
    return false;
  }
  let age = std::fs::metadata(path)
    .and_then(|m| m.modified())
    .ok()
    .and_then(|t| SystemTime::now().duration_since(t).ok());
  age.is_some_and(|a| a >= ttl)
}

#[derive(Deserialize)]
struct Stamp {
  cached_at: DateTime<Utc>,
}

/// One JSON file per key under a directory. IO and decode problems are
/// logged and behave as misses.
#[derive(Debug, Clone)]
pub struct DiskStore {
  dir: PathBuf,
}

impl DiskStore {
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    Self { dir: dir.into() }
  }

  fn path_for(&self, key: &str) -> PathBuf {
    self.dir.join(format!("{}.json", key_hash(key)))
  }

  pub fn load<V: DeserializeOwned>(&self, key: &str) -> Option<Entry<V>> {
    let path = self.path_for(key);
    let bytes = std::fs::read(&path).ok()?;

    match serde_json::from_slice::<Entry<V>>(&bytes) {
      Ok(entry) => Some(entry),
      Err(e) => {
        debug!(path = %path.display(), error = %e, "corrupt cache file; removing");
        let _ = std::fs::remove_file(&path);
        None
      }
    }
  }

  pub fn store<V: Serialize>(&self, key: &str, entry: &Entry<V>) {
    if let Err(e) = std::fs::create_dir_all(&self.dir) {
      warn!(dir = %self.dir.display(), error = %e, "cannot create cache dir");
      return;
    }

    let path = self.path_for(key);
    if let Err(e) = self.write_atomic(&path, entry) {
      warn!(path = %path.display(), error = %e, "cache write failed");
    }
  }

  /// Write to a uniquely named temp file in the same dir, then rename over `path`.
  fn write_atomic<V: Serialize>(&self, path: &Path, entry: &Entry<V>) -> std::io::Result<()> {
    let bytes = serde_json::to_vec(entry).map_err(std::io::Error::other)?;
    let mut tmp = tempfile::Builder::new()
      .prefix(TMP_PREFIX)
      .suffix(".tmp")
      .tempfile_in(&self.dir)?;
    tmp.write_all(&bytes)?;
    tmp.flush()?;
    persist(tmp, path)
  }

  pub fn remove(&self, key: &str) {
    let _ = std::fs::remove_file(self.path_for(key));
  }

  /// Remove the file for `key` unless it holds an entry stamped other than `cached_at`.
  /// Returns false when a different entry was found and kept.
  pub fn remove_if_stamped(&self, key: &str, cached_at: DateTime<Utc>) -> bool {
    let path = self.path_for(key);
    let stamp = std::fs::read(&path).ok().and_then(|b| serde_json::from_slice::<Stamp>(&b).ok());
    if stamp.is_some_and(|s| s.cached_at != cached_at) {
      return false;
    }
    let _ = std::fs::remove_file(&path);
    true
  }

  /// Delete files that are expired or unreadable. Returns how many were removed.
  pub fn sweep(&self, ttl: Duration) -> usize {
    let Ok(read_dir) = std::fs::read_dir(&self.dir) else {
      return 0;
    };

    let mut removed = 0;
    for entry in read_dir.flatten() {
      let path = entry.path();
      if is_leftover_tmp(&path, ttl) {
        if std::fs::remove_file(&path).is_ok() {
          removed += 1;
        }
        continue;
      }
      if path.extension().and_then(|e| e.to_str()) != Some("json") {
        continue;
      }
      let stale = match std::fs::read(&path).ok().and_then(|b| serde_json::from_slice::<Stamp>(&b).ok()) {
        Some(stamp) => is_expired(stamp.cached_at, ttl),
        None => true,
      };
      if stale && std::fs::remove_file(&path).is_ok() {
        removed += 1;
      }
    }

    debug!(dir = %self.dir.display(), removed, "cache sweep");
    removed
  }
}
