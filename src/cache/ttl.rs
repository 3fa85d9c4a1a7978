use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::disk::{is_expired, DiskStore};
use super::Entry;

/// Keyed cache whose entries expire `ttl` after being stored. Memory first,
/// optional disk underneath; a disk hit is promoted into memory.
pub struct TtlCache<V> {
  ttl: Duration,
  entries: Mutex<HashMap<String, Entry<V>>>,
  disk: Option<DiskStore>,
}

impl<V> TtlCache<V>
where
  V: Clone + Serialize + DeserializeOwned,
{
  pub fn new(ttl: Duration, disk: Option<DiskStore>) -> Self {
    Self {
      ttl,
      entries: Mutex::new(HashMap::new()),
      disk,
    }
  }

  /// Unexpired entry for `key`; expired ones are deleted on the way.
  pub fn get(&self, key: &str) -> Option<Entry<V>> {
    {
      let mut entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
      match entries.get(key) {
        Some(e) if !is_expired(e.cached_at, self.ttl) => return Some(e.clone()),
        Some(_) => {
          entries.remove(key);
        }
        None => {}
      }
    }

    let disk = self.disk.as_ref()?;
    let entry = disk.load::<V>(key)?;
    if is_expired(entry.cached_at, self.ttl) {
      debug!(key, "expired disk entry");
      disk.remove(key);
      return None;
    }

    let mut entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
    entries.insert(key.to_string(), entry.clone());
    Some(entry)
  }

  pub fn set(&self, key: &str, value: V) -> Entry<V> {
    self.set_at(key, value, Utc::now())
  }

  /// Store with an explicit `cached_at`.
  pub fn set_at(&self, key: &str, value: V, cached_at: DateTime<Utc>) -> Entry<V> {
    let entry = Entry { value, cached_at };
    // disk is written under the lock so remove_if_stamped sees a consistent pair
    let mut entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
    if let Some(disk) = &self.disk {
      disk.store(key, &entry);
    }
    entries.insert(key.to_string(), entry.clone());
    entry
  }

  /// Remove `key` only if the stored entry still carries `cached_at`.
  /// A newer entry written in the meantime is left alone.
  pub fn remove_if_stamped(&self, key: &str, cached_at: DateTime<Utc>) -> bool {
    let mut entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
    if entries.get(key).is_some_and(|e| e.cached_at != cached_at) {
      return false;
    }
    if let Some(disk) = &self.disk {
      if !disk.remove_if_stamped(key, cached_at) {
        return false;
      }
    }
    entries.remove(key);
    true
  }

  /// Drop expired entries from memory and disk.
  pub fn close(&self) {
    {
      let mut entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
      entries.retain(|_, e| !is_expired(e.cached_at, self.ttl));
    }
    if let Some(disk) = &self.disk {
      disk.sweep(self.ttl);
    }
  }
}
