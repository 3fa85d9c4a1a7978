use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::ttl::TtlCache;
use crate::error::FetchError;

type Slot<V> = Arc<OnceCell<Result<V, FetchError>>>;

/// TTL cache that only answers callers whose reference time the entry is not
/// older than, and runs at most one fetch per key at a time.
pub struct FreshnessCache<V> {
  store: TtlCache<V>,
  inflight: Mutex<HashMap<String, Slot<V>>>,
}

impl<V> FreshnessCache<V>
where
  V: Clone + Serialize + DeserializeOwned,
{
  pub fn new(store: TtlCache<V>) -> Self {
    Self {
      store,
      inflight: Mutex::new(HashMap::new()),
    }
  }

  /// Hit iff `cached_at >= reference` and within TTL. Stale entries are deleted.
  pub fn get(&self, key: &str, reference: DateTime<Utc>) -> Option<V> {
    let entry = self.store.get(key)?;
    if entry.cached_at >= reference {
      debug!(key, cached_at = %entry.cached_at, "cache hit");
      return Some(entry.value);
    }

    debug!(key, cached_at = %entry.cached_at, reference = %reference, "cache entry older than reference; dropping");
    self.store.remove_if_stamped(key, entry.cached_at);
    None
  }

  pub fn set(&self, key: &str, value: V) {
    self.store.set(key, value);
  }

  pub fn set_at(&self, key: &str, value: V, cached_at: DateTime<Utc>) {
    self.store.set_at(key, value, cached_at);
  }

  /// Cached value, or the result of `fetch`. Concurrent callers for the same
  /// key block on a single fetch and share its result, success or failure.
  pub fn get_or_fetch<F>(&self, key: &str, reference: DateTime<Utc>, fetch: F) -> Result<V, FetchError>
  where
    F: FnOnce() -> Result<V, FetchError>,
  {
    if let Some(v) = self.get(key, reference) {
      return Ok(v);
    }

    let slot: Slot<V> = {
      let mut inflight = self.inflight.lock().unwrap_or_else(|p| p.into_inner());
      inflight.entry(key.to_string()).or_default().clone()
    };

    let mut leader = false;
    let result = slot
      .get_or_init(|| {
        leader = true;
        debug!(key, "cache miss; fetching");
        let fetched = fetch();
        if let Ok(v) = &fetched {
          self.store.set(key, v.clone());
        }
        fetched
      })
      .clone();

    if leader {
      // stored before the slot goes away, so late arrivals hit the cache
      let mut inflight = self.inflight.lock().unwrap_or_else(|p| p.into_inner());
      if inflight.get(key).is_some_and(|s| Arc::ptr_eq(s, &slot)) {
        inflight.remove(key);
      }
    }

    result
  }

  pub fn close(&self) {
    self.store.close();
  }
}
