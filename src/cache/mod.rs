// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Caching layers: per-key disk files, TTL cache, and the reference-time aware single-flight cache
// role: cache/storage
// inputs: Cache keys (plain strings), values implementing Serialize + DeserializeOwned
// outputs: Entry { value, cached_at } records
// side_effects: Reads/writes/deletes JSON files under the configured cache directory
// invariants:
// - Corrupt or unreadable files are misses and are removed; never an error
// - A freshness hit requires cached_at >= reference AND age <= TTL
// - At most one in-flight fetch per key
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod disk;
pub mod freshness;
pub mod ttl;

pub use disk::{key_hash, DiskStore};
pub use freshness::FreshnessCache;
pub use ttl::TtlCache;

pub const PULL_REQUEST_TTL: Duration = Duration::from_secs(20 * 24 * 60 * 60);
pub const COLLABORATORS_TTL: Duration = Duration::from_secs(4 * 60 * 60);
pub const PERMISSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry<V> {
  pub value: V,
  pub cached_at: DateTime<Utc>,
}
