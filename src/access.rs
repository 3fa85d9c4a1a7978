// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Infer per-actor write access from author_association, collaborator roles, and confirmed actions
// role: access/resolution
// inputs: Actor login + Association; GithubApi for collaborator listing and individual permission lookups
// outputs: WriteAccess levels written onto Event.write_access
// side_effects: Upstream lookups (cached: listing 4h, individual permission 24h)
// invariants:
// - A 403 on the collaborator listing caches an empty map for the TTL window
// - Lookup errors never fail the fetch; MEMBER falls back to Likely
// - upgrade_write_access only raises Likely to Definitely
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::time::Duration;

use tracing::{debug, warn};

use crate::cache::{DiskStore, TtlCache, COLLABORATORS_TTL, PERMISSION_TTL};
use crate::github::api::GithubApi;
use crate::github::raw::{decode_items, RawCollaborator, RawPermissionLevel};
use crate::github::{Deadline, RepoRef};
use crate::model::{Association, Event, WriteAccess};

/// Login (lowercase) -> role name.
pub type CollaboratorRoles = BTreeMap<String, String>;

/// Caches backing access lookups; shared across fetches.
pub struct AccessCaches {
  collaborators: TtlCache<CollaboratorRoles>,
  permissions: TtlCache<String>,
}

impl AccessCaches {
  pub fn new(cache_dir: Option<&Path>) -> Self {
    Self::with_ttls(cache_dir, COLLABORATORS_TTL, PERMISSION_TTL)
  }

  pub fn with_ttls(cache_dir: Option<&Path>, collaborators_ttl: Duration, permission_ttl: Duration) -> Self {
    Self {
      collaborators: TtlCache::new(collaborators_ttl, cache_dir.map(|d| DiskStore::new(d.join("collaborators")))),
      permissions: TtlCache::new(permission_ttl, cache_dir.map(|d| DiskStore::new(d.join("permissions")))),
    }
  }

  pub fn close(&self) {
    self.collaborators.close();
    self.permissions.close();
  }
}

/// Map a repository role to a write-access level.
pub fn role_access(role: &str) -> WriteAccess {
  match role.to_ascii_lowercase().as_str() {
    "admin" | "maintain" | "write" => WriteAccess::Definitely,
    "read" | "triage" | "none" => WriteAccess::No,
    // custom organization roles
    _ => WriteAccess::Likely,
  }
}

pub struct AccessResolver<'a> {
  api: &'a dyn GithubApi,
  caches: &'a AccessCaches,
  repo: &'a RepoRef,
  deadline: &'a Deadline,
}

impl<'a> AccessResolver<'a> {
  pub fn new(api: &'a dyn GithubApi, caches: &'a AccessCaches, repo: &'a RepoRef, deadline: &'a Deadline) -> Self {
    Self {
      api,
      caches,
      repo,
      deadline,
    }
  }

  pub fn resolve_write_access(&self, actor: &str, association: Option<Association>) -> WriteAccess {
    if actor.is_empty() {
      return WriteAccess::NotApplicable;
    }

    match association {
      Some(Association::Owner | Association::Collaborator) => WriteAccess::Definitely,
      Some(Association::Member) => self.member_access(actor),
      Some(
        Association::Contributor | Association::None | Association::FirstTimer | Association::FirstTimeContributor,
      ) => WriteAccess::Unlikely,
      _ => WriteAccess::NotApplicable,
    }
  }

  /// Resolve every event's `write_access`, looking each (actor, association) up once.
  pub fn annotate(&self, events: &mut [Event]) {
    let mut memo: HashMap<(String, Option<Association>), WriteAccess> = HashMap::new();
    for e in events.iter_mut() {
      let key = (e.actor.clone(), e.association);
      let level = *memo
        .entry(key)
        .or_insert_with(|| self.resolve_write_access(&e.actor, e.association));
      e.write_access = level;
    }
  }

  fn member_access(&self, actor: &str) -> WriteAccess {
    let Some(roles) = self.collaborator_roles() else {
      return WriteAccess::Likely;
    };

    if let Some(role) = roles.get(&actor.to_ascii_lowercase()) {
      return role_access(role);
    }

    // an empty listing is the cached 403 answer; asking per user would be refused too
    if roles.is_empty() {
      return WriteAccess::Likely;
    }

    match self.permission_role(actor) {
      Some(role) => role_access(&role),
      None => WriteAccess::Likely,
    }
  }

  // owner and repo names are case-insensitive upstream
  fn repo_key(&self) -> String {
    self.repo.to_string().to_ascii_lowercase()
  }

  fn collaborator_roles(&self) -> Option<CollaboratorRoles> {
    let key = format!("collaborators:{}", self.repo_key());
    if let Some(entry) = self.caches.collaborators.get(&key) {
      return Some(entry.value);
    }

    match self.api.collaborators(self.repo, self.deadline) {
      Ok(values) => {
        let roles: CollaboratorRoles = decode_items::<RawCollaborator>(values, "collaborator")
          .into_iter()
          .map(|c| (c.login.to_ascii_lowercase(), c.role()))
          .collect();
        debug!(repo = %self.repo, count = roles.len(), "collaborator listing fetched");
        Some(self.caches.collaborators.set(&key, roles).value)
      }
      Err(e) if e.is_forbidden() => {
        debug!(repo = %self.repo, "collaborator listing forbidden; caching empty map");
        Some(self.caches.collaborators.set(&key, CollaboratorRoles::new()).value)
      }
      Err(e) => {
        warn!(repo = %self.repo, error = %e, "collaborator listing failed");
        None
      }
    }
  }

  fn permission_role(&self, actor: &str) -> Option<String> {
    let key = format!("permission:{}:{}", self.repo_key(), actor.to_ascii_lowercase());
    if let Some(entry) = self.caches.permissions.get(&key) {
      return Some(entry.value);
    }

    match self.api.collaborator_permission(self.repo, actor, self.deadline) {
      Ok(v) => match serde_json::from_value::<RawPermissionLevel>(v) {
        Ok(level) => Some(self.caches.permissions.set(&key, level.role()).value),
        Err(e) => {
          warn!(actor, error = %e, "malformed permission payload");
          None
        }
      },
      Err(e) => {
        debug!(actor, error = %e, "permission lookup failed");
        None
      }
    }
  }
}

/// Raise `Likely` to `Definitely` for actors who performed an action that
/// needs write access anywhere in the stream.
pub fn upgrade_write_access(events: &mut [Event]) {
  let confirmed: HashSet<String> = events
    .iter()
    .filter(|e| e.kind.requires_write_access() && !e.actor.is_empty())
    .map(|e| e.actor.clone())
    .collect();

  for e in events.iter_mut() {
    if e.write_access == WriteAccess::Likely && confirmed.contains(&e.actor) {
      e.write_access = WriteAccess::Definitely;
    }
  }
}
