// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Define the JSON model (events, pull request aggregate, derived summaries) shared by every stage
// role: model/types
// outputs: Serializable structs with stable field names; derived fields only written by summary::finalize
// invariants:
// - WriteAccess serializes as its ordinal (-2..=2) and orders by confidence
// - Each check name appears in exactly one CheckSummary map
// - Event.association never reaches the wire (serde skip)
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Closed set of event kinds emitted by the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
  Opened,
  Closed,
  Merged,
  Reopened,
  Commit,
  Comment,
  Review,
  ReviewComment,
  CheckRun,
  StatusCheck,
  Labeled,
  Unlabeled,
  Assigned,
  Unassigned,
  Milestoned,
  Demilestoned,
  ReviewRequested,
  ReviewRequestRemoved,
  ReviewDismissed,
  ReadyForReview,
  ConvertToDraft,
  HeadRefForcePushed,
  HeadRefDeleted,
  HeadRefRestored,
  BaseRefChanged,
  BaseRefForcePushed,
  RenamedTitle,
  Locked,
  Unlocked,
  AutoMergeEnabled,
  AutoMergeDisabled,
  AutoSquashEnabled,
  AutoRebaseEnabled,
  AddedToMergeQueue,
  RemovedFromMergeQueue,
  AutomaticBaseChangeSucceeded,
  AutomaticBaseChangeFailed,
  Connected,
  Disconnected,
  CrossReferenced,
  Referenced,
  Mentioned,
  Subscribed,
  Unsubscribed,
  Deployed,
  DeploymentEnvironmentChanged,
  Pinned,
  Unpinned,
  Transferred,
  CommentDeleted,
}

impl EventKind {
  /// Kinds whose actor must hold write access for the platform to accept them.
  pub fn requires_write_access(self) -> bool {
    matches!(
      self,
      EventKind::Merged
        | EventKind::Labeled
        | EventKind::Unlabeled
        | EventKind::Assigned
        | EventKind::Unassigned
        | EventKind::Milestoned
        | EventKind::Demilestoned
    )
  }

  pub fn is_check(self) -> bool {
    matches!(self, EventKind::CheckRun | EventKind::StatusCheck)
  }
}

/// Confidence that an actor can push to / merge into the repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(i8)]
pub enum WriteAccess {
  No = -2,
  Unlikely = -1,
  #[default]
  NotApplicable = 0,
  Likely = 1,
  Definitely = 2,
}

impl WriteAccess {
  pub fn as_i8(self) -> i8 {
    self as i8
  }

  pub fn from_i8(v: i8) -> Option<Self> {
    match v {
      -2 => Some(WriteAccess::No),
      -1 => Some(WriteAccess::Unlikely),
      0 => Some(WriteAccess::NotApplicable),
      1 => Some(WriteAccess::Likely),
      2 => Some(WriteAccess::Definitely),
      _ => None,
    }
  }
}

impl Serialize for WriteAccess {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_i8(self.as_i8())
  }
}

impl<'de> Deserialize<'de> for WriteAccess {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let v = i8::deserialize(deserializer)?;
    WriteAccess::from_i8(v).ok_or_else(|| serde::de::Error::custom(format!("write access out of range: {}", v)))
  }
}

/// GitHub `author_association` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Association {
  Owner,
  Member,
  Collaborator,
  Contributor,
  FirstTimer,
  FirstTimeContributor,
  Mannequin,
  None,
  #[serde(other)]
  Other,
}

impl Association {
  pub fn parse(s: &str) -> Self {
    match s.to_ascii_uppercase().as_str() {
      "OWNER" => Association::Owner,
      "MEMBER" => Association::Member,
      "COLLABORATOR" => Association::Collaborator,
      "CONTRIBUTOR" => Association::Contributor,
      "FIRST_TIMER" => Association::FirstTimer,
      "FIRST_TIME_CONTRIBUTOR" => Association::FirstTimeContributor,
      "MANNEQUIN" => Association::Mannequin,
      "NONE" => Association::None,
      _ => Association::Other,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
  pub kind: EventKind,
  pub timestamp: DateTime<Utc>,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub actor: String,
  #[serde(default, skip_serializing_if = "std::ops::Not::not")]
  pub bot: bool,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub target: String,
  #[serde(default, skip_serializing_if = "std::ops::Not::not")]
  pub target_is_bot: bool,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub outcome: String,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub body: String,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub description: String,
  #[serde(default, skip_serializing_if = "std::ops::Not::not")]
  pub question: bool,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub mentions: Vec<String>,
  #[serde(default)]
  pub write_access: WriteAccess,
  #[serde(default, skip_serializing_if = "std::ops::Not::not")]
  pub required: bool,
  #[serde(default, skip_serializing_if = "std::ops::Not::not")]
  pub outdated: bool,
  /// Raw association of the actor; consumed by the access resolver.
  #[serde(skip)]
  pub association: Option<Association>,
}

impl Event {
  pub fn new(kind: EventKind, timestamp: DateTime<Utc>) -> Self {
    Self {
      kind,
      timestamp,
      actor: String::new(),
      bot: false,
      target: String::new(),
      target_is_bot: false,
      outcome: String::new(),
      body: String::new(),
      description: String::new(),
      question: false,
      mentions: Vec::new(),
      write_access: WriteAccess::NotApplicable,
      required: false,
      outdated: false,
      association: None,
    }
  }

  /// Total order used for the finalized timeline: timestamp first, then content.
  pub fn timeline_cmp(&self, other: &Event) -> Ordering {
    self
      .timestamp
      .cmp(&other.timestamp)
      .then_with(|| self.kind.cmp(&other.kind))
      .then_with(|| self.actor.cmp(&other.actor))
      .then_with(|| self.target.cmp(&other.target))
      .then_with(|| self.body.cmp(&other.body))
      .then_with(|| self.outcome.cmp(&other.outcome))
      .then_with(|| self.description.cmp(&other.description))
  }
}

/// Latest outcome per check name, split into disjoint categories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckSummary {
  pub success: BTreeMap<String, String>,
  pub failing: BTreeMap<String, String>,
  pub pending: BTreeMap<String, String>,
  pub cancelled: BTreeMap<String, String>,
  pub skipped: BTreeMap<String, String>,
  pub stale: BTreeMap<String, String>,
  pub neutral: BTreeMap<String, String>,
}

impl CheckSummary {
  pub fn categories(&self) -> [&BTreeMap<String, String>; 7] {
    [
      &self.success,
      &self.failing,
      &self.pending,
      &self.cancelled,
      &self.skipped,
      &self.stale,
      &self.neutral,
    ]
  }

  pub fn contains(&self, name: &str) -> bool {
    self.categories().iter().any(|m| m.contains_key(name))
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalSummary {
  pub approvals_with_write_access: u32,
  pub approvals_with_unknown_access: u32,
  pub approvals_without_write_access: u32,
  pub changes_requested: u32,
}

impl ApprovalSummary {
  /// Approvals that could satisfy branch protection.
  pub fn counted_approvals(&self) -> u32 {
    self.approvals_with_write_access + self.approvals_with_unknown_access
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestState {
  #[default]
  None,
  Pending,
  Passing,
  Failing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewState {
  Pending,
  Approved,
  ChangesRequested,
  Commented,
  Dismissed,
}

impl ReviewState {
  pub fn parse(s: &str) -> Option<Self> {
    match s.to_ascii_lowercase().as_str() {
      "pending" => Some(ReviewState::Pending),
      "approved" => Some(ReviewState::Approved),
      "changes_requested" => Some(ReviewState::ChangesRequested),
      "commented" => Some(ReviewState::Commented),
      "dismissed" => Some(ReviewState::Dismissed),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PullRequest {
  pub number: u64,
  pub title: String,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub body: String,
  pub author: String,
  #[serde(default)]
  pub author_bot: bool,
  #[serde(default)]
  pub author_write_access: WriteAccess,
  pub state: String,
  #[serde(default)]
  pub draft: bool,
  #[serde(default)]
  pub merged: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub merged_by: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub mergeable: Option<bool>,
  #[serde(default)]
  pub mergeable_state: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub mergeable_state_description: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_at: Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub updated_at: Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub closed_at: Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub merged_at: Option<DateTime<Utc>>,
  #[serde(default)]
  pub head_sha: String,
  #[serde(default)]
  pub base_ref: String,
  #[serde(default)]
  pub additions: u64,
  #[serde(default)]
  pub deletions: u64,
  #[serde(default)]
  pub changed_files: u64,
  #[serde(default)]
  pub assignees: Vec<String>,
  #[serde(default)]
  pub requested_reviewers: Vec<String>,
  #[serde(default)]
  pub labels: Vec<String>,
  #[serde(default)]
  pub required_checks: Vec<String>,
  // Derived (summary::finalize only)
  #[serde(default)]
  pub reviewers: BTreeMap<String, ReviewState>,
  #[serde(default)]
  pub participant_access: BTreeMap<String, WriteAccess>,
  #[serde(default)]
  pub check_summary: CheckSummary,
  #[serde(default)]
  pub approval_summary: ApprovalSummary,
  #[serde(default)]
  pub test_state: TestState,
}

/// The unit returned by a fetch and stored by the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequestData {
  pub pull_request: PullRequest,
  pub events: Vec<Event>,
}
