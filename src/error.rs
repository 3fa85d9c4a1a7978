use thiserror::Error;

/// Errors surfaced by upstream fetches and the pipeline.
///
/// Cloneable so that callers blocked on a shared in-flight fetch can all
/// receive the leader's failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
  #[error("GitHub API returned {status} for {url}")]
  Status { status: u16, url: String },

  #[error("transport error: {0}")]
  Transport(String),

  #[error("decode error for {url}: {message}")]
  Decode { url: String, message: String },

  #[error("deadline exceeded")]
  Timeout,

  #[error("no events obtained ({failed} of {total} fetch tasks failed)")]
  NoEvents { failed: usize, total: usize },

  #[error("fixture error: {0}")]
  Fixture(String),
}

impl FetchError {
  pub fn status(&self) -> Option<u16> {
    match self {
      FetchError::Status { status, .. } => Some(*status),
      _ => None,
    }
  }

  pub fn is_forbidden(&self) -> bool {
    self.status() == Some(403)
  }

  pub fn is_not_found(&self) -> bool {
    self.status() == Some(404)
  }
}
