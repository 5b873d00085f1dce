//! Votes and voting categories.
//!
//! Votes are append-only: once cast, a vote is never updated or deleted. At
//! most one vote may exist per (voter, category) pair.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{PersonId, VoteId};

/// The contest a vote belongs to, e.g. `"Reina"` or `"Fotogenia"`.
///
/// Stored trimmed; comparison is exact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
  pub fn new(name: impl AsRef<str>) -> Self {
    Self(name.as_ref().trim().to_owned())
  }

  pub fn as_str(&self) -> &str { &self.0 }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for Category {
  fn from(s: &str) -> Self { Self::new(s) }
}

/// A cast vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
  pub vote_id:      VoteId,
  pub voter_id:     PersonId,
  pub candidate_id: PersonId,
  pub category:     Category,
  /// Server-assigned; never changes after creation.
  pub cast_at:      DateTime<Utc>,
}

/// Input to [`crate::store::VoteLedger::record_vote`].
/// `cast_at` is always set by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVote {
  pub voter_id:     PersonId,
  pub candidate_id: PersonId,
  pub category:     Category,
}
