//! Error types for `urna-core`.
//!
//! [`Error`] is what every service operation returns. Each variant belongs to
//! exactly one [`ErrorKind`], so callers can tell a business outcome (already
//! voted, duplicate username) apart from an unexpected storage failure.

use std::fmt;

use thiserror::Error;

use crate::{
  id::{AccountId, AlbumId, PersonId, RoleId},
  store::StoreError,
  vote::Category,
};

// ─── Kinds ───────────────────────────────────────────────────────────────────

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// Malformed or missing input, detected before any storage access.
  Validation,
  /// A uniqueness rule was violated.
  Duplicate,
  /// A referenced entity does not exist.
  NotFound,
  /// The operation is not allowed in the current state or for this caller.
  Authorization,
  /// Storage or transaction failure unrelated to a business rule.
  Persistence,
}

// ─── Supporting types ────────────────────────────────────────────────────────

/// The unique key a write collided with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UniqueKey {
  Username,
  NationalId,
  RoleName,
  EnrollmentId,
  /// The student is already nominated as a candidate.
  Candidate,
  /// A vote already exists for the same (voter, category) pair.
  VotePerCategory,
  /// Any other constraint; carries the columns reported by the backend.
  Other(String),
}

impl fmt::Display for UniqueKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Username => f.write_str("username"),
      Self::NationalId => f.write_str("national id"),
      Self::RoleName => f.write_str("role name"),
      Self::EnrollmentId => f.write_str("enrollment id"),
      Self::Candidate => f.write_str("candidate"),
      Self::VotePerCategory => f.write_str("vote for category"),
      Self::Other(cols) => write!(f, "key ({cols})"),
    }
  }
}

/// An entity that a lookup expected to find.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entity {
  Account(AccountId),
  Person(PersonId),
  Role(RoleId),
  RoleName(String),
  Student(PersonId),
  Candidate(PersonId),
  Album(AlbumId),
}

impl fmt::Display for Entity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Account(id) => write!(f, "account {id}"),
      Self::Person(id) => write!(f, "person {id}"),
      Self::Role(id) => write!(f, "role {id}"),
      Self::RoleName(name) => write!(f, "role {name:?}"),
      Self::Student(id) => write!(f, "student {id}"),
      Self::Candidate(id) => write!(f, "candidate {id}"),
      Self::Album(id) => write!(f, "album {id}"),
    }
  }
}

/// Input rejected before touching storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("{field} must not be empty")]
  Empty { field: &'static str },

  #[error("{field} must be between {min} and {max} characters")]
  Length {
    field: &'static str,
    min:   usize,
    max:   usize,
  },

  #[error("national id must be exactly {0} digits")]
  NationalId(usize),

  #[error("age must be between {min} and {max}")]
  Age { min: u8, max: u8 },

  #[error("the new password must differ from the current one")]
  PasswordUnchanged,

  #[error("the session has no voter profile")]
  MissingVoter,
}

// ─── Error ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum Error {
  #[error("validation failed: {0}")]
  Validation(#[from] ValidationError),

  /// Unknown username or wrong password; the two are never distinguished.
  #[error("invalid username or password")]
  InvalidCredentials,

  #[error("duplicate {0}")]
  Duplicate(UniqueKey),

  #[error("a vote was already cast in category {0}")]
  AlreadyVoted(Category),

  #[error("{0} not found")]
  NotFound(Entity),

  #[error("account {0} is disabled")]
  AccountDisabled(AccountId),

  #[error("candidate {0} is not accepting votes")]
  InactiveCandidate(PersonId),

  #[error("account {0} has no pending password change")]
  NoPendingPasswordChange(AccountId),

  #[error("account {0} must replace its temporary password first")]
  PasswordChangeRequired(AccountId),

  #[error("operation requires the {0:?} role")]
  Forbidden(&'static str),

  /// The first-administrator bootstrap was already used.
  #[error("an administrator account already exists")]
  AdminAlreadyExists,

  #[error("persistence failure: {0}")]
  Persistence(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::Validation(_) => ErrorKind::Validation,
      Self::Duplicate(_) | Self::AlreadyVoted(_) => ErrorKind::Duplicate,
      Self::NotFound(_) => ErrorKind::NotFound,
      Self::InvalidCredentials
      | Self::AccountDisabled(_)
      | Self::InactiveCandidate(_)
      | Self::NoPendingPasswordChange(_)
      | Self::PasswordChangeRequired(_)
      | Self::Forbidden(_)
      | Self::AdminAlreadyExists => ErrorKind::Authorization,
      Self::Persistence(_) => ErrorKind::Persistence,
    }
  }

  /// Translate a storage failure: unique violations become
  /// [`Error::Duplicate`], everything else is a persistence failure.
  pub fn from_store<E: StoreError>(err: E) -> Self {
    match err.unique_violation() {
      Some(key) => Self::Duplicate(key),
      None => Self::Persistence(Box::new(err)),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
