//! Error type for `urna-store-sqlite`.

use rusqlite::{ErrorCode, ffi};
use thiserror::Error;
use urna_core::{UniqueKey, store::StoreError};

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(tokio_rusqlite::Error),

  /// A write collided with a UNIQUE or PRIMARY KEY constraint.
  #[error("duplicate {0}")]
  Duplicate(UniqueKey),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),
}

impl From<tokio_rusqlite::Error> for Error {
  fn from(err: tokio_rusqlite::Error) -> Self {
    if let tokio_rusqlite::Error::Rusqlite(inner) = &err
      && let Some(key) = unique_key(inner)
    {
      return Self::Duplicate(key);
    }
    Self::Database(err)
  }
}

impl StoreError for Error {
  fn unique_violation(&self) -> Option<UniqueKey> {
    match self {
      Self::Duplicate(key) => Some(key.clone()),
      _ => None,
    }
  }
}

/// Identify the unique key behind a constraint failure, if it is one.
fn unique_key(err: &rusqlite::Error) -> Option<UniqueKey> {
  let rusqlite::Error::SqliteFailure(failure, message) = err else {
    return None;
  };
  if failure.code != ErrorCode::ConstraintViolation {
    return None;
  }
  let message = message.as_deref().unwrap_or_default();
  match failure.extended_code {
    ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
      Some(key_for_message(message))
    }
    // Without extended result codes only the message tells them apart.
    ffi::SQLITE_CONSTRAINT if message.starts_with("UNIQUE constraint failed") => {
      Some(key_for_message(message))
    }
    _ => None,
  }
}

/// SQLite reports e.g. `UNIQUE constraint failed: votes.voter_id, votes.category`.
fn key_for_message(message: &str) -> UniqueKey {
  let columns = message
    .split_once(": ")
    .map(|(_, cols)| cols)
    .unwrap_or(message);
  let first = columns.split(',').next().unwrap_or_default().trim();

  match first {
    "accounts.username" => UniqueKey::Username,
    "people.national_id" => UniqueKey::NationalId,
    "roles.name" => UniqueKey::RoleName,
    "students.enrollment_id" => UniqueKey::EnrollmentId,
    "candidates.id" => UniqueKey::Candidate,
    "votes.voter_id" => UniqueKey::VotePerCategory,
    _ => UniqueKey::Other(columns.to_owned()),
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
