//! Accounts, roles, and the personal profiles attached to them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{AccountId, PersonId, RoleId};

// ─── Role ────────────────────────────────────────────────────────────────────

/// A named permission set referenced by accounts. A role cannot be deleted
/// while any account references it (enforced by a foreign key).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
  pub role_id: RoleId,
  pub name:    String,
}

impl Role {
  /// Role name granting roster and account administration.
  pub const ADMIN: &'static str = "admin";
  /// Role name given to enrolled students.
  pub const STUDENT: &'static str = "student";

  pub fn is_admin(&self) -> bool { self.name == Self::ADMIN }
}

// ─── Person ──────────────────────────────────────────────────────────────────

/// Personal data shared by account holders and students.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
  pub person_id:   PersonId,
  /// Unique national identifier.
  pub national_id: String,
  pub name:        String,
  pub surname:     String,
  pub age:         u8,
  /// The account owning this profile, if any.
  pub account_id:  Option<AccountId>,
}

/// Input for a new `people` row. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPerson {
  pub national_id: String,
  pub name:        String,
  pub surname:     String,
  pub age:         u8,
}

// ─── Account ─────────────────────────────────────────────────────────────────

/// A login account.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
  pub account_id:    AccountId,
  pub username:      String,
  /// Argon2 PHC string, or a legacy hex SHA-256 digest awaiting upgrade.
  pub password_hash: String,
  pub role_id:       RoleId,
  pub active:        bool,
  /// Set while the account holds a temporary password that must be replaced
  /// before the next ordinary credential change.
  pub forced_change: bool,
  pub created_at:    DateTime<Utc>,
}

impl fmt::Debug for Account {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Account")
      .field("account_id", &self.account_id)
      .field("username", &self.username)
      .field("password_hash", &"<redacted>")
      .field("role_id", &self.role_id)
      .field("active", &self.active)
      .field("forced_change", &self.forced_change)
      .field("created_at", &self.created_at)
      .finish()
  }
}

/// Input for a new `accounts` row. The password is already hashed; the store
/// assigns the id and creation timestamp.
#[derive(Debug, Clone)]
pub struct NewAccount {
  pub username:      String,
  pub password_hash: String,
  pub role_id:       RoleId,
  pub active:        bool,
  pub forced_change: bool,
}

/// An account hydrated with its role and optional profile.
#[derive(Debug, Clone)]
pub struct AccountProfile {
  pub account: Account,
  pub role:    Role,
  pub person:  Option<Person>,
}
