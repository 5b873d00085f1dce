//! The explicit caller context handed to every voting and administrative
//! operation.

use chrono::{DateTime, Utc};
use urna_core::{
  AccountId, Error, PersonId, Result,
  identity::{AccountProfile, Role},
};
use uuid::Uuid;

/// An authenticated caller.
///
/// Only [`crate::IdentityService::authenticate`] creates sessions. A session is
/// a snapshot taken at login; it is not refreshed if the account changes
/// afterwards.
#[derive(Debug, Clone)]
pub struct Session {
  session_id: Uuid,
  started_at: DateTime<Utc>,
  profile:    AccountProfile,
}

impl Session {
  pub(crate) fn open(profile: AccountProfile) -> Self {
    Self { session_id: Uuid::new_v4(), started_at: Utc::now(), profile }
  }

  pub fn session_id(&self) -> Uuid { self.session_id }

  pub fn started_at(&self) -> DateTime<Utc> { self.started_at }

  pub fn profile(&self) -> &AccountProfile { &self.profile }

  pub fn account_id(&self) -> AccountId { self.profile.account.account_id }

  pub fn username(&self) -> &str { &self.profile.account.username }

  pub fn role(&self) -> &Role { &self.profile.role }

  /// The person this session votes as, if the account has a profile.
  pub fn voter(&self) -> Option<PersonId> {
    self.profile.person.as_ref().map(|p| p.person_id)
  }

  /// The caller still holds a temporary password and should be sent to the
  /// first-login password change.
  pub fn password_change_required(&self) -> bool {
    self.profile.account.forced_change
  }

  /// Refuse sessions opened with a temporary password. Such a session may
  /// only be used for the first-login password change.
  pub(crate) fn require_settled(&self) -> Result<()> {
    if self.password_change_required() {
      Err(Error::PasswordChangeRequired(self.account_id()))
    } else {
      Ok(())
    }
  }

  pub(crate) fn require_admin(&self) -> Result<()> {
    if !self.profile.role.is_admin() {
      return Err(Error::Forbidden(Role::ADMIN));
    }
    self.require_settled()
  }
}
