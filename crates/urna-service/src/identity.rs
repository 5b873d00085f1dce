//! Identity Service: authentication, registration, and the password
//! lifecycle.
//!
//! ```text
//! Temporary (forced_change) --change_password_first_login--> Normal
//! Normal --change_password--> Normal
//! ```
//!
//! `change_password` refuses accounts that still hold a temporary password,
//! and `change_password_first_login` refuses accounts that do not. The latter
//! acts only on the account of the session that logged in with the temporary
//! password.

use urna_core::{
  AccountId, Entity, Error, Result, ValidationError,
  identity::{AccountProfile, NewAccount, NewPerson, Role},
  store::CredentialStore,
};

use crate::{
  limits::Limits,
  password::{PasswordHasher, Verification},
  session::Session,
};

/// Input to [`IdentityService::register`].
#[derive(Debug, Clone)]
pub struct Registration {
  pub username:      String,
  pub password:      String,
  /// Name of an existing role.
  pub role:          String,
  /// Create the account with a temporary password that must be replaced at
  /// first login. Waives the minimum password length.
  pub forced_change: bool,
  pub person:        Option<NewPerson>,
}

pub struct IdentityService<S> {
  store:  S,
  hasher: PasswordHasher,
  limits: Limits,
}

fn hash_failure(err: crate::password::HashError) -> Error {
  Error::Persistence(Box::new(err))
}

impl<S: CredentialStore> IdentityService<S> {
  pub fn new(store: S, hasher: PasswordHasher, limits: Limits) -> Self {
    Self { store, hasher, limits }
  }

  // ── Authentication ────────────────────────────────────────────────────────

  /// Verify `username`/`password` and open a [`Session`].
  ///
  /// An unknown username and a wrong password both yield
  /// [`Error::InvalidCredentials`].
  pub async fn authenticate(&self, username: &str, password: &str) -> Result<Session> {
    let username = username.trim();
    if username.is_empty() {
      return Err(ValidationError::Empty { field: "username" }.into());
    }
    if password.is_empty() {
      return Err(ValidationError::Empty { field: "password" }.into());
    }

    let account = self
      .store
      .find_account(username)
      .await
      .map_err(Error::from_store)?;

    let Some(mut account) = account else {
      self.hasher.verify_dummy(password);
      tracing::warn!(username, "authentication failed");
      return Err(Error::InvalidCredentials);
    };

    let verification = self.hasher.verify(password, &account.password_hash);
    if !verification.matched() {
      tracing::warn!(username, "authentication failed");
      return Err(Error::InvalidCredentials);
    }
    if !account.active {
      return Err(Error::AccountDisabled(account.account_id));
    }

    if verification == Verification::LegacyMatch {
      let upgraded = self.hasher.hash(password).map_err(hash_failure)?;
      self
        .store
        .update_password_hash(account.account_id, upgraded.clone(), account.forced_change)
        .await
        .map_err(Error::from_store)?;
      account.password_hash = upgraded;
      tracing::info!(account_id = %account.account_id, "upgraded legacy password hash");
    }

    let role = self
      .store
      .get_role(account.role_id)
      .await
      .map_err(Error::from_store)?
      .ok_or(Error::NotFound(Entity::Role(account.role_id)))?;
    let person = self
      .store
      .person_for_account(account.account_id)
      .await
      .map_err(Error::from_store)?;

    tracing::info!(account_id = %account.account_id, role = %role.name, "authenticated");
    Ok(Session::open(AccountProfile { account, role, person }))
  }

  // ── Registration ──────────────────────────────────────────────────────────

  /// Create an account and its optional profile as one unit.
  ///
  /// Anyone may register a student account. Every other role needs an admin
  /// `session`.
  pub async fn register(
    &self,
    session: Option<&Session>,
    registration: Registration,
  ) -> Result<AccountId> {
    let Registration { username, password, role, forced_change, person } = registration;
    let username = username.trim().to_owned();

    if role != Role::STUDENT {
      session.ok_or(Error::Forbidden(Role::ADMIN))?.require_admin()?;
    }

    self.limits.check_username(&username)?;
    self.limits.check_password("password", &password, forced_change)?;
    if let Some(person) = &person {
      self.limits.check_person(person)?;
    }

    let role = self
      .store
      .find_role(&role)
      .await
      .map_err(Error::from_store)?
      .ok_or_else(|| Error::NotFound(Entity::RoleName(role.clone())))?;

    let password_hash = self.hasher.hash(&password).map_err(hash_failure)?;
    let account = NewAccount {
      username: username.clone(),
      password_hash,
      role_id: role.role_id,
      active: true,
      forced_change,
    };

    let id = self
      .store
      .create_account(account, person)
      .await
      .map_err(Error::from_store)?;

    tracing::info!(account_id = %id, username, role = %role.name, forced_change, "registered account");
    Ok(id)
  }

  /// Create the first administrator. Fails with
  /// [`Error::AdminAlreadyExists`] once any admin account exists.
  pub async fn bootstrap_admin(&self, username: &str, password: &str) -> Result<AccountId> {
    let username = username.trim();
    self.limits.check_username(username)?;
    self.limits.check_password("password", password, false)?;

    let role = self
      .store
      .find_role(Role::ADMIN)
      .await
      .map_err(Error::from_store)?
      .ok_or_else(|| Error::NotFound(Entity::RoleName(Role::ADMIN.into())))?;

    let account = NewAccount {
      username:      username.to_owned(),
      password_hash: self.hasher.hash(password).map_err(hash_failure)?,
      role_id:       role.role_id,
      active:        true,
      forced_change: false,
    };
    let id = self
      .store
      .create_first_account(account)
      .await
      .map_err(Error::from_store)?
      .ok_or(Error::AdminAlreadyExists)?;

    tracing::info!(account_id = %id, username, "bootstrapped administrator");
    Ok(id)
  }

  // ── Password lifecycle ────────────────────────────────────────────────────

  /// Replace a normal password, given the current one.
  pub async fn change_password(
    &self,
    account_id: AccountId,
    current: &str,
    new: &str,
  ) -> Result<()> {
    if current.is_empty() {
      return Err(ValidationError::Empty { field: "current password" }.into());
    }
    self.limits.check_password("new password", new, false)?;

    let account = self
      .store
      .get_account(account_id)
      .await
      .map_err(Error::from_store)?
      .ok_or(Error::NotFound(Entity::Account(account_id)))?;

    if !self.hasher.verify(current, &account.password_hash).matched() {
      tracing::warn!(%account_id, "password change rejected: wrong current password");
      return Err(Error::InvalidCredentials);
    }
    if account.forced_change {
      return Err(Error::PasswordChangeRequired(account_id));
    }
    if self.hasher.verify(new, &account.password_hash).matched() {
      return Err(ValidationError::PasswordUnchanged.into());
    }

    let hash = self.hasher.hash(new).map_err(hash_failure)?;
    let updated = self
      .store
      .update_password_hash(account_id, hash, false)
      .await
      .map_err(Error::from_store)?;
    if !updated {
      return Err(Error::NotFound(Entity::Account(account_id)));
    }

    tracing::info!(%account_id, "password changed");
    Ok(())
  }

  /// Replace the temporary password of the account `session` logged into,
  /// without asking for it again. Only valid while the account's
  /// forced-change flag is set.
  pub async fn change_password_first_login(&self, session: &Session, new: &str) -> Result<()> {
    let account_id = session.account_id();
    if !session.password_change_required() {
      return Err(Error::NoPendingPasswordChange(account_id));
    }
    self.limits.check_password("new password", new, false)?;

    let account = self
      .store
      .get_account(account_id)
      .await
      .map_err(Error::from_store)?
      .ok_or(Error::NotFound(Entity::Account(account_id)))?;

    if !account.forced_change {
      return Err(Error::NoPendingPasswordChange(account_id));
    }
    if self.hasher.verify(new, &account.password_hash).matched() {
      return Err(ValidationError::PasswordUnchanged.into());
    }

    let hash = self.hasher.hash(new).map_err(hash_failure)?;
    let replaced = self
      .store
      .replace_temporary_password(account_id, hash)
      .await
      .map_err(Error::from_store)?;
    if !replaced {
      // Someone else completed the change between our read and the write.
      return Err(Error::NoPendingPasswordChange(account_id));
    }

    tracing::info!(%account_id, "temporary password replaced");
    Ok(())
  }

  // ── Administration ────────────────────────────────────────────────────────

  /// Give an account a new temporary password and raise its forced-change
  /// flag.
  pub async fn reset_password(
    &self,
    session: &Session,
    account_id: AccountId,
    temporary: &str,
  ) -> Result<()> {
    session.require_admin()?;
    self.limits.check_password("temporary password", temporary, true)?;

    let hash = self.hasher.hash(temporary).map_err(hash_failure)?;
    let updated = self
      .store
      .update_password_hash(account_id, hash, true)
      .await
      .map_err(Error::from_store)?;
    if !updated {
      return Err(Error::NotFound(Entity::Account(account_id)));
    }

    tracing::info!(%account_id, by = %session.account_id(), "password reset");
    Ok(())
  }

  pub async fn set_account_active(
    &self,
    session: &Session,
    account_id: AccountId,
    active: bool,
  ) -> Result<()> {
    session.require_admin()?;
    let updated = self
      .store
      .set_account_active(account_id, active)
      .await
      .map_err(Error::from_store)?;
    if !updated {
      return Err(Error::NotFound(Entity::Account(account_id)));
    }

    tracing::info!(%account_id, active, by = %session.account_id(), "account activation changed");
    Ok(())
  }
}
