use urna_core::{
  Entity, Error, ErrorKind, UniqueKey, ValidationError,
  identity::Role,
  store::CredentialStore,
};

use super::{ADMIN_PASSWORD, harness, person};
use crate::{Registration, password::legacy_digest};

fn registration(username: &str, password: &str) -> Registration {
  Registration {
    username:      username.into(),
    password:      password.into(),
    role:          Role::STUDENT.into(),
    forced_change: false,
    person:        None,
  }
}

// ─── Authentication ──────────────────────────────────────────────────────────

#[tokio::test]
async fn authenticate_hydrates_profile() {
  let h = harness().await;
  let mut reg = registration("ana_q", "long-enough-1");
  reg.person = Some(person("0102030405"));
  let id = h.identity.register(None, reg).await.unwrap();

  let session = h.identity.authenticate("ana_q", "long-enough-1").await.unwrap();
  assert_eq!(session.account_id(), id);
  assert_eq!(session.username(), "ana_q");
  assert_eq!(session.role().name, Role::STUDENT);
  assert!(!session.password_change_required());
  assert!(session.started_at() <= chrono::Utc::now());

  let person = session.profile().person.as_ref().unwrap();
  assert_eq!(person.national_id, "0102030405");
  assert_eq!(session.voter(), Some(person.person_id));
}

#[tokio::test]
async fn unknown_user_and_wrong_password_are_indistinguishable() {
  let h = harness().await;
  h.identity
    .register(None, registration("ana_q", "long-enough-1"))
    .await
    .unwrap();

  let unknown = h.identity.authenticate("nobody", "long-enough-1").await.unwrap_err();
  let wrong = h.identity.authenticate("ana_q", "not-the-one").await.unwrap_err();

  assert!(matches!(unknown, Error::InvalidCredentials));
  assert!(matches!(wrong, Error::InvalidCredentials));
  assert_eq!(unknown.to_string(), wrong.to_string());
}

#[tokio::test]
async fn empty_credentials_fail_validation() {
  let h = harness().await;
  let err = h.identity.authenticate("", "whatever").await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Validation);
  let err = h.identity.authenticate("ana_q", "").await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn disabled_account_cannot_log_in() {
  let h = harness().await;
  let admin = h.admin().await;
  let id = h
    .identity
    .register(None, registration("ana_q", "long-enough-1"))
    .await
    .unwrap();

  h.identity.set_account_active(&admin, id, false).await.unwrap();

  let err = h.identity.authenticate("ana_q", "long-enough-1").await.unwrap_err();
  assert!(matches!(err, Error::AccountDisabled(a) if a == id));
  // A wrong password still reveals nothing about the account state.
  let err = h.identity.authenticate("ana_q", "wrong-password").await.unwrap_err();
  assert!(matches!(err, Error::InvalidCredentials));
}

#[tokio::test]
async fn legacy_digest_is_upgraded_on_login() {
  let h = harness().await;
  let id = h
    .identity
    .register(None, registration("ana_q", "long-enough-1"))
    .await
    .unwrap();
  h.store
    .update_password_hash(id, legacy_digest("legacy-pass-1"), false)
    .await
    .unwrap();

  h.identity.authenticate("ana_q", "legacy-pass-1").await.unwrap();

  let stored = h.store.get_account(id).await.unwrap().unwrap();
  assert!(stored.password_hash.starts_with("$argon2id$"));
  h.identity.authenticate("ana_q", "legacy-pass-1").await.unwrap();
}

// ─── Registration ────────────────────────────────────────────────────────────

#[tokio::test]
async fn forced_change_waives_minimum_password_length() {
  let h = harness().await;

  let mut temporary = registration("temp_user", "123456");
  temporary.forced_change = true;
  h.identity.register(None, temporary).await.unwrap();

  let err = h
    .identity
    .register(None, registration("normal_user", "123456"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Validation(ValidationError::Length { .. })));
}

#[tokio::test]
async fn forced_change_still_enforces_maximum_length() {
  let h = harness().await;
  let mut reg = registration("temp_user", &"x".repeat(65));
  reg.forced_change = true;
  let err = h.identity.register(None, reg).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn duplicate_username_is_reported_as_duplicate() {
  let h = harness().await;
  h.identity
    .register(None, registration("ana_q", "long-enough-1"))
    .await
    .unwrap();

  let err = h
    .identity
    .register(None, registration("ana_q", "other-pass-2"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Duplicate(UniqueKey::Username)));
  assert_eq!(err.kind(), ErrorKind::Duplicate);
}

#[tokio::test]
async fn duplicate_national_id_creates_no_account() {
  let h = harness().await;
  let mut first = registration("ana_q", "long-enough-1");
  first.person = Some(person("0102030405"));
  h.identity.register(None, first).await.unwrap();

  let mut second = registration("bea_r", "long-enough-1");
  second.person = Some(person("0102030405"));
  let err = h.identity.register(None, second).await.unwrap_err();
  assert!(matches!(err, Error::Duplicate(UniqueKey::NationalId)));

  assert!(h.store.find_account("bea_r").await.unwrap().is_none());
}

#[tokio::test]
async fn anonymous_admin_registration_is_forbidden() {
  let h = harness().await;
  let mut reg = registration("mallory", "long-enough-1");
  reg.role = Role::ADMIN.into();

  let err = h.identity.register(None, reg.clone()).await.unwrap_err();
  assert!(matches!(err, Error::Forbidden(Role::ADMIN)));
  assert_eq!(err.kind(), ErrorKind::Authorization);
  assert!(h.store.find_account("mallory").await.unwrap().is_none());

  // A student session is no better than none.
  h.identity
    .register(None, registration("ana_q", "long-enough-1"))
    .await
    .unwrap();
  let student = h.identity.authenticate("ana_q", "long-enough-1").await.unwrap();
  let err = h.identity.register(Some(&student), reg.clone()).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Authorization);

  let admin = h.admin().await;
  h.identity.register(Some(&admin), reg).await.unwrap();
  let session = h.identity.authenticate("mallory", "long-enough-1").await.unwrap();
  assert!(session.role().is_admin());
}

#[tokio::test]
async fn admin_bootstrap_is_single_use() {
  let h = harness().await;
  h.identity
    .bootstrap_admin("rector", ADMIN_PASSWORD)
    .await
    .unwrap();

  let err = h
    .identity
    .bootstrap_admin("usurper", "long-enough-1")
    .await
    .unwrap_err();
  assert!(matches!(err, Error::AdminAlreadyExists));
  assert_eq!(err.kind(), ErrorKind::Authorization);
  assert!(h.store.find_account("usurper").await.unwrap().is_none());
}

#[tokio::test]
async fn unknown_role_is_not_found() {
  let h = harness().await;
  let admin = h.admin().await;
  let mut reg = registration("ana_q", "long-enough-1");
  reg.role = "janitor".into();
  let err = h.identity.register(Some(&admin), reg).await.unwrap_err();
  assert!(matches!(err, Error::NotFound(Entity::RoleName(ref r)) if r == "janitor"));
}

#[tokio::test]
async fn invalid_person_is_rejected_before_any_write() {
  let h = harness().await;
  let mut reg = registration("ana_q", "long-enough-1");
  let mut p = person("0102030405");
  p.age = 3;
  reg.person = Some(p);

  let err = h.identity.register(None, reg).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Validation);
  assert!(h.store.find_account("ana_q").await.unwrap().is_none());
}

// ─── Password lifecycle ──────────────────────────────────────────────────────

#[tokio::test]
async fn change_password_requires_current() {
  let h = harness().await;
  let id = h
    .identity
    .register(None, registration("ana_q", "long-enough-1"))
    .await
    .unwrap();

  let err = h
    .identity
    .change_password(id, "wrong-current", "brand-new-2")
    .await
    .unwrap_err();
  assert!(matches!(err, Error::InvalidCredentials));

  let err = h
    .identity
    .change_password(id, "long-enough-1", "long-enough-1")
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Validation(ValidationError::PasswordUnchanged)));

  let err = h
    .identity
    .change_password(id, "long-enough-1", "short")
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Validation);

  h.identity
    .change_password(id, "long-enough-1", "brand-new-2")
    .await
    .unwrap();
  assert!(h.identity.authenticate("ana_q", "long-enough-1").await.is_err());
  h.identity.authenticate("ana_q", "brand-new-2").await.unwrap();
}

#[tokio::test]
async fn wrong_current_password_hides_temporary_state() {
  let h = harness().await;
  let mut reg = registration("ana_q", "010203");
  reg.forced_change = true;
  let id = h.identity.register(None, reg).await.unwrap();

  let err = h
    .identity
    .change_password(id, "wrong-current", "brand-new-2")
    .await
    .unwrap_err();
  assert!(matches!(err, Error::InvalidCredentials));
}

#[tokio::test]
async fn first_login_change_fails_without_forced_flag() {
  let h = harness().await;
  let id = h
    .identity
    .register(None, registration("ana_q", "long-enough-1"))
    .await
    .unwrap();
  let session = h.identity.authenticate("ana_q", "long-enough-1").await.unwrap();

  let err = h
    .identity
    .change_password_first_login(&session, "perfectly-valid-2")
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NoPendingPasswordChange(a) if a == id));
  assert_eq!(err.kind(), ErrorKind::Authorization);

  // Nothing was written.
  h.identity.authenticate("ana_q", "long-enough-1").await.unwrap();
}

#[tokio::test]
async fn first_login_change_only_touches_the_session_account() {
  let h = harness().await;
  for (username, temporary) in [("ana_q", "010203"), ("bea_r", "040506")] {
    let mut reg = registration(username, temporary);
    reg.forced_change = true;
    h.identity.register(None, reg).await.unwrap();
  }

  let bea = h.identity.authenticate("bea_r", "040506").await.unwrap();
  h.identity
    .change_password_first_login(&bea, "taken-over-1")
    .await
    .unwrap();

  // Ana's temporary credential is untouched and the new password is Bea's.
  let ana = h.identity.authenticate("ana_q", "010203").await.unwrap();
  assert!(ana.password_change_required());
  assert!(matches!(
    h.identity.authenticate("ana_q", "taken-over-1").await,
    Err(Error::InvalidCredentials)
  ));
  h.identity.authenticate("bea_r", "taken-over-1").await.unwrap();
}

#[tokio::test]
async fn temporary_password_lifecycle() {
  let h = harness().await;
  let mut reg = registration("ana_q", "010203");
  reg.forced_change = true;
  let id = h.identity.register(None, reg).await.unwrap();

  let temporary = h.identity.authenticate("ana_q", "010203").await.unwrap();
  assert!(temporary.password_change_required());

  // The ordinary change is not reachable from the temporary state.
  let err = h
    .identity
    .change_password(id, "010203", "brand-new-2")
    .await
    .unwrap_err();
  assert!(matches!(err, Error::PasswordChangeRequired(_)));

  h.identity
    .change_password_first_login(&temporary, "brand-new-2")
    .await
    .unwrap();

  let account = h.store.get_account(id).await.unwrap().unwrap();
  assert!(!account.forced_change);

  // The old session still claims a pending change; the store decides.
  let err = h
    .identity
    .change_password_first_login(&temporary, "another-one-3")
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NoPendingPasswordChange(_)));

  let session = h.identity.authenticate("ana_q", "brand-new-2").await.unwrap();
  assert!(!session.password_change_required());

  h.identity
    .change_password(id, "brand-new-2", "another-one-3")
    .await
    .unwrap();
}

// ─── Administration ──────────────────────────────────────────────────────────

#[tokio::test]
async fn reset_password_is_admin_only() {
  let h = harness().await;
  let admin = h.admin().await;
  let id = h
    .identity
    .register(None, registration("ana_q", "long-enough-1"))
    .await
    .unwrap();
  let student = h.identity.authenticate("ana_q", "long-enough-1").await.unwrap();

  let err = h
    .identity
    .reset_password(&student, id, "123456")
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Forbidden(Role::ADMIN)));

  h.identity.reset_password(&admin, id, "123456").await.unwrap();
  let session = h.identity.authenticate("ana_q", "123456").await.unwrap();
  assert!(session.password_change_required());

  // The admin's own credentials are untouched.
  h.identity.authenticate("rector", ADMIN_PASSWORD).await.unwrap();
}

#[tokio::test]
async fn admin_with_temporary_password_cannot_act() {
  let h = harness().await;
  let admin = h.admin().await;
  let mut reg = registration("vice", "123456");
  reg.role = Role::ADMIN.into();
  reg.forced_change = true;
  h.identity.register(Some(&admin), reg).await.unwrap();
  let student = h
    .identity
    .register(None, registration("ana_q", "long-enough-1"))
    .await
    .unwrap();

  let vice = h.identity.authenticate("vice", "123456").await.unwrap();
  let err = h
    .identity
    .set_account_active(&vice, student, false)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::PasswordChangeRequired(_)));
  h.identity.authenticate("ana_q", "long-enough-1").await.unwrap();
}
