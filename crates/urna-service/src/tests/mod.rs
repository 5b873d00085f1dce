//! Service tests against an in-memory `SqliteStore`.

mod identity;
mod roster;

use urna_core::{
  PersonId,
  identity::{NewPerson, Role},
  roster::{CandidateAttributes, NewCandidate, NewStudent},
  store::CredentialStore,
  vote::Category,
};
use urna_store_sqlite::SqliteStore;

use crate::{
  IdentityService, Limits, RosterService, Session, StudentEnrollment, VotingService,
  password::fast_hasher,
};

pub(crate) const ADMIN_PASSWORD: &str = "admin-pass-1";
pub(crate) const VOTER_PASSWORD: &str = "voter-pass-1";

pub(crate) struct Harness {
  pub store:    SqliteStore,
  pub identity: IdentityService<SqliteStore>,
  pub voting:   VotingService<SqliteStore, SqliteStore>,
  pub roster:   RosterService<SqliteStore>,
}

pub(crate) async fn harness() -> Harness {
  let store = SqliteStore::open_in_memory()
    .await
    .expect("in-memory store");
  store.add_role(Role::ADMIN.into()).await.unwrap();
  store.add_role(Role::STUDENT.into()).await.unwrap();

  let hasher = fast_hasher();
  let limits = Limits::default();

  Harness {
    identity: IdentityService::new(store.clone(), hasher.clone(), limits.clone()),
    voting:   VotingService::new(store.clone(), store.clone(), limits.clone()),
    roster:   RosterService::new(store.clone(), hasher, limits),
    store,
  }
}

pub(crate) fn person(national_id: &str) -> NewPerson {
  NewPerson {
    national_id: national_id.into(),
    name:        "Ana".into(),
    surname:     "Quispe".into(),
    age:         20,
  }
}

impl Harness {
  /// Bootstrap the administrator (no personal profile) and log in.
  pub async fn admin(&self) -> Session {
    self
      .identity
      .bootstrap_admin("rector", ADMIN_PASSWORD)
      .await
      .unwrap();
    self.identity.authenticate("rector", ADMIN_PASSWORD).await.unwrap()
  }

  /// Enroll a student with a login, replace the temporary password, and log
  /// in as them.
  pub async fn voter(&self, admin: &Session, username: &str, national_id: &str) -> Session {
    self
      .roster
      .enroll_student(admin, StudentEnrollment {
        username: Some(username.into()),
        person:   person(national_id),
        student:  NewStudent {
          program:       "Derecho".into(),
          enrollment_id: format!("V-{national_id}"),
        },
      })
      .await
      .unwrap();
    let temporary = self.identity.authenticate(username, national_id).await.unwrap();
    self
      .identity
      .change_password_first_login(&temporary, VOTER_PASSWORD)
      .await
      .unwrap();
    self.identity.authenticate(username, VOTER_PASSWORD).await.unwrap()
  }

  /// Enroll a student without a login and nominate them.
  pub async fn candidate(&self, admin: &Session, national_id: &str, category: &str) -> PersonId {
    let enrollment = self
      .roster
      .enroll_student(admin, StudentEnrollment {
        username: None,
        person:   person(national_id),
        student:  NewStudent {
          program:       "Artes".into(),
          enrollment_id: format!("C-{national_id}"),
        },
      })
      .await
      .unwrap();
    self
      .roster
      .nominate(admin, NewCandidate {
        student_id: enrollment.student_id,
        category:   Category::new(category),
        photo_path: None,
        attributes: CandidateAttributes::default(),
      })
      .await
      .unwrap()
      .candidate_id()
  }
}
