use urna_core::{
  AlbumId, Entity, Error, ErrorKind, PersonId, UniqueKey,
  album::{AlbumDraft, NewPhoto},
  identity::Role,
  roster::{CandidateAttributes, NewCandidate, NewStudent},
  store::CredentialStore,
  vote::Category,
};

use super::{VOTER_PASSWORD, harness, person};
use crate::StudentEnrollment;

fn enrollment(username: Option<&str>, national_id: &str, enrollment_id: &str) -> StudentEnrollment {
  StudentEnrollment {
    username: username.map(Into::into),
    person:   person(national_id),
    student:  NewStudent {
      program:       "Medicina".into(),
      enrollment_id: enrollment_id.into(),
    },
  }
}

fn draft(owner_id: PersonId, paths: &[&str]) -> AlbumDraft {
  AlbumDraft {
    album_id: None,
    title: "Campaña".into(),
    description: Some("Fotos oficiales".into()),
    owner_id,
    photos: paths
      .iter()
      .map(|p| NewPhoto { path: (*p).into(), description: None })
      .collect(),
  }
}

// ─── Enrollment ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn roster_operations_require_admin() {
  let h = harness().await;
  let admin = h.admin().await;
  let student = h.voter(&admin, "votante", "0102030405").await;

  let err = h
    .roster
    .enroll_student(&student, enrollment(None, "1111111111", "E-1"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Forbidden(Role::ADMIN)));
  assert_eq!(err.kind(), ErrorKind::Authorization);

  let own_id = student.voter().unwrap();
  let err = h
    .roster
    .set_candidate_active(&student, own_id, false)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Forbidden(_)));

  let err = h
    .roster
    .save_album(&student, draft(own_id, &["a.jpg"]))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Forbidden(_)));
}

#[tokio::test]
async fn enrolled_student_starts_with_temporary_password() {
  let h = harness().await;
  let admin = h.admin().await;

  let enrolled = h
    .roster
    .enroll_student(&admin, enrollment(Some("ana_q"), "0102030405", "E-1"))
    .await
    .unwrap();
  let session = h.identity.authenticate("ana_q", "0102030405").await.unwrap();
  assert!(session.password_change_required());
  assert_eq!(Some(session.account_id()), enrolled.account_id);
  assert_eq!(session.role().name, Role::STUDENT);
  assert_eq!(session.voter(), Some(enrolled.student_id));

  h.identity
    .change_password_first_login(&session, VOTER_PASSWORD)
    .await
    .unwrap();
  let session = h.identity.authenticate("ana_q", VOTER_PASSWORD).await.unwrap();
  assert!(!session.password_change_required());
}

#[tokio::test]
async fn enrollment_without_login_creates_no_account() {
  let h = harness().await;
  let admin = h.admin().await;

  let enrolled = h
    .roster
    .enroll_student(&admin, enrollment(None, "0102030405", "E-1"))
    .await
    .unwrap();
  assert!(enrolled.account_id.is_none());

  let person = h.store.find_person("0102030405").await.unwrap().unwrap();
  assert_eq!(person.person_id, enrolled.student_id);
  assert!(person.account_id.is_none());
}

#[tokio::test]
async fn duplicate_enrollment_id_leaves_nothing_behind() {
  let h = harness().await;
  let admin = h.admin().await;
  h.roster
    .enroll_student(&admin, enrollment(None, "0102030405", "E-1"))
    .await
    .unwrap();

  let err = h
    .roster
    .enroll_student(&admin, enrollment(Some("bea_r"), "0607080910", "E-1"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Duplicate(UniqueKey::EnrollmentId)));

  assert!(h.store.find_account("bea_r").await.unwrap().is_none());
  assert!(h.store.find_person("0607080910").await.unwrap().is_none());
}

#[tokio::test]
async fn invalid_enrollment_is_rejected_up_front() {
  let h = harness().await;
  let admin = h.admin().await;

  let err = h
    .roster
    .enroll_student(&admin, enrollment(None, "12345", "E-1"))
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Validation);

  let err = h
    .roster
    .enroll_student(&admin, enrollment(None, "0102030405", "  "))
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Validation);
}

// ─── Candidates ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn nominate_requires_an_enrolled_student() {
  let h = harness().await;
  let admin = h.admin().await;

  let err = h
    .roster
    .nominate(&admin, NewCandidate {
      student_id: PersonId(404),
      category:   Category::new("Reina"),
      photo_path: None,
      attributes: CandidateAttributes::default(),
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound(Entity::Student(PersonId(404)))));
}

#[tokio::test]
async fn nomination_keeps_attributes_and_rejects_repeats() {
  let h = harness().await;
  let admin = h.admin().await;
  let enrolled = h
    .roster
    .enroll_student(&admin, enrollment(None, "0102030405", "E-1"))
    .await
    .unwrap();

  let attributes = CandidateAttributes {
    interests: vec!["teatro".into()],
    talents:   vec!["canto".into(), "danza".into()],
    goals:     vec![],
  };
  let candidate = h
    .roster
    .nominate(&admin, NewCandidate {
      student_id: enrolled.student_id,
      category:   Category::new("Reina"),
      photo_path: Some("fotos/ana.jpg".into()),
      attributes: attributes.clone(),
    })
    .await
    .unwrap();
  assert!(candidate.active);
  assert_eq!(candidate.attributes, attributes);
  assert_eq!(candidate.student.enrollment_id, "E-1");

  let err = h
    .roster
    .nominate(&admin, NewCandidate {
      student_id: enrolled.student_id,
      category:   Category::new("Fotogenia"),
      photo_path: None,
      attributes: CandidateAttributes::default(),
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Duplicate(UniqueKey::Candidate)));
}

#[tokio::test]
async fn toggling_unknown_candidate_is_not_found() {
  let h = harness().await;
  let admin = h.admin().await;
  let err = h
    .roster
    .set_candidate_active(&admin, PersonId(404), false)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound(Entity::Candidate(_))));
}

// ─── Albums ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn album_is_saved_with_its_photos() {
  let h = harness().await;
  let admin = h.admin().await;
  let owner = h.candidate(&admin, "1111111111", "Reina").await;

  let id = h
    .roster
    .save_album(&admin, draft(owner, &["a.jpg", "b.jpg"]))
    .await
    .unwrap();

  let album = h.roster.album(id).await.unwrap();
  assert_eq!(album.owner_id, owner);
  let paths: Vec<_> = album.photos.iter().map(|p| p.path.as_str()).collect();
  assert_eq!(paths, ["a.jpg", "b.jpg"]);

  // Updating appends the new photos and rewrites the header.
  let mut update = draft(owner, &["c.jpg"]);
  update.album_id = Some(id);
  update.title = "Campaña 2".into();
  assert_eq!(h.roster.save_album(&admin, update).await.unwrap(), id);

  let album = h.roster.album(id).await.unwrap();
  assert_eq!(album.title, "Campaña 2");
  assert_eq!(album.photos.len(), 3);

  let owned = h.roster.albums_for(owner).await.unwrap();
  assert_eq!(owned.len(), 1);
}

#[tokio::test]
async fn album_errors() {
  let h = harness().await;
  let admin = h.admin().await;
  let owner = h.candidate(&admin, "1111111111", "Reina").await;

  let mut missing = draft(owner, &["a.jpg"]);
  missing.album_id = Some(AlbumId(404));
  let err = h.roster.save_album(&admin, missing).await.unwrap_err();
  assert!(matches!(err, Error::NotFound(Entity::Album(AlbumId(404)))));

  let err = h
    .roster
    .save_album(&admin, draft(PersonId(404), &["a.jpg"]))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound(Entity::Candidate(_))));

  let err = h
    .roster
    .save_album(&admin, draft(owner, &["a.jpg", " "]))
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Validation);
  assert!(h.roster.albums_for(owner).await.unwrap().is_empty());

  let err = h.roster.album(AlbumId(404)).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
}
