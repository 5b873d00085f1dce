//! Roster Service: administrator actions on students, candidates, and albums.
//!
//! Every operation requires an admin [`Session`].

use urna_core::{
  AlbumId, Entity, Error, PersonId, Result, ValidationError,
  album::{Album, AlbumDraft},
  identity::{NewAccount, NewPerson, Role},
  roster::{Candidate, Enrollment, NewCandidate, NewEnrollment, NewStudent},
  store::{AlbumStore, CredentialStore, RosterStore},
};

use crate::{limits::Limits, password::PasswordHasher, session::Session};

/// Input to [`RosterService::enroll_student`].
#[derive(Debug, Clone)]
pub struct StudentEnrollment {
  /// When set, a student login is created alongside the record. Its temporary
  /// password is the student's national id and must be replaced at first
  /// login.
  pub username: Option<String>,
  pub person:   NewPerson,
  pub student:  NewStudent,
}

pub struct RosterService<S> {
  store:  S,
  hasher: PasswordHasher,
  limits: Limits,
}

impl<S> RosterService<S>
where
  S: RosterStore + AlbumStore + CredentialStore,
{
  pub fn new(store: S, hasher: PasswordHasher, limits: Limits) -> Self {
    Self { store, hasher, limits }
  }

  /// Write the optional account, the person, and the academic record as one
  /// unit.
  pub async fn enroll_student(
    &self,
    session: &Session,
    enrollment: StudentEnrollment,
  ) -> Result<Enrollment> {
    session.require_admin()?;

    let StudentEnrollment { username, person, student } = enrollment;
    let username = username.map(|u| u.trim().to_owned());
    self.limits.check_person(&person)?;
    self.limits.check_text("program", &student.program)?;
    self.limits.check_text("enrollment id", &student.enrollment_id)?;
    if let Some(username) = &username {
      self.limits.check_username(username)?;
      self
        .limits
        .check_password("temporary password", &person.national_id, true)?;
    }

    let account = match username {
      Some(username) => {
        let role = self
          .store
          .find_role(Role::STUDENT)
          .await
          .map_err(Error::from_store)?
          .ok_or_else(|| Error::NotFound(Entity::RoleName(Role::STUDENT.into())))?;
        let password_hash = self
          .hasher
          .hash(&person.national_id)
          .map_err(|e| Error::Persistence(Box::new(e)))?;
        Some(NewAccount {
          username,
          password_hash,
          role_id: role.role_id,
          active: true,
          forced_change: true,
        })
      }
      None => None,
    };

    let enrolled = self
      .store
      .enroll_student(NewEnrollment { account, person, student })
      .await
      .map_err(Error::from_store)?;

    tracing::info!(
      student_id = %enrolled.student_id,
      with_account = enrolled.account_id.is_some(),
      "student enrolled"
    );
    Ok(enrolled)
  }

  pub async fn nominate(&self, session: &Session, candidate: NewCandidate) -> Result<Candidate> {
    session.require_admin()?;
    self.limits.check_category(&candidate.category)?;

    let student_id = candidate.student_id;
    if self
      .store
      .get_student(student_id)
      .await
      .map_err(Error::from_store)?
      .is_none()
    {
      return Err(Error::NotFound(Entity::Student(student_id)));
    }

    let nominated = self
      .store
      .nominate(candidate)
      .await
      .map_err(Error::from_store)?;

    tracing::info!(%student_id, category = %nominated.category, "candidate nominated");
    Ok(nominated)
  }

  /// Open or close a candidate to new votes. Existing votes are untouched.
  pub async fn set_candidate_active(
    &self,
    session: &Session,
    candidate_id: PersonId,
    active: bool,
  ) -> Result<()> {
    session.require_admin()?;
    let updated = self
      .store
      .set_candidate_active(candidate_id, active)
      .await
      .map_err(Error::from_store)?;
    if !updated {
      return Err(Error::NotFound(Entity::Candidate(candidate_id)));
    }

    tracing::info!(%candidate_id, active, "candidate activation changed");
    Ok(())
  }

  /// Save an album and its new photos atomically.
  pub async fn save_album(&self, session: &Session, draft: AlbumDraft) -> Result<AlbumId> {
    session.require_admin()?;
    self.limits.check_text("title", &draft.title)?;
    if draft.photos.iter().any(|p| p.path.trim().is_empty()) {
      return Err(ValidationError::Empty { field: "photo path" }.into());
    }

    let owner = draft.owner_id;
    if self
      .store
      .get_candidate(owner)
      .await
      .map_err(Error::from_store)?
      .is_none()
    {
      return Err(Error::NotFound(Entity::Candidate(owner)));
    }

    let requested = draft.album_id;
    let photos = draft.photos.len();
    let saved = self
      .store
      .save_album(draft)
      .await
      .map_err(Error::from_store)?;

    match (saved, requested) {
      (Some(id), _) => {
        tracing::info!(album_id = %id, photos, "album saved");
        Ok(id)
      }
      (None, Some(missing)) => Err(Error::NotFound(Entity::Album(missing))),
      // Without an explicit id the store always creates the album.
      (None, None) => Err(Error::Persistence("album insert returned no id".into())),
    }
  }

  pub async fn album(&self, id: AlbumId) -> Result<Album> {
    self
      .store
      .get_album(id)
      .await
      .map_err(Error::from_store)?
      .ok_or(Error::NotFound(Entity::Album(id)))
  }

  pub async fn albums_for(&self, owner: PersonId) -> Result<Vec<Album>> {
    self.store.albums_for(owner).await.map_err(Error::from_store)
  }
}
