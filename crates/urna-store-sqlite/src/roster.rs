//! [`RosterStore`] for [`SqliteStore`]: students and candidates.

use rusqlite::OptionalExtension as _;
use urna_core::{
  AccountId, PersonId,
  roster::{Candidate, Enrollment, NewCandidate, NewEnrollment, Student},
  store::RosterStore,
  vote::Category,
};

use crate::{
  Result, SqliteStore,
  credentials::{insert_account, insert_person},
  encode::{CANDIDATE_SELECT, RawCandidate, encode_attributes, read_student},
};

impl RosterStore for SqliteStore {
  async fn enroll_student(&self, enrollment: NewEnrollment) -> Result<Enrollment> {
    let (student_id, account_id) = self
      .atomically(move |tx| {
        let account_id = enrollment
          .account
          .as_ref()
          .map(|account| insert_account(tx, account))
          .transpose()?;
        let person_id = insert_person(tx, &enrollment.person, account_id)?;
        tx.execute(
          "INSERT INTO students (id, program, enrollment_id) VALUES (?1, ?2, ?3)",
          rusqlite::params![
            person_id,
            enrollment.student.program,
            enrollment.student.enrollment_id,
          ],
        )?;
        Ok((person_id, account_id))
      })
      .await?;

    Ok(Enrollment {
      student_id: PersonId(student_id),
      account_id: account_id.map(AccountId),
    })
  }

  async fn get_student(&self, id: PersonId) -> Result<Option<Student>> {
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(
            conn
              .query_row(
                "SELECT p.id, p.national_id, p.name, p.surname, p.age, p.account_id,
                        s.program, s.enrollment_id
                 FROM students s
                 JOIN people p ON p.id = s.id
                 WHERE s.id = ?1",
                rusqlite::params![id.0],
                read_student,
              )
              .optional()?,
          )
        })
        .await?,
    )
  }

  async fn nominate(&self, candidate: NewCandidate) -> Result<Candidate> {
    let attributes = encode_attributes(&candidate.attributes)?;
    let id = candidate.student_id.0;

    let raw = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO candidates (id, active, photo_path, category, attributes)
           VALUES (?1, 1, ?2, ?3, ?4)",
          rusqlite::params![
            id,
            candidate.photo_path,
            candidate.category.as_str(),
            attributes,
          ],
        )?;
        Ok(conn.query_row(
          &format!("{CANDIDATE_SELECT} WHERE c.id = ?1"),
          rusqlite::params![id],
          RawCandidate::read,
        )?)
      })
      .await?;

    raw.into_candidate()
  }

  async fn get_candidate(&self, id: PersonId) -> Result<Option<Candidate>> {
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("{CANDIDATE_SELECT} WHERE c.id = ?1"),
              rusqlite::params![id.0],
              RawCandidate::read,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCandidate::into_candidate).transpose()
  }

  async fn list_candidates(&self, category: Option<Category>) -> Result<Vec<Candidate>> {
    let raws: Vec<RawCandidate> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(category) = category {
          let mut stmt =
            conn.prepare(&format!("{CANDIDATE_SELECT} WHERE c.category = ?1 ORDER BY c.id"))?;
          stmt
            .query_map(rusqlite::params![category.as_str()], RawCandidate::read)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(&format!("{CANDIDATE_SELECT} ORDER BY c.id"))?;
          stmt
            .query_map([], RawCandidate::read)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCandidate::into_candidate).collect()
  }

  async fn set_candidate_active(&self, id: PersonId, active: bool) -> Result<bool> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE candidates SET active = ?2 WHERE id = ?1",
          rusqlite::params![id.0, active],
        )?)
      })
      .await?;
    Ok(changed == 1)
  }
}
