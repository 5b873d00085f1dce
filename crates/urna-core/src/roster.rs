//! Students and candidates.
//!
//! Both are compositions over [`Person`]: a [`Student`] holds the person it
//! extends, and a [`Candidate`] holds the student. All three share one key.

use serde::{Deserialize, Serialize};

use crate::{
  id::{AccountId, PersonId},
  identity::{NewAccount, NewPerson, Person},
  vote::Category,
};

// ─── Student ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
  pub person:        Person,
  pub program:       String,
  /// Institution-assigned enrollment number; unique.
  pub enrollment_id: String,
}

impl Student {
  pub fn student_id(&self) -> PersonId { self.person.person_id }
}

/// Academic record written alongside a new person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStudent {
  pub program:       String,
  pub enrollment_id: String,
}

/// Everything written by one enrollment: an optional login account, the
/// person it owns, and the academic record.
#[derive(Debug, Clone)]
pub struct NewEnrollment {
  pub account: Option<NewAccount>,
  pub person:  NewPerson,
  pub student: NewStudent,
}

/// Keys produced by a committed enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Enrollment {
  pub student_id: PersonId,
  pub account_id: Option<AccountId>,
}

// ─── Candidate ───────────────────────────────────────────────────────────────

/// Free-text lists shown on a candidate's profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateAttributes {
  #[serde(default)]
  pub interests: Vec<String>,
  #[serde(default)]
  pub talents:   Vec<String>,
  #[serde(default)]
  pub goals:     Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
  pub student:    Student,
  /// Inactive candidates never receive new votes. Toggled by administrators.
  pub active:     bool,
  /// Path of the profile image relative to the media directory.
  pub photo_path: Option<String>,
  pub category:   Category,
  pub attributes: CandidateAttributes,
}

impl Candidate {
  pub fn candidate_id(&self) -> PersonId { self.student.student_id() }
}

/// Input to [`crate::store::RosterStore::nominate`].
#[derive(Debug, Clone)]
pub struct NewCandidate {
  pub student_id: PersonId,
  pub category:   Category,
  pub photo_path: Option<String>,
  pub attributes: CandidateAttributes,
}
