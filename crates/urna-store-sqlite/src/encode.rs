//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, candidate attribute lists as
//! compact JSON. Rows are first read into `Raw*` structs inside the database
//! thread and decoded afterwards.

use chrono::{DateTime, Utc};
use urna_core::{
  AccountId, AlbumId, PersonId, PhotoId, RoleId, VoteId,
  album::{Album, Photo},
  identity::{Account, Person, Role},
  roster::{Candidate, CandidateAttributes, Student},
  vote::{Category, Vote},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── CandidateAttributes ─────────────────────────────────────────────────────

pub fn encode_attributes(attrs: &CandidateAttributes) -> Result<String> {
  Ok(serde_json::to_string(attrs)?)
}

pub fn decode_attributes(s: &str) -> Result<CandidateAttributes> {
  Ok(serde_json::from_str(s)?)
}

// ─── Column lists ────────────────────────────────────────────────────────────

pub const ACCOUNT_COLUMNS: &str =
  "id, username, password_hash, role_id, active, forced_change, created_at";

pub const PERSON_COLUMNS: &str =
  "id, national_id, name, surname, age, account_id";

/// Candidate projection; expects `candidates c`, `students s`, `people p`.
pub const CANDIDATE_SELECT: &str = "
  SELECT p.id, p.national_id, p.name, p.surname, p.age, p.account_id,
         s.program, s.enrollment_id,
         c.active, c.photo_path, c.category, c.attributes
  FROM candidates c
  JOIN students s ON s.id = c.id
  JOIN people   p ON p.id = c.id";

pub const VOTE_COLUMNS: &str = "id, voter_id, candidate_id, category, cast_at";

// ─── Row readers ─────────────────────────────────────────────────────────────

pub fn read_role(row: &rusqlite::Row<'_>) -> rusqlite::Result<Role> {
  Ok(Role { role_id: RoleId(row.get(0)?), name: row.get(1)? })
}

/// Read a person from `PERSON_COLUMNS` starting at column `at`.
pub fn read_person(
  row: &rusqlite::Row<'_>,
  at: usize,
) -> rusqlite::Result<Person> {
  Ok(Person {
    person_id:   PersonId(row.get(at)?),
    national_id: row.get(at + 1)?,
    name:        row.get(at + 2)?,
    surname:     row.get(at + 3)?,
    age:         row.get(at + 4)?,
    account_id:  row.get::<_, Option<i64>>(at + 5)?.map(AccountId),
  })
}

pub fn read_student(row: &rusqlite::Row<'_>) -> rusqlite::Result<Student> {
  Ok(Student {
    person:        read_person(row, 0)?,
    program:       row.get(6)?,
    enrollment_id: row.get(7)?,
  })
}

pub fn read_photo(row: &rusqlite::Row<'_>) -> rusqlite::Result<Photo> {
  Ok(Photo {
    photo_id:    PhotoId(row.get(0)?),
    path:        row.get(1)?,
    description: row.get(2)?,
    album_id:    AlbumId(row.get(3)?),
  })
}

// ─── Raw row types ───────────────────────────────────────────────────────────

/// An `accounts` row with its timestamp still encoded.
pub struct RawAccount {
  pub id:            i64,
  pub username:      String,
  pub password_hash: String,
  pub role_id:       i64,
  pub active:        bool,
  pub forced_change: bool,
  pub created_at:    String,
}

impl RawAccount {
  pub fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      username:      row.get(1)?,
      password_hash: row.get(2)?,
      role_id:       row.get(3)?,
      active:        row.get(4)?,
      forced_change: row.get(5)?,
      created_at:    row.get(6)?,
    })
  }

  pub fn into_account(self) -> Result<Account> {
    Ok(Account {
      account_id:    AccountId(self.id),
      username:      self.username,
      password_hash: self.password_hash,
      role_id:       RoleId(self.role_id),
      active:        self.active,
      forced_change: self.forced_change,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// A row of [`CANDIDATE_SELECT`] with its JSON column still encoded.
pub struct RawCandidate {
  pub student:    Student,
  pub active:     bool,
  pub photo_path: Option<String>,
  pub category:   String,
  pub attributes: String,
}

impl RawCandidate {
  pub fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      student:    read_student(row)?,
      active:     row.get(8)?,
      photo_path: row.get(9)?,
      category:   row.get(10)?,
      attributes: row.get(11)?,
    })
  }

  pub fn into_candidate(self) -> Result<Candidate> {
    Ok(Candidate {
      student:    self.student,
      active:     self.active,
      photo_path: self.photo_path,
      category:   Category::new(&self.category),
      attributes: decode_attributes(&self.attributes)?,
    })
  }
}

/// A `votes` row with its timestamp still encoded.
pub struct RawVote {
  pub id:           i64,
  pub voter_id:     i64,
  pub candidate_id: i64,
  pub category:     String,
  pub cast_at:      String,
}

impl RawVote {
  pub fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get(0)?,
      voter_id:     row.get(1)?,
      candidate_id: row.get(2)?,
      category:     row.get(3)?,
      cast_at:      row.get(4)?,
    })
  }

  pub fn into_vote(self) -> Result<Vote> {
    Ok(Vote {
      vote_id:      VoteId(self.id),
      voter_id:     PersonId(self.voter_id),
      candidate_id: PersonId(self.candidate_id),
      category:     Category::new(&self.category),
      cast_at:      decode_dt(&self.cast_at)?,
    })
  }
}

/// An `albums` row plus its photos; needs no decoding beyond the row readers.
pub struct RawAlbum {
  pub id:          i64,
  pub title:       String,
  pub description: Option<String>,
  pub owner_id:    i64,
}

impl RawAlbum {
  pub fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      title:       row.get(1)?,
      description: row.get(2)?,
      owner_id:    row.get(3)?,
    })
  }

  pub fn with_photos(self, photos: Vec<Photo>) -> Album {
    Album {
      album_id:    AlbumId(self.id),
      title:       self.title,
      description: self.description,
      owner_id:    PersonId(self.owner_id),
      photos,
    }
  }
}
