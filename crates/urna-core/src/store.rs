//! Storage traits.
//!
//! Implemented by storage backends (e.g. `urna-store-sqlite`). The services in
//! `urna-service` depend on these abstractions, not on any concrete backend.
//!
//! Stores perform no business validation: they trust their caller, return
//! `None` for absent lookups, and report unique-constraint violations through
//! [`StoreError::unique_violation`] rather than as generic failures.

use std::future::Future;

use crate::{
  album::{Album, AlbumDraft},
  error::UniqueKey,
  id::{AccountId, AlbumId, PersonId, RoleId},
  identity::{Account, NewAccount, NewPerson, Person, Role},
  roster::{Candidate, Enrollment, NewCandidate, NewEnrollment, Student},
  vote::{Category, NewVote, Vote},
};

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Error type of a storage backend.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// The unique key a write collided with, if that is why it failed.
  fn unique_violation(&self) -> Option<UniqueKey>;
}

/// Shared by every storage trait so a backend implementing several of them
/// exposes a single, unambiguous `Error` type.
pub trait Backend: Send + Sync {
  type Error: StoreError;
}

// ─── Credentials ─────────────────────────────────────────────────────────────

/// Accounts, people, and roles.
pub trait CredentialStore: Backend {
  // ── Roles ─────────────────────────────────────────────────────────────

  fn add_role(
    &self,
    name: String,
  ) -> impl Future<Output = Result<Role, Self::Error>> + Send + '_;

  fn get_role(
    &self,
    id: RoleId,
  ) -> impl Future<Output = Result<Option<Role>, Self::Error>> + Send + '_;

  fn find_role<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<Role>, Self::Error>> + Send + 'a;

  fn list_roles(
    &self,
  ) -> impl Future<Output = Result<Vec<Role>, Self::Error>> + Send + '_;

  // ── Accounts ──────────────────────────────────────────────────────────

  /// Insert an account and, if given, the person it owns, atomically.
  /// Neither row exists unless both were written.
  fn create_account(
    &self,
    account: NewAccount,
    person: Option<NewPerson>,
  ) -> impl Future<Output = Result<AccountId, Self::Error>> + Send + '_;

  /// Insert `account` only if no account holds its role yet. The check and
  /// the insert are one transaction; `None` means the role was taken.
  fn create_first_account(
    &self,
    account: NewAccount,
  ) -> impl Future<Output = Result<Option<AccountId>, Self::Error>> + Send + '_;

  fn get_account(
    &self,
    id: AccountId,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + '_;

  fn find_account<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + 'a;

  /// Overwrite the stored hash and the forced-change flag in one write.
  /// Returns `false` if the account does not exist.
  fn update_password_hash(
    &self,
    id: AccountId,
    password_hash: String,
    forced_change: bool,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Replace a temporary password: write the hash and clear the forced-change
  /// flag, but only if the flag is currently set. Returns `false` (and writes
  /// nothing) otherwise.
  fn replace_temporary_password(
    &self,
    id: AccountId,
    password_hash: String,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Returns `false` if the account does not exist.
  fn set_forced_change(
    &self,
    id: AccountId,
    forced_change: bool,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Returns `false` if the account does not exist.
  fn set_account_active(
    &self,
    id: AccountId,
    active: bool,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── People ────────────────────────────────────────────────────────────

  fn person_for_account(
    &self,
    id: AccountId,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  fn find_person<'a>(
    &'a self,
    national_id: &'a str,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + 'a;
}

// ─── Roster ──────────────────────────────────────────────────────────────────

/// Students and candidates.
pub trait RosterStore: Backend {
  /// Write the optional account, the person, and the academic record as one
  /// unit.
  fn enroll_student(
    &self,
    enrollment: NewEnrollment,
  ) -> impl Future<Output = Result<Enrollment, Self::Error>> + Send + '_;

  fn get_student(
    &self,
    id: PersonId,
  ) -> impl Future<Output = Result<Option<Student>, Self::Error>> + Send + '_;

  /// Nominate an existing student. Candidates start active.
  fn nominate(
    &self,
    candidate: NewCandidate,
  ) -> impl Future<Output = Result<Candidate, Self::Error>> + Send + '_;

  fn get_candidate(
    &self,
    id: PersonId,
  ) -> impl Future<Output = Result<Option<Candidate>, Self::Error>> + Send + '_;

  /// List candidates, optionally restricted to one category.
  fn list_candidates(
    &self,
    category: Option<Category>,
  ) -> impl Future<Output = Result<Vec<Candidate>, Self::Error>> + Send + '_;

  /// Returns `false` if the candidate does not exist.
  fn set_candidate_active(
    &self,
    id: PersonId,
    active: bool,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

// ─── Votes ───────────────────────────────────────────────────────────────────

/// The append-only store of cast votes.
///
/// Implementations must enforce uniqueness of (voter, category) themselves;
/// [`VoteLedger::has_voted`] is advisory and offers no protection against a
/// concurrent insert.
pub trait VoteLedger: Backend {
  fn has_voted<'a>(
    &'a self,
    voter: PersonId,
    category: &'a Category,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Append a vote. A second vote for the same (voter, category) fails with
  /// [`UniqueKey::VotePerCategory`].
  fn record_vote(
    &self,
    vote: NewVote,
  ) -> impl Future<Output = Result<Vote, Self::Error>> + Send + '_;

  fn votes_by_voter(
    &self,
    voter: PersonId,
  ) -> impl Future<Output = Result<Vec<Vote>, Self::Error>> + Send + '_;
}

// ─── Albums ──────────────────────────────────────────────────────────────────

pub trait AlbumStore: Backend {
  /// Insert or update the album and append its photos in one transaction.
  /// Returns `None` if `draft.album_id` names an album that does not exist.
  fn save_album(
    &self,
    draft: AlbumDraft,
  ) -> impl Future<Output = Result<Option<AlbumId>, Self::Error>> + Send + '_;

  /// The album with all of its photos.
  fn get_album(
    &self,
    id: AlbumId,
  ) -> impl Future<Output = Result<Option<Album>, Self::Error>> + Send + '_;

  fn albums_for(
    &self,
    owner: PersonId,
  ) -> impl Future<Output = Result<Vec<Album>, Self::Error>> + Send + '_;
}
