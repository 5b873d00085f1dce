//! Voting Service: eligibility rules and vote creation.

use urna_core::{
  Entity, Error, PersonId, Result, UniqueKey, ValidationError,
  roster::Candidate,
  store::{RosterStore, StoreError, VoteLedger},
  vote::{Category, NewVote, Vote},
};

use crate::{limits::Limits, session::Session};

/// Casts votes against a [`VoteLedger`], looking candidates up in a
/// [`RosterStore`].
pub struct VotingService<L, R> {
  ledger: L,
  roster: R,
  limits: Limits,
}

impl<L: VoteLedger, R: RosterStore> VotingService<L, R> {
  pub fn new(ledger: L, roster: R, limits: Limits) -> Self {
    Self { ledger, roster, limits }
  }

  /// Cast the session's vote for `candidate_id` in `category`. Sessions still
  /// holding a temporary password are refused.
  ///
  /// The `has_voted` pre-check only gives early feedback: two concurrent calls
  /// can both pass it. The ledger's uniqueness constraint decides, and a
  /// collision there is reported as [`Error::AlreadyVoted`] just like a failed
  /// pre-check.
  pub async fn cast_vote(
    &self,
    session: &Session,
    candidate_id: PersonId,
    category: Category,
  ) -> Result<Vote> {
    session.require_settled()?;
    let voter = session.voter().ok_or(ValidationError::MissingVoter)?;
    self.limits.check_category(&category)?;

    let candidate = self
      .roster
      .get_candidate(candidate_id)
      .await
      .map_err(Error::from_store)?
      .ok_or(Error::NotFound(Entity::Candidate(candidate_id)))?;
    if !candidate.active {
      tracing::debug!(%voter, %candidate_id, "vote refused: candidate inactive");
      return Err(Error::InactiveCandidate(candidate_id));
    }

    let already = self
      .ledger
      .has_voted(voter, &category)
      .await
      .map_err(Error::from_store)?;
    if already {
      tracing::debug!(%voter, %category, "vote refused: already voted");
      return Err(Error::AlreadyVoted(category));
    }

    let vote = self
      .ledger
      .record_vote(NewVote { voter_id: voter, candidate_id, category: category.clone() })
      .await
      .map_err(|err| match err.unique_violation() {
        Some(UniqueKey::VotePerCategory) => {
          tracing::debug!(%voter, %category, "vote refused by ledger constraint");
          Error::AlreadyVoted(category.clone())
        }
        _ => Error::from_store(err),
      })?;

    tracing::info!(vote_id = %vote.vote_id, %voter, %candidate_id, %category, "vote cast");
    Ok(vote)
  }

  /// Active candidates a voter may choose from in `category`.
  pub async fn ballot(&self, category: Category) -> Result<Vec<Candidate>> {
    self.limits.check_category(&category)?;
    let mut candidates = self
      .roster
      .list_candidates(Some(category))
      .await
      .map_err(Error::from_store)?;
    candidates.retain(|c| c.active);
    Ok(candidates)
  }

  /// Votes cast by the session's voter, oldest first.
  pub async fn history(&self, session: &Session) -> Result<Vec<Vote>> {
    let voter = session.voter().ok_or(ValidationError::MissingVoter)?;
    self
      .ledger
      .votes_by_voter(voter)
      .await
      .map_err(Error::from_store)
  }
}
