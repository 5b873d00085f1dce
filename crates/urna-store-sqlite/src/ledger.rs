//! [`VoteLedger`] for [`SqliteStore`].
//!
//! The `UNIQUE (voter_id, category)` constraint on `votes` is what actually
//! guarantees one vote per voter and category; [`VoteLedger::has_voted`] is a
//! plain read and may be stale by the time the insert runs.

use chrono::Utc;
use urna_core::{
  PersonId, VoteId,
  store::VoteLedger,
  vote::{Category, NewVote, Vote},
};

use crate::{
  Result, SqliteStore,
  encode::{RawVote, VOTE_COLUMNS, encode_dt},
};

impl VoteLedger for SqliteStore {
  async fn has_voted(&self, voter: PersonId, category: &Category) -> Result<bool> {
    let category = category.as_str().to_owned();
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM votes WHERE voter_id = ?1 AND category = ?2)",
            rusqlite::params![voter.0, category],
            |row| row.get::<_, bool>(0),
          )?)
        })
        .await?,
    )
  }

  async fn record_vote(&self, vote: NewVote) -> Result<Vote> {
    let cast_at      = Utc::now();
    let cast_at_str  = encode_dt(cast_at);
    let category_str = vote.category.as_str().to_owned();
    let voter_id     = vote.voter_id.0;
    let candidate_id = vote.candidate_id.0;

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO votes (voter_id, candidate_id, category, cast_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![voter_id, candidate_id, category_str, cast_at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Vote {
      vote_id:      VoteId(id),
      voter_id:     vote.voter_id,
      candidate_id: vote.candidate_id,
      category:     vote.category,
      cast_at,
    })
  }

  async fn votes_by_voter(&self, voter: PersonId) -> Result<Vec<Vote>> {
    let raws: Vec<RawVote> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {VOTE_COLUMNS} FROM votes WHERE voter_id = ?1 ORDER BY cast_at, id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![voter.0], RawVote::read)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawVote::into_vote).collect()
  }
}
