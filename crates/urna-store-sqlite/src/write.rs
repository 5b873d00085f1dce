//! The transactional write coordinator.
//!
//! Every write spanning more than one row (account + person, enrollment,
//! album + photos) runs through [`atomically`]. The parent row is inserted
//! first with [`insert_parent`] so its generated key can be used by the child
//! rows; if any step fails the whole transaction is rolled back and storage is
//! left exactly as it was.

use rusqlite::{Connection, Params, Transaction, TransactionBehavior};

/// Run `work` inside one transaction, committing only if it returns `Ok`.
///
/// The transaction takes the write lock up front (`BEGIN IMMEDIATE`) so two
/// writers never deadlock upgrading from a read lock.
pub fn atomically<R>(
  conn: &mut Connection,
  work: impl FnOnce(&Transaction<'_>) -> rusqlite::Result<R>,
) -> rusqlite::Result<R> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

  match work(&tx) {
    Ok(out) => {
      tx.commit()?;
      Ok(out)
    }
    Err(err) => {
      tracing::warn!(error = %err, "write failed; rolling back");
      if let Err(rollback_err) = tx.rollback() {
        tracing::error!(error = %rollback_err, "rollback failed");
      }
      Err(err)
    }
  }
}

/// Insert a parent row and return its generated key.
///
/// The key refers to an uncommitted row: use it only to build child rows
/// within the same transaction.
pub fn insert_parent(
  tx: &Transaction<'_>,
  sql: &str,
  params: impl Params,
) -> rusqlite::Result<i64> {
  tx.execute(sql, params)?;
  Ok(tx.last_insert_rowid())
}
