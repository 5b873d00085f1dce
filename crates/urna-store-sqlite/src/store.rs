//! [`SqliteStore`]: the SQLite implementation of the `urna-core` store traits.
//!
//! The trait impls are split by concern across `credentials`, `roster`,
//! `ledger`, and `albums`.

use std::path::Path;

use rusqlite::Transaction;
use urna_core::store::Backend;

use crate::{Error, Result, schema::SCHEMA, write};

/// A voting store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `work` as one all-or-nothing transaction on the database thread.
  pub(crate) async fn atomically<R, F>(&self, work: F) -> Result<R>
  where
    R: Send + 'static,
    F: FnOnce(&Transaction<'_>) -> rusqlite::Result<R> + Send + 'static,
  {
    let out = self
      .conn
      .call(move |conn| Ok(write::atomically(conn, work)?))
      .await?;
    Ok(out)
  }
}

impl Backend for SqliteStore {
  type Error = Error;
}
