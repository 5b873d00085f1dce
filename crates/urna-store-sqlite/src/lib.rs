//! SQLite backend for the Urna voting store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Multi-row writes go through the
//! transactional coordinator in [`write`].

mod albums;
mod credentials;
mod encode;
mod ledger;
mod roster;
mod schema;
mod store;
mod write;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
