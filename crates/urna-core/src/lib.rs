//! Core types and trait definitions for the Urna campus voting system.
//!
//! This crate is deliberately free of database dependencies. Storage backends
//! implement the traits in [`store`]; the services in `urna-service` consume
//! them.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod album;
pub mod error;
pub mod id;
pub mod identity;
pub mod roster;
pub mod store;
pub mod vote;

pub use error::{Entity, Error, ErrorKind, Result, UniqueKey, ValidationError};
pub use id::{AccountId, AlbumId, PersonId, PhotoId, RoleId, VoteId};
