//! Integer identifiers assigned by the store.
//!
//! Students and candidates share the primary key of the [`Person`] they
//! extend, so both are addressed with a [`PersonId`].
//!
//! [`Person`]: crate::identity::Person

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! row_id {
  ($(#[$meta:meta])* $name:ident) => {
    $(#[$meta])*
    #[derive(
      Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
      Deserialize,
    )]
    #[serde(transparent)]
    pub struct $name(pub i64);

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
      }
    }
  };
}

row_id!(
  /// Primary key of an `accounts` row.
  AccountId
);
row_id!(
  /// Primary key of a `people` row; also the key of the student and
  /// candidate rows layered on top of it.
  PersonId
);
row_id!(RoleId);
row_id!(VoteId);
row_id!(AlbumId);
row_id!(PhotoId);
