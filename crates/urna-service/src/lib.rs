//! Identity and voting services for Urna.
//!
//! The services hold a storage backend implementing the `urna-core` traits and
//! expose one async method per operation. Each call is an independent unit of
//! work: no mutable state is shared in memory between calls, and concurrency
//! control is left entirely to the store's transactions and constraints.

pub mod identity;
pub mod limits;
pub mod password;
pub mod roster;
pub mod session;
pub mod voting;

pub use identity::{IdentityService, Registration};
pub use limits::Limits;
pub use password::{HashingConfig, PasswordHasher};
pub use roster::{RosterService, StudentEnrollment};
pub use session::Session;
pub use voting::VotingService;

#[cfg(test)]
mod tests;
