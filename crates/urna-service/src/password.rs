//! Password hashing.
//!
//! New hashes are Argon2id PHC strings with a random salt. Hashing with a
//! given salt is deterministic, so [`PasswordHasher::verify`] is the only
//! comparison primitive callers need.
//!
//! Accounts migrated from the previous system may still hold an unsalted
//! SHA-256 hex digest. Those are accepted by `verify` and reported as
//! [`Verification::LegacyMatch`] so the caller can rehash them.

use argon2::{
  Algorithm, Argon2, Params, PasswordHash, PasswordHasher as _, PasswordVerifier,
  Version, password_hash::SaltString,
};
use rand_core::OsRng;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HashError {
  #[error("invalid argon2 parameters: {0}")]
  Params(String),
  #[error("password hashing failed: {0}")]
  Hash(String),
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HashingConfig {
  pub memory_kib:  u32,
  pub iterations:  u32,
  pub parallelism: u32,
}

impl Default for HashingConfig {
  fn default() -> Self {
    Self {
      memory_kib:  Params::DEFAULT_M_COST,
      iterations:  Params::DEFAULT_T_COST,
      parallelism: Params::DEFAULT_P_COST,
    }
  }
}

/// Outcome of checking a password against a stored hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
  Match,
  /// Matched an unsalted legacy digest; the hash should be upgraded.
  LegacyMatch,
  Mismatch,
}

impl Verification {
  pub fn matched(self) -> bool { !matches!(self, Self::Mismatch) }
}

#[derive(Clone)]
pub struct PasswordHasher {
  argon2: Argon2<'static>,
  /// Verified against when an account does not exist, so that an unknown
  /// username costs the same as a wrong password.
  dummy:  String,
}

impl PasswordHasher {
  pub fn new(config: &HashingConfig) -> Result<Self, HashError> {
    let params = Params::new(config.memory_kib, config.iterations, config.parallelism, None)
      .map_err(|e| HashError::Params(e.to_string()))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut hasher = Self { argon2, dummy: String::new() };
    hasher.dummy = hasher.hash("urna:no-such-account")?;
    Ok(hasher)
  }

  /// Hash `password` with a fresh random salt.
  pub fn hash(&self, password: &str) -> Result<String, HashError> {
    let salt = SaltString::generate(&mut OsRng);
    self.hash_with_salt(password, &salt)
  }

  /// Deterministic: the same password and salt always give the same string.
  pub fn hash_with_salt(&self, password: &str, salt: &SaltString) -> Result<String, HashError> {
    Ok(
      self
        .argon2
        .hash_password(password.as_bytes(), salt)
        .map_err(|e| HashError::Hash(e.to_string()))?
        .to_string(),
    )
  }

  pub fn verify(&self, password: &str, stored: &str) -> Verification {
    if is_legacy_digest(stored) {
      return if legacy_digest(password).eq_ignore_ascii_case(stored) {
        Verification::LegacyMatch
      } else {
        Verification::Mismatch
      };
    }

    let Ok(parsed) = PasswordHash::new(stored) else {
      return Verification::Mismatch;
    };
    match self.argon2.verify_password(password.as_bytes(), &parsed) {
      Ok(()) => Verification::Match,
      Err(_) => Verification::Mismatch,
    }
  }

  /// Burn the same work as a real verification and discard the result.
  pub fn verify_dummy(&self, password: &str) {
    let _ = self.verify(password, &self.dummy);
  }
}

/// The unsalted hex SHA-256 digest used by the previous system.
pub fn legacy_digest(password: &str) -> String {
  hex::encode(Sha256::digest(password.as_bytes()))
}

fn is_legacy_digest(stored: &str) -> bool {
  stored.len() == 64 && stored.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
pub(crate) fn fast_hasher() -> PasswordHasher {
  PasswordHasher::new(&HashingConfig { memory_kib: 1024, iterations: 1, parallelism: 1 })
    .unwrap()
}
