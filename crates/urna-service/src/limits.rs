//! Input bounds checked before any storage access.

use serde::Deserialize;
use urna_core::{ValidationError, identity::NewPerson, vote::Category};

/// Configurable validation limits. Lengths count characters, not bytes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Limits {
  pub username_min:    usize,
  pub username_max:    usize,
  pub password_min:    usize,
  pub password_max:    usize,
  /// National identifiers are exactly this many ASCII digits.
  pub national_id_len: usize,
  /// Upper bound for names, surnames, programs, and titles.
  pub text_max:        usize,
  pub age_min:         u8,
  pub age_max:         u8,
  pub category_max:    usize,
}

impl Default for Limits {
  fn default() -> Self {
    Self {
      username_min:    4,
      username_max:    32,
      password_min:    8,
      password_max:    64,
      national_id_len: 10,
      text_max:        60,
      age_min:         16,
      age_max:         99,
      category_max:    40,
    }
  }
}

fn check_length(
  field: &'static str,
  value: &str,
  min: usize,
  max: usize,
) -> Result<(), ValidationError> {
  if value.trim().is_empty() {
    return Err(ValidationError::Empty { field });
  }
  let len = value.chars().count();
  if len < min || len > max {
    return Err(ValidationError::Length { field, min, max });
  }
  Ok(())
}

impl Limits {
  pub fn check_username(&self, username: &str) -> Result<(), ValidationError> {
    check_length("username", username, self.username_min, self.username_max)
  }

  /// A temporary password (one that must be replaced at first login) skips
  /// the minimum-length rule; the maximum still applies.
  pub fn check_password(
    &self,
    field: &'static str,
    password: &str,
    temporary: bool,
  ) -> Result<(), ValidationError> {
    let min = if temporary { 1 } else { self.password_min };
    if password.is_empty() {
      return Err(ValidationError::Empty { field });
    }
    let len = password.chars().count();
    if len < min || len > self.password_max {
      return Err(ValidationError::Length { field, min, max: self.password_max });
    }
    Ok(())
  }

  pub fn check_text(&self, field: &'static str, value: &str) -> Result<(), ValidationError> {
    check_length(field, value, 1, self.text_max)
  }

  pub fn check_person(&self, person: &NewPerson) -> Result<(), ValidationError> {
    let id = &person.national_id;
    if id.len() != self.national_id_len || !id.bytes().all(|b| b.is_ascii_digit()) {
      return Err(ValidationError::NationalId(self.national_id_len));
    }
    self.check_text("name", &person.name)?;
    self.check_text("surname", &person.surname)?;
    if person.age < self.age_min || person.age > self.age_max {
      return Err(ValidationError::Age { min: self.age_min, max: self.age_max });
    }
    Ok(())
  }

  pub fn check_category(&self, category: &Category) -> Result<(), ValidationError> {
    check_length("category", category.as_str(), 1, self.category_max)
  }
}
