//! [`CredentialStore`] for [`SqliteStore`]: accounts, people, and roles.

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension as _};
use urna_core::{
  AccountId, RoleId,
  identity::{Account, NewAccount, NewPerson, Person, Role},
  store::CredentialStore,
};

use crate::{
  Result, SqliteStore,
  encode::{ACCOUNT_COLUMNS, PERSON_COLUMNS, RawAccount, encode_dt, read_person, read_role},
  write::insert_parent,
};

// ─── Row writers shared with enrollment ──────────────────────────────────────

/// Insert an `accounts` row and return its key.
pub(crate) fn insert_account(
  tx: &rusqlite::Transaction<'_>,
  account: &NewAccount,
) -> rusqlite::Result<i64> {
  insert_parent(
    tx,
    "INSERT INTO accounts (
       username, password_hash, role_id, active, forced_change, created_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    rusqlite::params![
      account.username,
      account.password_hash,
      account.role_id.0,
      account.active,
      account.forced_change,
      encode_dt(Utc::now()),
    ],
  )
}

/// Insert a `people` row owned by `account_id` (if any) and return its key.
pub(crate) fn insert_person(
  tx: &rusqlite::Transaction<'_>,
  person: &NewPerson,
  account_id: Option<i64>,
) -> rusqlite::Result<i64> {
  insert_parent(
    tx,
    "INSERT INTO people (national_id, name, surname, age, account_id)
     VALUES (?1, ?2, ?3, ?4, ?5)",
    rusqlite::params![
      person.national_id,
      person.name,
      person.surname,
      person.age,
      account_id,
    ],
  )
}

fn query_account(
  conn: &Connection,
  filter: &str,
  param: impl rusqlite::ToSql,
) -> rusqlite::Result<Option<RawAccount>> {
  conn
    .query_row(
      &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE {filter} = ?1"),
      rusqlite::params![param],
      RawAccount::read,
    )
    .optional()
}

// ─── CredentialStore impl ────────────────────────────────────────────────────

impl CredentialStore for SqliteStore {
  // ── Roles ─────────────────────────────────────────────────────────────────

  async fn add_role(&self, name: String) -> Result<Role> {
    let stored = name.clone();
    let id = self
      .conn
      .call(move |conn| {
        conn.execute("INSERT INTO roles (name) VALUES (?1)", rusqlite::params![stored])?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Role { role_id: RoleId(id), name })
  }

  async fn get_role(&self, id: RoleId) -> Result<Option<Role>> {
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(
            conn
              .query_row(
                "SELECT id, name FROM roles WHERE id = ?1",
                rusqlite::params![id.0],
                read_role,
              )
              .optional()?,
          )
        })
        .await?,
    )
  }

  async fn find_role(&self, name: &str) -> Result<Option<Role>> {
    let name = name.to_owned();
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(
            conn
              .query_row(
                "SELECT id, name FROM roles WHERE name = ?1",
                rusqlite::params![name],
                read_role,
              )
              .optional()?,
          )
        })
        .await?,
    )
  }

  async fn list_roles(&self) -> Result<Vec<Role>> {
    Ok(
      self
        .conn
        .call(|conn| {
          let mut stmt = conn.prepare("SELECT id, name FROM roles ORDER BY id")?;
          let rows = stmt
            .query_map([], read_role)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }

  // ── Accounts ──────────────────────────────────────────────────────────────

  async fn create_account(
    &self,
    account: NewAccount,
    person:  Option<NewPerson>,
  ) -> Result<AccountId> {
    let id = self
      .atomically(move |tx| {
        let account_id = insert_account(tx, &account)?;
        if let Some(person) = &person {
          insert_person(tx, person, Some(account_id))?;
        }
        Ok(account_id)
      })
      .await?;

    Ok(AccountId(id))
  }

  async fn create_first_account(&self, account: NewAccount) -> Result<Option<AccountId>> {
    let id = self
      .atomically(move |tx| {
        let taken: bool = tx.query_row(
          "SELECT EXISTS (SELECT 1 FROM accounts WHERE role_id = ?1)",
          rusqlite::params![account.role_id.0],
          |row| row.get(0),
        )?;
        if taken {
          return Ok(None);
        }
        insert_account(tx, &account).map(Some)
      })
      .await?;

    Ok(id.map(AccountId))
  }

  async fn get_account(&self, id: AccountId) -> Result<Option<Account>> {
    let raw = self
      .conn
      .call(move |conn| Ok(query_account(conn, "id", id.0)?))
      .await?;
    raw.map(RawAccount::into_account).transpose()
  }

  async fn find_account(&self, username: &str) -> Result<Option<Account>> {
    let username = username.to_owned();
    let raw = self
      .conn
      .call(move |conn| Ok(query_account(conn, "username", username)?))
      .await?;
    raw.map(RawAccount::into_account).transpose()
  }

  async fn update_password_hash(
    &self,
    id:            AccountId,
    password_hash: String,
    forced_change: bool,
  ) -> Result<bool> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE accounts SET password_hash = ?2, forced_change = ?3 WHERE id = ?1",
          rusqlite::params![id.0, password_hash, forced_change],
        )?)
      })
      .await?;
    Ok(changed == 1)
  }

  async fn replace_temporary_password(
    &self,
    id:            AccountId,
    password_hash: String,
  ) -> Result<bool> {
    // The flag check and the write are one statement, so two concurrent
    // first-login changes cannot both succeed.
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE accounts SET password_hash = ?2, forced_change = 0
           WHERE id = ?1 AND forced_change = 1",
          rusqlite::params![id.0, password_hash],
        )?)
      })
      .await?;
    Ok(changed == 1)
  }

  async fn set_forced_change(&self, id: AccountId, forced_change: bool) -> Result<bool> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE accounts SET forced_change = ?2 WHERE id = ?1",
          rusqlite::params![id.0, forced_change],
        )?)
      })
      .await?;
    Ok(changed == 1)
  }

  async fn set_account_active(&self, id: AccountId, active: bool) -> Result<bool> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE accounts SET active = ?2 WHERE id = ?1",
          rusqlite::params![id.0, active],
        )?)
      })
      .await?;
    Ok(changed == 1)
  }

  // ── People ────────────────────────────────────────────────────────────────

  async fn person_for_account(&self, id: AccountId) -> Result<Option<Person>> {
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(
            conn
              .query_row(
                &format!("SELECT {PERSON_COLUMNS} FROM people WHERE account_id = ?1"),
                rusqlite::params![id.0],
                |row| read_person(row, 0),
              )
              .optional()?,
          )
        })
        .await?,
    )
  }

  async fn find_person(&self, national_id: &str) -> Result<Option<Person>> {
    let national_id = national_id.to_owned();
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(
            conn
              .query_row(
                &format!("SELECT {PERSON_COLUMNS} FROM people WHERE national_id = ?1"),
                rusqlite::params![national_id],
                |row| read_person(row, 0),
              )
              .optional()?,
          )
        })
        .await?,
    )
  }
}
