//! SQL schema for the Urna SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS roles (
    id    INTEGER PRIMARY KEY AUTOINCREMENT,
    name  TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS accounts (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    username       TEXT NOT NULL UNIQUE,
    password_hash  TEXT NOT NULL,
    role_id        INTEGER NOT NULL REFERENCES roles(id) ON DELETE RESTRICT,
    active         INTEGER NOT NULL DEFAULT 1,
    forced_change  INTEGER NOT NULL DEFAULT 0,
    created_at     TEXT NOT NULL   -- RFC 3339 UTC; server-assigned
);

-- A person is owned by at most one account.
CREATE TABLE IF NOT EXISTS people (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    national_id  TEXT NOT NULL UNIQUE,
    name         TEXT NOT NULL,
    surname      TEXT NOT NULL,
    age          INTEGER NOT NULL,
    account_id   INTEGER UNIQUE REFERENCES accounts(id)
);

-- Students and candidates share the primary key of the person they extend.
CREATE TABLE IF NOT EXISTS students (
    id             INTEGER PRIMARY KEY REFERENCES people(id),
    program        TEXT NOT NULL,
    enrollment_id  TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS candidates (
    id          INTEGER PRIMARY KEY REFERENCES students(id),
    active      INTEGER NOT NULL DEFAULT 1,
    photo_path  TEXT,
    category    TEXT NOT NULL,
    attributes  TEXT NOT NULL DEFAULT '{}'   -- JSON CandidateAttributes
);

-- Votes are strictly append-only. The UNIQUE constraint is the authority on
-- one vote per voter and category.
CREATE TABLE IF NOT EXISTS votes (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    voter_id      INTEGER NOT NULL REFERENCES people(id),
    candidate_id  INTEGER NOT NULL REFERENCES candidates(id),
    category      TEXT NOT NULL,
    cast_at       TEXT NOT NULL,
    UNIQUE (voter_id, category)
);

CREATE TRIGGER IF NOT EXISTS votes_no_update
BEFORE UPDATE ON votes
BEGIN
    SELECT RAISE(ABORT, 'votes are append-only');
END;

CREATE TRIGGER IF NOT EXISTS votes_no_delete
BEFORE DELETE ON votes
BEGIN
    SELECT RAISE(ABORT, 'votes are append-only');
END;

CREATE TABLE IF NOT EXISTS albums (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    title               TEXT NOT NULL,
    description         TEXT,
    owner_candidate_id  INTEGER NOT NULL REFERENCES candidates(id)
);

CREATE TABLE IF NOT EXISTS photos (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    path         TEXT NOT NULL CHECK (length(path) > 0),
    description  TEXT,
    album_id     INTEGER NOT NULL REFERENCES albums(id)
);

CREATE INDEX IF NOT EXISTS accounts_role_idx    ON accounts(role_id);
CREATE INDEX IF NOT EXISTS candidates_cat_idx   ON candidates(category);
CREATE INDEX IF NOT EXISTS votes_candidate_idx  ON votes(candidate_id);
CREATE INDEX IF NOT EXISTS photos_album_idx     ON photos(album_id);
CREATE INDEX IF NOT EXISTS albums_owner_idx     ON albums(owner_candidate_id);

PRAGMA user_version = 1;
";
