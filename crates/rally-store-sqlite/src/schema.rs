//! SQL schema for the Rally SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,   -- argon2 PHC string
    role          TEXT NOT NULL,   -- 'organizer' | 'participant'
    created_at    TEXT NOT NULL    -- ISO 8601 UTC
);

-- Bearer sessions. Only the SHA-256 digest of a token is stored; logout
-- deletes the row.
CREATE TABLE IF NOT EXISTS sessions (
    token_digest TEXT PRIMARY KEY,
    user_id      TEXT NOT NULL REFERENCES users(user_id),
    created_at   TEXT NOT NULL
);

-- One row per event. participants is an append-ordered JSON array of user
-- ids; participant_count is a writer-maintained mirror of its length, not
-- derived here.
CREATE TABLE IF NOT EXISTS events (
    event_id          TEXT PRIMARY KEY,
    title             TEXT NOT NULL,
    description       TEXT NOT NULL,
    location          TEXT NOT NULL,
    date              TEXT NOT NULL,   -- ISO 8601 UTC
    organizer_id      TEXT NOT NULL REFERENCES users(user_id),
    capacity          INTEGER NOT NULL,
    participants      TEXT NOT NULL DEFAULT '[]',
    participant_count INTEGER NOT NULL DEFAULT 0,
    created_at        TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS sessions_user_idx    ON sessions(user_id);
CREATE INDEX IF NOT EXISTS events_organizer_idx ON events(organizer_id);

PRAGMA user_version = 1;
";
