//! SQL schema for the Escolar SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS identities (
    identity_id TEXT PRIMARY KEY,
    username    TEXT NOT NULL UNIQUE,
    first_name  TEXT NOT NULL,
    last_name   TEXT NOT NULL,
    email       TEXT NOT NULL,
    role        TEXT,              -- 'administrator' | 'student' | 'teacher'
    created_at  TEXT NOT NULL
);

-- Only SHA-256 digests of bearer tokens are stored.
CREATE TABLE IF NOT EXISTS tokens (
    digest      TEXT PRIMARY KEY,
    identity_id TEXT NOT NULL REFERENCES identities(identity_id) ON DELETE CASCADE,
    created_at  TEXT NOT NULL
);

-- One profile per identity holding a role.
CREATE TABLE IF NOT EXISTS profiles (
    profile_id  TEXT PRIMARY KEY,
    identity_id TEXT NOT NULL UNIQUE
                REFERENCES identities(identity_id) ON DELETE CASCADE,
    role        TEXT NOT NULL,
    attributes  TEXT NOT NULL,     -- JSON, tagged with the role
    created_at  TEXT NOT NULL,
    updated_at  TEXT
);

CREATE TABLE IF NOT EXISTS events (
    event_id       TEXT PRIMARY KEY,
    owner_id       TEXT REFERENCES identities(identity_id) ON DELETE CASCADE,
    name           TEXT NOT NULL,
    category       TEXT NOT NULL,
    date           TEXT NOT NULL,  -- %Y-%m-%d
    start_time     TEXT NOT NULL,  -- %H:%M:%S
    end_time       TEXT NOT NULL,
    venue          TEXT NOT NULL,
    audience       TEXT NOT NULL,  -- 'students' | 'teachers' | 'general_public'
    program        TEXT,
    responsible_id TEXT REFERENCES identities(identity_id) ON DELETE SET NULL,
    description    TEXT NOT NULL,
    capacity       INTEGER NOT NULL DEFAULT 0,
    active         INTEGER NOT NULL DEFAULT 1,
    created_at     TEXT NOT NULL,
    updated_at     TEXT NOT NULL,
    CHECK (capacity >= 0),
    CHECK (program IS NULL OR audience = 'students')
);

CREATE INDEX IF NOT EXISTS events_listing_idx  ON events(active, date, start_time);
CREATE INDEX IF NOT EXISTS profiles_role_idx   ON profiles(role);
CREATE INDEX IF NOT EXISTS tokens_identity_idx ON tokens(identity_id);

PRAGMA user_version = 1;
";
