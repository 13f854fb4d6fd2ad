use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            email       TEXT NOT NULL UNIQUE,
            username    TEXT NOT NULL UNIQUE,
            name        TEXT NOT NULL,
            password    TEXT NOT NULL,
            searchable  INTEGER NOT NULL DEFAULT 1,
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS events (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL REFERENCES users(id),
            kind        TEXT NOT NULL,
            category    TEXT NOT NULL,
            note        TEXT,
            is_shared   INTEGER NOT NULL DEFAULT 0,
            week_start  TEXT NOT NULL,
            created_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_events_owner_week
            ON events(user_id, kind, week_start);

        -- pair_lo/pair_hi is the canonical unordered-pair key: the two user
        -- ids sorted, so at most one row can ever exist per pair of users.
        CREATE TABLE IF NOT EXISTS friendships (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL REFERENCES users(id),
            friend_id   TEXT NOT NULL REFERENCES users(id),
            status      TEXT NOT NULL,
            pair_lo     TEXT NOT NULL,
            pair_hi     TEXT NOT NULL,
            created_at  TEXT NOT NULL,
            UNIQUE(pair_lo, pair_hi)
        );

        CREATE INDEX IF NOT EXISTS idx_friendships_target
            ON friendships(friend_id, status);

        CREATE TABLE IF NOT EXISTS invites (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL REFERENCES users(id),
            token       TEXT NOT NULL UNIQUE,
            expires_at  TEXT NOT NULL,
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS sessions (
            token       TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL REFERENCES users(id),
            expires_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS password_resets (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL REFERENCES users(id),
            token       TEXT NOT NULL UNIQUE,
            expires_at  TEXT NOT NULL,
            used        INTEGER NOT NULL DEFAULT 0
        );
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
