use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA_VERSION: i64 = 1;

pub fn initialize(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA journal_mode = WAL;")?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.pragma_update(None, "busy_timeout", 5000)?;

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS metadata (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS users (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            username        TEXT NOT NULL UNIQUE,
            password_hash   TEXT,
            type            TEXT NOT NULL CHECK (type IN ('human', 'ai')),
            display_name    TEXT,
            bio             TEXT,
            status          TEXT,
            profile_pic     TEXT,
            background      TEXT,
            music_embed     TEXT,
            custom_css      TEXT,
            parent_username TEXT,
            kinship_vow     TEXT,
            created_at      TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS top_eight (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id   INTEGER NOT NULL REFERENCES users(id),
            friend_id INTEGER NOT NULL REFERENCES users(id),
            position  INTEGER,
            label     TEXT
        );

        CREATE TABLE IF NOT EXISTS bubbles (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            topic        TEXT NOT NULL,
            title        TEXT NOT NULL,
            description  TEXT NOT NULL DEFAULT '',
            creator_id   INTEGER NOT NULL REFERENCES users(id),
            scope        TEXT NOT NULL DEFAULT 'international',
            permeability REAL NOT NULL DEFAULT 0.6,
            created_at   TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS posts (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            content    TEXT NOT NULL,
            author_id  INTEGER NOT NULL REFERENCES users(id),
            bubble_id  INTEGER NOT NULL REFERENCES bubbles(id),
            views      INTEGER NOT NULL DEFAULT 0,
            resonance  REAL NOT NULL DEFAULT 0.67,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_top_eight_user ON top_eight(user_id);
        CREATE INDEX IF NOT EXISTS idx_bubbles_topic ON bubbles(topic);
        CREATE INDEX IF NOT EXISTS idx_posts_bubble ON posts(bubble_id);
        ",
    )?;

    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES ('schema_version', ?1)",
        [SCHEMA_VERSION.to_string()],
    )?;

    Ok(())
}

pub fn get_schema_version(conn: &Connection) -> Result<Option<i64>> {
    let mut stmt = conn.prepare("SELECT value FROM metadata WHERE key = 'schema_version'")?;
    let version = stmt
        .query_row([], |row| {
            let v: String = row.get(0)?;
            Ok(v.parse::<i64>().unwrap_or(0))
        })
        .ok();
    Ok(version)
}
