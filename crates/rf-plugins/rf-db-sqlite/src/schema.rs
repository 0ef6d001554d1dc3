//! Table definitions. Created idempotently on connect; there is no
//! migration history.

use rf_core::error::Result;
use sqlx::sqlite::SqlitePool;

use crate::storage;

const CREATE_TABLES: [&str; 4] = [
    "CREATE TABLE IF NOT EXISTS forums (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        title       TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT ''
    )",
    "CREATE TABLE IF NOT EXISTS topics (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        title       TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        forum_id    INTEGER NOT NULL REFERENCES forums(id)
    )",
    "CREATE TABLE IF NOT EXISTS users (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        username      TEXT NOT NULL UNIQUE,
        email         TEXT NOT NULL DEFAULT '',
        password_hash TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS posts (
        id        INTEGER PRIMARY KEY AUTOINCREMENT,
        text      TEXT NOT NULL,
        published TEXT NOT NULL,
        topic_id  INTEGER NOT NULL REFERENCES topics(id),
        user_id   INTEGER NOT NULL REFERENCES users(id)
    )",
];

pub(crate) async fn create_tables(pool: &SqlitePool) -> Result<()> {
    for statement in CREATE_TABLES {
        sqlx::query(statement).execute(pool).await.map_err(storage)?;
    }
    Ok(())
}
