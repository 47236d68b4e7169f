//! Shared fixtures for the test suite: a migrated, file-backed SQLite
//! database per test so concurrent connections exercise the same locking
//! the server sees.

use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use tempfile::TempDir;

pub(crate) struct TestDb {
    pub pool: SqlitePool,
    // Held so the database file outlives the pool.
    _dir: TempDir,
}

pub(crate) async fn test_db() -> TestDb {
    let dir = tempfile::tempdir().unwrap();
    let options = SqliteConnectOptions::new()
        .filename(dir.path().join("gathr-test.db"))
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(10))
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .connect_with(options)
        .await
        .unwrap();
    sqlx::migrate!("../migrations").run(&pool).await.unwrap();
    TestDb { pool, _dir: dir }
}

pub(crate) async fn seed_user(pool: &SqlitePool, name: &str, email: &str) -> i64 {
    sqlx::query(
        "INSERT INTO users (first_name, last_name, email, password_hash) VALUES (?, ?, ?, ?)",
    )
    .bind(name)
    .bind(name)
    .bind(email)
    .bind("$argon2id$test")
    .execute(pool)
    .await
    .unwrap()
    .last_insert_rowid()
}

pub(crate) async fn seed_event(
    pool: &SqlitePool,
    creator_id: i64,
    close_registration: i64,
    start: i64,
    max_attendees: i64,
) -> i64 {
    sqlx::query(
        "INSERT INTO events \
             (creator_id, name, description, location, start, close_registration, \
              max_attendees, status, created_at) \
         VALUES (?, 'test event', 'a test event', 'somewhere', ?, ?, ?, 'active', 0)",
    )
    .bind(creator_id)
    .bind(start)
    .bind(close_registration)
    .bind(max_attendees)
    .execute(pool)
    .await
    .unwrap()
    .last_insert_rowid()
}

pub(crate) async fn seed_question(
    pool: &SqlitePool,
    event_id: i64,
    asked_by: i64,
    question: &str,
) -> i64 {
    sqlx::query(
        "INSERT INTO questions (event_id, asked_by, question, votes, created_at) \
         VALUES (?, ?, ?, 0, 0)",
    )
    .bind(event_id)
    .bind(asked_by)
    .bind(question)
    .execute(pool)
    .await
    .unwrap()
    .last_insert_rowid()
}
