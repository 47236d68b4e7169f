//! Application state shared across all request handlers.

use sqlx::SqlitePool;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (the pool is an Arc
/// internally).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: SqlitePool,
}

impl AppState {
    /// Create a new AppState with the given database pool.
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}
