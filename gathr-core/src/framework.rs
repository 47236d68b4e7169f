use sqlx::SqlitePool;

/// Host type for pool-backed query messages.
///
/// Entity modules implement [`kanau::processor::Processor`] on this, one
/// message struct per SQL statement. Operations that span several
/// statements take a `sqlx::Transaction` through `*_tx` associated
/// functions on the entity instead.
pub struct DatabaseProcessor {
    pub pool: SqlitePool,
}
