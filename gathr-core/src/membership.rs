//! Exactly-once membership facts.
//!
//! The attendance ledger and the vote table share one discipline: an arena
//! of `(parent_id, actor_id)` rows with at most one row per pair, optionally
//! bounded by a capacity column on the parent row. The guarded insert is a
//! single SQL statement, so two writers racing for the last seat cannot
//! both pass the check: the count re-validation and the uniqueness check
//! happen inside the write itself.

use sqlx::SqliteConnection;

/// Identifies one membership arena.
///
/// All names are compile-time constants naming schema objects; nothing
/// user-controlled is ever interpolated into the generated SQL.
#[derive(Debug, Clone, Copy)]
pub struct MembershipTable {
    pub member_table: &'static str,
    pub parent_col: &'static str,
    pub actor_col: &'static str,
    pub recorded_col: &'static str,
}

/// Capacity clause evaluated inside the insert statement.
///
/// `headroom` counts implicit members that never get a row; the event
/// creator occupies a seat without a ledger entry.
#[derive(Debug, Clone, Copy)]
pub struct CapacityGuard {
    pub parent_table: &'static str,
    pub parent_key_col: &'static str,
    pub capacity_col: &'static str,
    pub headroom: i64,
}

/// Outcome of an [`MembershipTable::insert_if_absent`] attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipWrite {
    Inserted,
    /// The `(parent, actor)` fact already exists.
    Duplicate,
    /// The capacity guard refused the insert.
    CapacityExhausted,
}

impl MembershipTable {
    /// Record a membership fact at most once.
    ///
    /// With a guard, the insert only lands while
    /// `count(members) + headroom < capacity`, evaluated in the same
    /// statement as the write; `ON CONFLICT DO NOTHING` absorbs duplicate
    /// pairs. A rejected guarded insert is classified afterwards; the
    /// probe only labels a write that has already been refused, so it
    /// carries no race of its own.
    pub async fn insert_if_absent(
        &self,
        conn: &mut SqliteConnection,
        parent_id: i64,
        actor_id: i64,
        recorded_at: i64,
        guard: Option<&CapacityGuard>,
    ) -> Result<MembershipWrite, sqlx::Error> {
        let rows_affected = match guard {
            Some(guard) => {
                let sql = format!(
                    "INSERT INTO {member} ({parent}, {actor}, {recorded}) \
                     SELECT ?, ?, ? \
                     WHERE (SELECT COUNT(*) FROM {member} WHERE {parent} = ?) + ? \
                         < (SELECT {capacity} FROM {parent_table} WHERE {parent_key} = ?) \
                     ON CONFLICT ({parent}, {actor}) DO NOTHING",
                    member = self.member_table,
                    parent = self.parent_col,
                    actor = self.actor_col,
                    recorded = self.recorded_col,
                    capacity = guard.capacity_col,
                    parent_table = guard.parent_table,
                    parent_key = guard.parent_key_col,
                );
                sqlx::query(&sql)
                    .bind(parent_id)
                    .bind(actor_id)
                    .bind(recorded_at)
                    .bind(parent_id)
                    .bind(guard.headroom)
                    .bind(parent_id)
                    .execute(&mut *conn)
                    .await?
                    .rows_affected()
            }
            None => {
                let sql = format!(
                    "INSERT INTO {member} ({parent}, {actor}, {recorded}) \
                     VALUES (?, ?, ?) \
                     ON CONFLICT ({parent}, {actor}) DO NOTHING",
                    member = self.member_table,
                    parent = self.parent_col,
                    actor = self.actor_col,
                    recorded = self.recorded_col,
                );
                sqlx::query(&sql)
                    .bind(parent_id)
                    .bind(actor_id)
                    .bind(recorded_at)
                    .execute(&mut *conn)
                    .await?
                    .rows_affected()
            }
        };

        if rows_affected == 1 {
            return Ok(MembershipWrite::Inserted);
        }
        match guard {
            None => Ok(MembershipWrite::Duplicate),
            Some(guard) => self.classify_rejection(conn, guard, parent_id, actor_id).await,
        }
    }

    async fn classify_rejection(
        &self,
        conn: &mut SqliteConnection,
        guard: &CapacityGuard,
        parent_id: i64,
        actor_id: i64,
    ) -> Result<MembershipWrite, sqlx::Error> {
        #[derive(sqlx::FromRow)]
        struct RejectionProbe {
            already_member: bool,
            member_count: i64,
            capacity: Option<i64>,
        }

        let sql = format!(
            "SELECT \
                 EXISTS(SELECT 1 FROM {member} WHERE {parent} = ? AND {actor} = ?) \
                     AS already_member, \
                 (SELECT COUNT(*) FROM {member} WHERE {parent} = ?) AS member_count, \
                 (SELECT {capacity} FROM {parent_table} WHERE {parent_key} = ?) AS capacity",
            member = self.member_table,
            parent = self.parent_col,
            actor = self.actor_col,
            capacity = guard.capacity_col,
            parent_table = guard.parent_table,
            parent_key = guard.parent_key_col,
        );
        let probe = sqlx::query_as::<_, RejectionProbe>(&sql)
            .bind(parent_id)
            .bind(actor_id)
            .bind(parent_id)
            .bind(parent_id)
            .fetch_one(&mut *conn)
            .await?;

        // Capacity wins over duplicate when both hold: the registration
        // contract checks the seat bound before the uniqueness of the pair.
        match probe.capacity {
            Some(capacity) if probe.member_count + guard.headroom >= capacity => {
                Ok(MembershipWrite::CapacityExhausted)
            }
            Some(_) if probe.already_member => Ok(MembershipWrite::Duplicate),
            // Room appeared (or the parent row vanished) between the refused
            // insert and this probe; the write itself was rejected by the
            // guard, so report it as such.
            _ => Ok(MembershipWrite::CapacityExhausted),
        }
    }
}
