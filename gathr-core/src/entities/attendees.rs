use kanau::processor::Processor;

use crate::entities::UnixMillis;
use crate::entities::users::UserSummary;
use crate::framework::DatabaseProcessor;
use crate::membership::{CapacityGuard, MembershipTable};

/// One attendance ledger row: the fact that a user registered for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct AttendanceRecord {
    pub event_id: i64,
    pub user_id: i64,
    pub registered_at: UnixMillis,
}

/// Ledger descriptor for the membership primitive.
pub const ATTENDEE_MEMBERSHIP: MembershipTable = MembershipTable {
    member_table: "attendees",
    parent_col: "event_id",
    actor_col: "user_id",
    recorded_col: "registered_at",
};

/// Seat bound: ledger rows plus the creator's implicit seat stay within
/// `events.max_attendees`.
pub const EVENT_CAPACITY: CapacityGuard = CapacityGuard {
    parent_table: "events",
    parent_key_col: "event_id",
    capacity_col: "max_attendees",
    headroom: 1,
};

#[derive(Debug, Clone, Copy)]
pub struct CountAttendees {
    pub event_id: i64,
}

impl Processor<CountAttendees> for DatabaseProcessor {
    type Output = i64;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:CountAttendees")]
    async fn process(&self, query: CountAttendees) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM attendees WHERE event_id = ?")
            .bind(query.event_id)
            .fetch_one(&self.pool)
            .await
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AttendeeExists {
    pub event_id: i64,
    pub user_id: i64,
}

impl Processor<AttendeeExists> for DatabaseProcessor {
    type Output = bool;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:AttendeeExists")]
    async fn process(&self, query: AttendeeExists) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM attendees WHERE event_id = ? AND user_id = ?)",
        )
        .bind(query.event_id)
        .bind(query.user_id)
        .fetch_one(&self.pool)
        .await
    }
}

/// Attendees of an event in registration order.
#[derive(Debug, Clone, Copy)]
pub struct ListAttendees {
    pub event_id: i64,
}

impl Processor<ListAttendees> for DatabaseProcessor {
    type Output = Vec<UserSummary>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListAttendees")]
    async fn process(&self, query: ListAttendees) -> Result<Vec<UserSummary>, sqlx::Error> {
        sqlx::query_as::<_, UserSummary>(
            "SELECT u.user_id, u.first_name, u.last_name, u.email \
             FROM attendees a JOIN users u ON a.user_id = u.user_id \
             WHERE a.event_id = ? \
             ORDER BY a.registered_at, u.user_id",
        )
        .bind(query.event_id)
        .fetch_all(&self.pool)
        .await
    }
}

impl AttendanceRecord {
    /// Drop every ledger row of an event. Only the hard-delete path uses
    /// this; archival keeps the ledger intact.
    pub async fn remove_all_for_event_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        event_id: i64,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM attendees WHERE event_id = ?")
            .bind(event_id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }
}
