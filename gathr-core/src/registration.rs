//! Attendance registration: the sole write path into the attendance
//! ledger.
//!
//! The eligibility reads (does the event exist, is the caller its creator,
//! is the window open) run up front; the seat reservation itself is a
//! single guarded insert, so the capacity and uniqueness checks cannot be
//! interleaved with a competing writer. The original two-step
//! count-then-insert shape loses a seat race between its read and its
//! write; here the count lives inside the insert statement and the
//! database serializes it, which also keeps several server processes on
//! one database file correct.

use kanau::processor::Processor;
use sqlx::SqlitePool;

use crate::entities::UnixMillis;
use crate::entities::attendees::{ATTENDEE_MEMBERSHIP, AttendanceRecord, EVENT_CAPACITY};
use crate::entities::events::GetEventById;
use crate::error::DomainError;
use crate::framework::DatabaseProcessor;
use crate::lifecycle;
use crate::membership::MembershipWrite;

pub struct RegistrationService {
    pool: SqlitePool,
}

impl RegistrationService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Register `user_id` for `event_id` at time `now`.
    ///
    /// Outcomes, in check order: `NotFound` (no such event), `Forbidden`
    /// (the creator implicitly attends and cannot register), and
    /// `RegistrationClosed` are decided before the write; `Capacity` and
    /// `AlreadyRegistered` fall out of the atomic insert. Nothing is
    /// retried here; `Storage` failures surface to the caller.
    #[tracing::instrument(skip(self), err)]
    pub async fn register(
        &self,
        event_id: i64,
        user_id: i64,
        now: UnixMillis,
    ) -> Result<AttendanceRecord, DomainError> {
        let processor = DatabaseProcessor {
            pool: self.pool.clone(),
        };
        let event = processor
            .process(GetEventById { event_id })
            .await?
            .ok_or(DomainError::NotFound("event"))?;

        if event.creator_id == user_id {
            return Err(DomainError::Forbidden("you are already registered"));
        }
        if !lifecycle::is_registration_open(&event, now) {
            return Err(DomainError::RegistrationClosed);
        }

        let mut conn = self.pool.acquire().await?;
        let outcome = ATTENDEE_MEMBERSHIP
            .insert_if_absent(&mut conn, event_id, user_id, now, Some(&EVENT_CAPACITY))
            .await?;
        match outcome {
            MembershipWrite::Inserted => Ok(AttendanceRecord {
                event_id,
                user_id,
                registered_at: now,
            }),
            MembershipWrite::CapacityExhausted => Err(DomainError::Capacity),
            MembershipWrite::Duplicate => Err(DomainError::AlreadyRegistered),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    const OPEN: UnixMillis = 500;

    async fn ledger_count(pool: &SqlitePool, event_id: i64) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM attendees WHERE event_id = ?")
            .bind(event_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn register_succeeds_inside_the_window() {
        let db = testing::test_db().await;
        let creator = testing::seed_user(&db.pool, "ada", "ada@example.com").await;
        let guest = testing::seed_user(&db.pool, "bob", "bob@example.com").await;
        let event_id = testing::seed_event(&db.pool, creator, 1_000, 2_000, 5).await;

        let service = RegistrationService::new(db.pool.clone());
        let record = service.register(event_id, guest, OPEN).await.unwrap();
        assert_eq!(record.event_id, event_id);
        assert_eq!(record.user_id, guest);
        assert_eq!(record.registered_at, OPEN);
        assert_eq!(ledger_count(&db.pool, event_id).await, 1);
    }

    #[tokio::test]
    async fn missing_event_is_not_found() {
        let db = testing::test_db().await;
        let guest = testing::seed_user(&db.pool, "bob", "bob@example.com").await;
        let service = RegistrationService::new(db.pool.clone());
        assert!(matches!(
            service.register(42, guest, OPEN).await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn creator_cannot_register_regardless_of_capacity() {
        let db = testing::test_db().await;
        let creator = testing::seed_user(&db.pool, "ada", "ada@example.com").await;
        let event_id = testing::seed_event(&db.pool, creator, 1_000, 2_000, 100).await;

        let service = RegistrationService::new(db.pool.clone());
        assert!(matches!(
            service.register(event_id, creator, OPEN).await,
            Err(DomainError::Forbidden(_))
        ));
        assert_eq!(ledger_count(&db.pool, event_id).await, 0);
    }

    #[tokio::test]
    async fn window_boundary_closes_registration() {
        let db = testing::test_db().await;
        let creator = testing::seed_user(&db.pool, "ada", "ada@example.com").await;
        let guest = testing::seed_user(&db.pool, "bob", "bob@example.com").await;
        let event_id = testing::seed_event(&db.pool, creator, 1_000, 2_000, 5).await;

        let service = RegistrationService::new(db.pool.clone());
        assert!(matches!(
            service.register(event_id, guest, 1_000).await,
            Err(DomainError::RegistrationClosed)
        ));
        assert!(matches!(
            service.register(event_id, guest, 5_000).await,
            Err(DomainError::RegistrationClosed)
        ));
        // Just inside the window it goes through.
        service.register(event_id, guest, 999).await.unwrap();
    }

    #[tokio::test]
    async fn archived_event_rejects_registration() {
        let db = testing::test_db().await;
        let creator = testing::seed_user(&db.pool, "ada", "ada@example.com").await;
        let guest = testing::seed_user(&db.pool, "bob", "bob@example.com").await;
        let event_id = testing::seed_event(&db.pool, creator, 1_000, 2_000, 5).await;
        crate::lifecycle::archive(&db.pool, event_id, creator)
            .await
            .unwrap();

        let service = RegistrationService::new(db.pool.clone());
        assert!(matches!(
            service.register(event_id, guest, OPEN).await,
            Err(DomainError::RegistrationClosed)
        ));
    }

    #[tokio::test]
    async fn second_registration_is_rejected_and_count_unchanged() {
        let db = testing::test_db().await;
        let creator = testing::seed_user(&db.pool, "ada", "ada@example.com").await;
        let guest = testing::seed_user(&db.pool, "bob", "bob@example.com").await;
        let event_id = testing::seed_event(&db.pool, creator, 1_000, 2_000, 5).await;

        let service = RegistrationService::new(db.pool.clone());
        service.register(event_id, guest, OPEN).await.unwrap();
        assert!(matches!(
            service.register(event_id, guest, OPEN).await,
            Err(DomainError::AlreadyRegistered)
        ));
        assert_eq!(ledger_count(&db.pool, event_id).await, 1);
    }

    #[tokio::test]
    async fn creator_only_event_is_born_at_capacity() {
        let db = testing::test_db().await;
        let creator = testing::seed_user(&db.pool, "ada", "ada@example.com").await;
        let guest = testing::seed_user(&db.pool, "bob", "bob@example.com").await;
        let event_id = testing::seed_event(&db.pool, creator, 1_000, 2_000, 1).await;

        let service = RegistrationService::new(db.pool.clone());
        assert!(matches!(
            service.register(event_id, guest, OPEN).await,
            Err(DomainError::Capacity)
        ));
        assert_eq!(ledger_count(&db.pool, event_id).await, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_racers_cannot_oversubscribe_the_last_seat() {
        let db = testing::test_db().await;
        let creator = testing::seed_user(&db.pool, "ada", "ada@example.com").await;
        // Two seats total: the creator plus exactly one ledger row.
        let event_id = testing::seed_event(&db.pool, creator, 1_000, 2_000, 2).await;

        let mut racers = Vec::new();
        for n in 0..8 {
            racers.push(testing::seed_user(&db.pool, "r", &format!("r{n}@example.com")).await);
        }

        let mut handles = Vec::new();
        for user_id in racers {
            let pool = db.pool.clone();
            handles.push(tokio::spawn(async move {
                RegistrationService::new(pool)
                    .register(event_id, user_id, OPEN)
                    .await
            }));
        }

        let mut won = 0;
        let mut capacity = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => won += 1,
                Err(DomainError::Capacity) => capacity += 1,
                Err(other) => panic!("unexpected outcome: {other:?}"),
            }
        }
        assert_eq!(won, 1);
        assert_eq!(capacity, 7);
        assert_eq!(ledger_count(&db.pool, event_id).await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_duplicates_yield_exactly_one_row() {
        let db = testing::test_db().await;
        let creator = testing::seed_user(&db.pool, "ada", "ada@example.com").await;
        let guest = testing::seed_user(&db.pool, "bob", "bob@example.com").await;
        let event_id = testing::seed_event(&db.pool, creator, 1_000, 2_000, 10).await;

        let mut handles = Vec::new();
        for _ in 0..6 {
            let pool = db.pool.clone();
            handles.push(tokio::spawn(async move {
                RegistrationService::new(pool)
                    .register(event_id, guest, OPEN)
                    .await
            }));
        }

        let mut won = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => won += 1,
                Err(DomainError::AlreadyRegistered) => {}
                Err(other) => panic!("unexpected outcome: {other:?}"),
            }
        }
        assert_eq!(won, 1);
        assert_eq!(ledger_count(&db.pool, event_id).await, 1);
    }
}
