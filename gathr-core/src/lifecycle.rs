//! Event lifecycle: registration windows, search classification and
//! mutation rights.

use kanau::processor::Processor;
use sqlx::SqlitePool;

use crate::entities::events::{ArchiveEvent, Event, GetEventById};
use crate::entities::{EventStatus, UnixMillis};
use crate::error::DomainError;
use crate::framework::DatabaseProcessor;

/// Whether new attendees may still join.
///
/// Archival closes registration permanently; otherwise the window runs up
/// to (and excluding) `close_registration`. Creation-time validation
/// guarantees the window closes before the event starts, so this single
/// check suffices at registration time.
pub fn is_registration_open(event: &Event, now: UnixMillis) -> bool {
    event.status == EventStatus::Active && now < event.close_registration
}

/// Search-facing classification of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventPhase {
    Open,
    Archived,
}

/// An event reads as archived once its creator archived it or its
/// registration window lies in the past, whichever comes first.
pub fn classify(event: &Event, now: UnixMillis) -> EventPhase {
    if event.status == EventStatus::Archived || event.close_registration < now {
        EventPhase::Archived
    } else {
        EventPhase::Open
    }
}

/// Only the creator may mutate an event.
pub fn authorize_mutation(event: &Event, actor_id: i64) -> Result<(), DomainError> {
    if event.creator_id == actor_id {
        Ok(())
    } else {
        Err(DomainError::Forbidden(
            "only the event creator can modify this event",
        ))
    }
}

/// Archive an event: the creator-only soft delete.
///
/// Terminal and idempotent: archiving an already archived event succeeds
/// without observable effect. Ledger and question rows stay in place.
#[tracing::instrument(skip(pool), err)]
pub async fn archive(pool: &SqlitePool, event_id: i64, actor_id: i64) -> Result<(), DomainError> {
    let processor = DatabaseProcessor { pool: pool.clone() };
    let event = processor
        .process(GetEventById { event_id })
        .await?
        .ok_or(DomainError::NotFound("event"))?;
    authorize_mutation(&event, actor_id)?;
    processor.process(ArchiveEvent { event_id }).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    fn event_at(status: EventStatus, close_registration: UnixMillis) -> Event {
        Event {
            event_id: 1,
            creator_id: 7,
            name: "meetup".into(),
            description: "monthly catch-up".into(),
            location: "cafe".into(),
            start: close_registration + 1_000,
            close_registration,
            max_attendees: 10,
            status,
            created_at: 0,
        }
    }

    #[test]
    fn window_closes_at_the_boundary_instant() {
        let event = event_at(EventStatus::Active, 5_000);
        assert!(is_registration_open(&event, 4_999));
        assert!(!is_registration_open(&event, 5_000));
        assert!(!is_registration_open(&event, 5_001));
    }

    #[test]
    fn archived_events_are_never_open() {
        let event = event_at(EventStatus::Archived, 5_000);
        assert!(!is_registration_open(&event, 0));
    }

    #[test]
    fn classification_tracks_state_and_window() {
        let event = event_at(EventStatus::Active, 5_000);
        assert_eq!(classify(&event, 4_000), EventPhase::Open);
        // At the exact boundary the event still classifies as open even
        // though registration is already closed.
        assert_eq!(classify(&event, 5_000), EventPhase::Open);
        assert_eq!(classify(&event, 5_001), EventPhase::Archived);

        let archived = event_at(EventStatus::Archived, 5_000);
        assert_eq!(classify(&archived, 0), EventPhase::Archived);
    }

    #[test]
    fn mutation_is_creator_only() {
        let event = event_at(EventStatus::Active, 5_000);
        assert!(authorize_mutation(&event, 7).is_ok());
        assert!(matches!(
            authorize_mutation(&event, 8),
            Err(DomainError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn archive_is_idempotent_and_closes_registration() {
        let db = testing::test_db().await;
        let creator = testing::seed_user(&db.pool, "ada", "ada@example.com").await;
        let event_id = testing::seed_event(&db.pool, creator, 5_000, 6_000, 10).await;

        archive(&db.pool, event_id, creator).await.unwrap();
        archive(&db.pool, event_id, creator).await.unwrap();

        let processor = DatabaseProcessor {
            pool: db.pool.clone(),
        };
        let event = processor
            .process(GetEventById { event_id })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.status, EventStatus::Archived);
        assert!(!is_registration_open(&event, 0));
    }

    #[tokio::test]
    async fn archive_rejects_non_creator_and_missing_event() {
        let db = testing::test_db().await;
        let creator = testing::seed_user(&db.pool, "ada", "ada@example.com").await;
        let other = testing::seed_user(&db.pool, "bob", "bob@example.com").await;
        let event_id = testing::seed_event(&db.pool, creator, 5_000, 6_000, 10).await;

        assert!(matches!(
            archive(&db.pool, event_id, other).await,
            Err(DomainError::Forbidden(_))
        ));
        assert!(matches!(
            archive(&db.pool, event_id + 999, creator).await,
            Err(DomainError::NotFound(_))
        ));

        let processor = DatabaseProcessor {
            pool: db.pool.clone(),
        };
        let event = processor
            .process(GetEventById { event_id })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.status, EventStatus::Active);
    }
}
