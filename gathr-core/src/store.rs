//! Event catalogue: creation, detail reads, partial updates, search and
//! the hard-delete path.

use kanau::processor::Processor;
use sqlx::SqlitePool;

use gathr_sdk::objects::events::StatusFilter;

use crate::entities::attendees::{AttendanceRecord, CountAttendees, ListAttendees};
use crate::entities::events::{
    Event, EventRowInsert, EventRowUpdate, EventSearchRow, GetEventById, GetEventCategories,
    SearchEvents, SearchScope,
};
use crate::entities::questions::{ListEventQuestions, Question};
use crate::entities::users::{GetUserSummary, UserSummary};
use crate::entities::{EventStatus, UnixMillis};
use crate::error::DomainError;
use crate::framework::DatabaseProcessor;
use crate::lifecycle;

pub const DEFAULT_SEARCH_LIMIT: i64 = 20;
pub const MAX_SEARCH_LIMIT: i64 = 100;

const MAX_NAME_LEN: usize = 128;
const MAX_TEXT_LEN: usize = 2_000;

/// A validated-on-entry draft for a new event.
#[derive(Debug, Clone)]
pub struct EventDraft {
    pub name: String,
    pub description: String,
    pub location: String,
    pub start: UnixMillis,
    pub close_registration: UnixMillis,
    pub max_attendees: i64,
    pub categories: Vec<String>,
}

/// Partial update: absent fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: Option<UnixMillis>,
    pub close_registration: Option<UnixMillis>,
    pub max_attendees: Option<i64>,
    pub categories: Option<Vec<String>>,
}

/// Everything `GET /events/{id}` needs in one value.
#[derive(Debug, Clone)]
pub struct EventDetail {
    pub event: Event,
    pub creator: UserSummary,
    pub categories: Vec<String>,
    /// Ledger rows plus the creator's implicit seat.
    pub number_attending: i64,
    pub attendees: Vec<UserSummary>,
    pub questions: Vec<Question>,
}

/// Search input after HTTP-level parsing, before validation.
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    pub query: Option<String>,
    pub categories: Vec<String>,
    pub status: Option<StatusFilter>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// One page of search results with the window that produced it.
#[derive(Debug, Clone)]
pub struct SearchPage {
    pub events: Vec<EventSearchRow>,
    pub limit: i64,
    pub offset: i64,
}

pub struct EventStore {
    pool: SqlitePool,
}

impl EventStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn processor(&self) -> DatabaseProcessor {
        DatabaseProcessor {
            pool: self.pool.clone(),
        }
    }

    /// Create an event owned by `creator_id` and return its id.
    #[tracing::instrument(skip(self, draft), err)]
    pub async fn create(
        &self,
        creator_id: i64,
        draft: EventDraft,
        now: UnixMillis,
    ) -> Result<i64, DomainError> {
        validate_text("name", &draft.name, MAX_NAME_LEN)?;
        validate_text("description", &draft.description, MAX_TEXT_LEN)?;
        validate_text("location", &draft.location, MAX_NAME_LEN)?;
        validate_schedule(draft.start, draft.close_registration)?;
        validate_capacity(draft.max_attendees)?;
        validate_categories(&draft.categories)?;

        let mut tx = self.pool.begin().await?;
        let event_id = Event::insert_tx(
            &mut tx,
            &EventRowInsert {
                creator_id,
                name: draft.name,
                description: draft.description,
                location: draft.location,
                start: draft.start,
                close_registration: draft.close_registration,
                max_attendees: draft.max_attendees,
                created_at: now,
            },
        )
        .await?;
        Event::replace_categories_tx(&mut tx, event_id, &draft.categories).await?;
        tx.commit().await?;
        Ok(event_id)
    }

    pub async fn get(&self, event_id: i64) -> Result<Event, DomainError> {
        self.processor()
            .process(GetEventById { event_id })
            .await?
            .ok_or(DomainError::NotFound("event"))
    }

    /// Full detail: event, creator, categories, attendance and questions.
    #[tracing::instrument(skip(self), err)]
    pub async fn get_detail(&self, event_id: i64) -> Result<EventDetail, DomainError> {
        let processor = self.processor();
        let event = self.get(event_id).await?;
        let creator = processor
            .process(GetUserSummary {
                user_id: event.creator_id,
            })
            .await?
            .ok_or(DomainError::NotFound("event creator"))?;
        let categories = processor.process(GetEventCategories { event_id }).await?;
        let ledger_rows = processor.process(CountAttendees { event_id }).await?;
        let attendees = processor.process(ListAttendees { event_id }).await?;
        let questions = processor.process(ListEventQuestions { event_id }).await?;
        Ok(EventDetail {
            event,
            creator,
            categories,
            number_attending: ledger_rows + 1,
            attendees,
            questions,
        })
    }

    /// Creator-only partial update. Present fields replace stored values;
    /// the merged row is re-validated before the write.
    #[tracing::instrument(skip(self, patch), err)]
    pub async fn update(
        &self,
        event_id: i64,
        actor_id: i64,
        patch: EventPatch,
    ) -> Result<(), DomainError> {
        let event = self.get(event_id).await?;
        lifecycle::authorize_mutation(&event, actor_id)?;
        if event.status == EventStatus::Archived {
            return Err(DomainError::Forbidden("archived events cannot be updated"));
        }

        let merged = EventRowUpdate {
            event_id,
            name: patch.name.unwrap_or(event.name),
            description: patch.description.unwrap_or(event.description),
            location: patch.location.unwrap_or(event.location),
            start: patch.start.unwrap_or(event.start),
            close_registration: patch.close_registration.unwrap_or(event.close_registration),
            max_attendees: patch.max_attendees.unwrap_or(event.max_attendees),
        };
        validate_text("name", &merged.name, MAX_NAME_LEN)?;
        validate_text("description", &merged.description, MAX_TEXT_LEN)?;
        validate_text("location", &merged.location, MAX_NAME_LEN)?;
        validate_schedule(merged.start, merged.close_registration)?;
        validate_capacity(merged.max_attendees)?;
        if let Some(categories) = &patch.categories {
            validate_categories(categories)?;
        }

        let mut tx = self.pool.begin().await?;
        Event::update_row_tx(&mut tx, &merged).await?;
        if let Some(categories) = &patch.categories {
            Event::replace_categories_tx(&mut tx, event_id, categories).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Paged search. `MY_EVENTS` and `ATTENDING` need an authenticated
    /// actor; everything else works anonymously.
    #[tracing::instrument(skip(self, filters), err)]
    pub async fn search(
        &self,
        filters: SearchFilters,
        actor_id: Option<i64>,
        now: UnixMillis,
    ) -> Result<SearchPage, DomainError> {
        let limit = filters.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
        if !(1..=MAX_SEARCH_LIMIT).contains(&limit) {
            return Err(DomainError::validation(format!(
                "limit must be between 1 and {MAX_SEARCH_LIMIT}"
            )));
        }
        let offset = filters.offset.unwrap_or(0);
        if offset < 0 {
            return Err(DomainError::validation("offset must not be negative"));
        }

        let scope = match filters.status {
            None => SearchScope::Any,
            Some(StatusFilter::Open) => SearchScope::Open,
            Some(StatusFilter::Archive) => SearchScope::Archive,
            Some(StatusFilter::MyEvents) => {
                SearchScope::MyEvents(actor_id.ok_or(DomainError::Unauthorized)?)
            }
            Some(StatusFilter::Attending) => {
                SearchScope::Attending(actor_id.ok_or(DomainError::Unauthorized)?)
            }
        };

        let events = self
            .processor()
            .process(SearchEvents {
                text: filters.query,
                categories: filters.categories,
                scope,
                now,
                limit,
                offset,
            })
            .await?;
        Ok(SearchPage {
            events,
            limit,
            offset,
        })
    }

    /// Hard delete: remove the event together with its ledger, questions
    /// and categories. Creator-only, and only once the event is archived,
    /// so a live event is never physically deleted out from under its
    /// attendees.
    #[tracing::instrument(skip(self), err)]
    pub async fn purge(&self, event_id: i64, actor_id: i64) -> Result<(), DomainError> {
        let event = self.get(event_id).await?;
        lifecycle::authorize_mutation(&event, actor_id)?;
        if event.status != EventStatus::Archived {
            return Err(DomainError::Forbidden(
                "only archived events can be deleted",
            ));
        }

        let mut tx = self.pool.begin().await?;
        Question::remove_all_for_event_tx(&mut tx, event_id).await?;
        AttendanceRecord::remove_all_for_event_tx(&mut tx, event_id).await?;
        sqlx::query("DELETE FROM event_categories WHERE event_id = ?")
            .bind(event_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM events WHERE event_id = ?")
            .bind(event_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}

fn validate_text(field: &str, value: &str, max_len: usize) -> Result<(), DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} must not be empty")));
    }
    if trimmed.len() > max_len {
        return Err(DomainError::validation(format!(
            "{field} must be at most {max_len} characters"
        )));
    }
    Ok(())
}

fn validate_schedule(start: UnixMillis, close_registration: UnixMillis) -> Result<(), DomainError> {
    if close_registration >= start {
        return Err(DomainError::validation(
            "close_registration must be before start",
        ));
    }
    Ok(())
}

fn validate_capacity(max_attendees: i64) -> Result<(), DomainError> {
    if max_attendees < 1 {
        return Err(DomainError::validation("max_attendees must be at least 1"));
    }
    Ok(())
}

fn validate_categories(categories: &[String]) -> Result<(), DomainError> {
    for category in categories {
        validate_text("category", category, MAX_NAME_LEN)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    fn draft(close_registration: UnixMillis, start: UnixMillis, max_attendees: i64) -> EventDraft {
        EventDraft {
            name: "rustfest".into(),
            description: "an evening of borrow checking".into(),
            location: "federal cafe".into(),
            start,
            close_registration,
            max_attendees,
            categories: vec!["tech".into(), "social".into()],
        }
    }

    #[tokio::test]
    async fn create_rejects_inverted_schedule_and_zero_capacity() {
        let db = testing::test_db().await;
        let creator = testing::seed_user(&db.pool, "ada", "ada@example.com").await;
        let store = EventStore::new(db.pool.clone());

        assert!(matches!(
            store.create(creator, draft(2_000, 2_000, 5), 0).await,
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            store.create(creator, draft(1_000, 2_000, 0), 0).await,
            Err(DomainError::Validation(_))
        ));

        let mut empty_name = draft(1_000, 2_000, 5);
        empty_name.name = "   ".into();
        assert!(matches!(
            store.create(creator, empty_name, 0).await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn detail_counts_the_creator_and_orders_questions_by_votes() {
        let db = testing::test_db().await;
        let creator = testing::seed_user(&db.pool, "ada", "ada@example.com").await;
        let guest = testing::seed_user(&db.pool, "bob", "bob@example.com").await;
        let store = EventStore::new(db.pool.clone());

        let event_id = store.create(creator, draft(1_000, 2_000, 5), 0).await.unwrap();
        crate::registration::RegistrationService::new(db.pool.clone())
            .register(event_id, guest, 500)
            .await
            .unwrap();
        let quiet = testing::seed_question(&db.pool, event_id, guest, "is there wifi?").await;
        let popular = testing::seed_question(&db.pool, event_id, guest, "what time?").await;
        sqlx::query("UPDATE questions SET votes = 3 WHERE question_id = ?")
            .bind(popular)
            .execute(&db.pool)
            .await
            .unwrap();

        let detail = store.get_detail(event_id).await.unwrap();
        assert_eq!(detail.creator.user_id, creator);
        assert_eq!(detail.number_attending, 2);
        assert_eq!(detail.attendees.len(), 1);
        assert_eq!(detail.attendees[0].user_id, guest);
        assert_eq!(detail.categories, vec!["social", "tech"]);
        let ids: Vec<i64> = detail.questions.iter().map(|q| q.question_id).collect();
        assert_eq!(ids, vec![popular, quiet]);
    }

    #[tokio::test]
    async fn partial_update_touches_only_provided_fields() {
        let db = testing::test_db().await;
        let creator = testing::seed_user(&db.pool, "ada", "ada@example.com").await;
        let store = EventStore::new(db.pool.clone());
        let event_id = store.create(creator, draft(1_000, 2_000, 5), 0).await.unwrap();

        store
            .update(
                event_id,
                creator,
                EventPatch {
                    name: Some("rustfest reloaded".into()),
                    max_attendees: Some(9),
                    ..EventPatch::default()
                },
            )
            .await
            .unwrap();

        let event = store.get(event_id).await.unwrap();
        assert_eq!(event.name, "rustfest reloaded");
        assert_eq!(event.max_attendees, 9);
        assert_eq!(event.description, "an evening of borrow checking");
        assert_eq!(event.start, 2_000);
        assert_eq!(event.close_registration, 1_000);
    }

    #[tokio::test]
    async fn update_rejects_merged_rows_that_break_invariants() {
        let db = testing::test_db().await;
        let creator = testing::seed_user(&db.pool, "ada", "ada@example.com").await;
        let store = EventStore::new(db.pool.clone());
        let event_id = store.create(creator, draft(1_000, 2_000, 5), 0).await.unwrap();

        // Moving the start below the stored close_registration must fail
        // even though close_registration itself is not in the patch.
        assert!(matches!(
            store
                .update(
                    event_id,
                    creator,
                    EventPatch {
                        start: Some(500),
                        ..EventPatch::default()
                    },
                )
                .await,
            Err(DomainError::Validation(_))
        ));
        let event = store.get(event_id).await.unwrap();
        assert_eq!(event.start, 2_000);
    }

    #[tokio::test]
    async fn update_by_non_creator_is_forbidden_and_leaves_the_row_alone() {
        let db = testing::test_db().await;
        let creator = testing::seed_user(&db.pool, "ada", "ada@example.com").await;
        let other = testing::seed_user(&db.pool, "eve", "eve@example.com").await;
        let store = EventStore::new(db.pool.clone());
        let event_id = store.create(creator, draft(1_000, 2_000, 5), 0).await.unwrap();

        assert!(matches!(
            store
                .update(
                    event_id,
                    other,
                    EventPatch {
                        name: Some("hijacked".into()),
                        ..EventPatch::default()
                    },
                )
                .await,
            Err(DomainError::Forbidden(_))
        ));
        assert_eq!(store.get(event_id).await.unwrap().name, "rustfest");
    }

    #[tokio::test]
    async fn search_filters_compose() {
        let db = testing::test_db().await;
        let creator = testing::seed_user(&db.pool, "ada", "ada@example.com").await;
        let guest = testing::seed_user(&db.pool, "bob", "bob@example.com").await;
        let store = EventStore::new(db.pool.clone());

        let mut gig = draft(1_000, 2_000, 5);
        gig.name = "warehouse gig".into();
        gig.categories = vec!["music".into()];
        let gig_id = store.create(creator, gig, 0).await.unwrap();

        let mut talk = draft(10_000, 20_000, 5);
        talk.name = "types talk".into();
        talk.categories = vec!["tech".into()];
        let talk_id = store.create(guest, talk, 0).await.unwrap();

        crate::registration::RegistrationService::new(db.pool.clone())
            .register(gig_id, guest, 500)
            .await
            .unwrap();

        // Free text.
        let page = store
            .search(
                SearchFilters {
                    query: Some("warehouse".into()),
                    ..SearchFilters::default()
                },
                None,
                5_000,
            )
            .await
            .unwrap();
        assert_eq!(page.events.len(), 1);
        assert_eq!(page.events[0].event_id, gig_id);

        // Category filter is any-of.
        let page = store
            .search(
                SearchFilters {
                    categories: vec!["tech".into(), "cooking".into()],
                    ..SearchFilters::default()
                },
                None,
                5_000,
            )
            .await
            .unwrap();
        assert_eq!(page.events.len(), 1);
        assert_eq!(page.events[0].event_id, talk_id);

        // At now=5000 the gig's window (1000) has passed: it is archive,
        // the talk is open.
        let open = store
            .search(
                SearchFilters {
                    status: Some(StatusFilter::Open),
                    ..SearchFilters::default()
                },
                None,
                5_000,
            )
            .await
            .unwrap();
        assert_eq!(open.events.len(), 1);
        assert_eq!(open.events[0].event_id, talk_id);

        let archive = store
            .search(
                SearchFilters {
                    status: Some(StatusFilter::Archive),
                    ..SearchFilters::default()
                },
                None,
                5_000,
            )
            .await
            .unwrap();
        assert_eq!(archive.events.len(), 1);
        assert_eq!(archive.events[0].event_id, gig_id);

        // Membership scopes.
        let mine = store
            .search(
                SearchFilters {
                    status: Some(StatusFilter::MyEvents),
                    ..SearchFilters::default()
                },
                Some(creator),
                5_000,
            )
            .await
            .unwrap();
        assert_eq!(mine.events.len(), 1);
        assert_eq!(mine.events[0].event_id, gig_id);

        let attending = store
            .search(
                SearchFilters {
                    status: Some(StatusFilter::Attending),
                    ..SearchFilters::default()
                },
                Some(guest),
                5_000,
            )
            .await
            .unwrap();
        assert_eq!(attending.events.len(), 1);
        assert_eq!(attending.events[0].event_id, gig_id);
    }

    #[tokio::test]
    async fn search_orders_by_start_descending_and_pages() {
        let db = testing::test_db().await;
        let creator = testing::seed_user(&db.pool, "ada", "ada@example.com").await;
        let store = EventStore::new(db.pool.clone());

        let early = store.create(creator, draft(1_000, 2_000, 5), 0).await.unwrap();
        let late = store.create(creator, draft(8_000, 9_000, 5), 0).await.unwrap();

        let page = store
            .search(SearchFilters::default(), None, 0)
            .await
            .unwrap();
        let ids: Vec<i64> = page.events.iter().map(|e| e.event_id).collect();
        assert_eq!(ids, vec![late, early]);
        assert_eq!(page.limit, DEFAULT_SEARCH_LIMIT);

        let second = store
            .search(
                SearchFilters {
                    limit: Some(1),
                    offset: Some(1),
                    ..SearchFilters::default()
                },
                None,
                0,
            )
            .await
            .unwrap();
        assert_eq!(second.events.len(), 1);
        assert_eq!(second.events[0].event_id, early);
    }

    #[tokio::test]
    async fn search_validates_window_and_membership_auth() {
        let db = testing::test_db().await;
        let store = EventStore::new(db.pool.clone());

        assert!(matches!(
            store
                .search(
                    SearchFilters {
                        limit: Some(0),
                        ..SearchFilters::default()
                    },
                    None,
                    0,
                )
                .await,
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            store
                .search(
                    SearchFilters {
                        limit: Some(101),
                        ..SearchFilters::default()
                    },
                    None,
                    0,
                )
                .await,
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            store
                .search(
                    SearchFilters {
                        offset: Some(-1),
                        ..SearchFilters::default()
                    },
                    None,
                    0,
                )
                .await,
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            store
                .search(
                    SearchFilters {
                        status: Some(StatusFilter::MyEvents),
                        ..SearchFilters::default()
                    },
                    None,
                    0,
                )
                .await,
            Err(DomainError::Unauthorized)
        ));
        assert!(matches!(
            store
                .search(
                    SearchFilters {
                        status: Some(StatusFilter::Attending),
                        ..SearchFilters::default()
                    },
                    None,
                    0,
                )
                .await,
            Err(DomainError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn purge_requires_archival_and_clears_every_table() {
        let db = testing::test_db().await;
        let creator = testing::seed_user(&db.pool, "ada", "ada@example.com").await;
        let guest = testing::seed_user(&db.pool, "bob", "bob@example.com").await;
        let store = EventStore::new(db.pool.clone());
        let event_id = store.create(creator, draft(1_000, 2_000, 5), 0).await.unwrap();

        crate::registration::RegistrationService::new(db.pool.clone())
            .register(event_id, guest, 500)
            .await
            .unwrap();
        testing::seed_question(&db.pool, event_id, guest, "still on?").await;

        assert!(matches!(
            store.purge(event_id, creator).await,
            Err(DomainError::Forbidden(_))
        ));
        crate::lifecycle::archive(&db.pool, event_id, creator)
            .await
            .unwrap();
        assert!(matches!(
            store.purge(event_id, guest).await,
            Err(DomainError::Forbidden(_))
        ));
        store.purge(event_id, creator).await.unwrap();

        assert!(matches!(
            store.get(event_id).await,
            Err(DomainError::NotFound(_))
        ));
        for table in ["attendees", "questions", "event_categories"] {
            let count: i64 =
                sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table} WHERE event_id = ?"))
                    .bind(event_id)
                    .fetch_one(&db.pool)
                    .await
                    .unwrap();
            assert_eq!(count, 0, "{table} not cleared");
        }
    }
}
