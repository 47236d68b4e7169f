use kanau::processor::Processor;

use crate::entities::{EventStatus, UnixMillis};
use crate::framework::DatabaseProcessor;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Event {
    pub event_id: i64,
    pub creator_id: i64,
    pub name: String,
    pub description: String,
    pub location: String,
    pub start: UnixMillis,
    pub close_registration: UnixMillis,
    pub max_attendees: i64,
    pub status: EventStatus,
    pub created_at: UnixMillis,
}

const EVENT_COLUMNS: &str = "event_id, creator_id, name, description, location, start, \
                             close_registration, max_attendees, status, created_at";

#[derive(Debug, Clone, Copy)]
pub struct GetEventById {
    pub event_id: i64,
}

impl Processor<GetEventById> for DatabaseProcessor {
    type Output = Option<Event>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetEventById")]
    async fn process(&self, query: GetEventById) -> Result<Option<Event>, sqlx::Error> {
        sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE event_id = ?"
        ))
        .bind(query.event_id)
        .fetch_optional(&self.pool)
        .await
    }
}

/// Column values for a new event row. Validation happens in the store
/// before this is built.
#[derive(Debug, Clone)]
pub struct EventRowInsert {
    pub creator_id: i64,
    pub name: String,
    pub description: String,
    pub location: String,
    pub start: UnixMillis,
    pub close_registration: UnixMillis,
    pub max_attendees: i64,
    pub created_at: UnixMillis,
}

/// Replacement column values for an existing row, already merged with the
/// stored state by the store's partial-update path.
#[derive(Debug, Clone)]
pub struct EventRowUpdate {
    pub event_id: i64,
    pub name: String,
    pub description: String,
    pub location: String,
    pub start: UnixMillis,
    pub close_registration: UnixMillis,
    pub max_attendees: i64,
}

impl Event {
    pub async fn insert_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        insert: &EventRowInsert,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO events \
                 (creator_id, name, description, location, start, close_registration, \
                  max_attendees, status, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(insert.creator_id)
        .bind(&insert.name)
        .bind(&insert.description)
        .bind(&insert.location)
        .bind(insert.start)
        .bind(insert.close_registration)
        .bind(insert.max_attendees)
        .bind(EventStatus::Active)
        .bind(insert.created_at)
        .execute(&mut **tx)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn update_row_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        update: &EventRowUpdate,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE events SET name = ?, description = ?, location = ?, start = ?, \
                 close_registration = ?, max_attendees = ? \
             WHERE event_id = ?",
        )
        .bind(&update.name)
        .bind(&update.description)
        .bind(&update.location)
        .bind(update.start)
        .bind(update.close_registration)
        .bind(update.max_attendees)
        .bind(update.event_id)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected())
    }

    /// Replace the category set of an event.
    pub async fn replace_categories_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        event_id: i64,
        categories: &[String],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM event_categories WHERE event_id = ?")
            .bind(event_id)
            .execute(&mut **tx)
            .await?;
        for category in categories {
            sqlx::query(
                "INSERT OR IGNORE INTO event_categories (event_id, category) VALUES (?, ?)",
            )
            .bind(event_id)
            .bind(category)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}

/// Flip an event into its terminal archived state. The statement is
/// naturally idempotent; re-archiving affects the row without changing it.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveEvent {
    pub event_id: i64,
}

impl Processor<ArchiveEvent> for DatabaseProcessor {
    type Output = u64;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ArchiveEvent")]
    async fn process(&self, update: ArchiveEvent) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE events SET status = ? WHERE event_id = ?")
            .bind(EventStatus::Archived)
            .bind(update.event_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GetEventCategories {
    pub event_id: i64,
}

impl Processor<GetEventCategories> for DatabaseProcessor {
    type Output = Vec<String>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetEventCategories")]
    async fn process(&self, query: GetEventCategories) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT category FROM event_categories WHERE event_id = ? ORDER BY category",
        )
        .bind(query.event_id)
        .fetch_all(&self.pool)
        .await
    }
}

/// Which slice of the event catalogue a search looks at.
///
/// Membership scopes carry their (already authenticated) actor so the
/// query layer never sees an unchecked optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    Any,
    /// Active and still inside the registration window.
    Open,
    /// Explicitly archived, or with a registration window in the past.
    Archive,
    MyEvents(i64),
    Attending(i64),
}

/// Search over events joined with their creators. The WHERE clause is
/// assembled dynamically; `limit`/`offset` are validated upstream.
#[derive(Debug, Clone)]
pub struct SearchEvents {
    pub text: Option<String>,
    pub categories: Vec<String>,
    pub scope: SearchScope,
    pub now: UnixMillis,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventSearchRow {
    pub event_id: i64,
    pub name: String,
    pub description: String,
    pub location: String,
    pub start: UnixMillis,
    pub close_registration: UnixMillis,
    pub max_attendees: i64,
    pub status: EventStatus,
    pub creator_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<EventSearchRow> for gathr_sdk::objects::events::EventSummary {
    fn from(row: EventSearchRow) -> Self {
        Self {
            event_id: row.event_id,
            name: row.name,
            description: row.description,
            location: row.location,
            start: row.start,
            close_registration: row.close_registration,
            max_attendees: row.max_attendees,
            state: row.status.into(),
            creator: gathr_sdk::objects::users::UserSummary {
                user_id: row.creator_id,
                first_name: row.first_name,
                last_name: row.last_name,
                email: row.email,
            },
        }
    }
}

impl Processor<SearchEvents> for DatabaseProcessor {
    type Output = Vec<EventSearchRow>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:SearchEvents")]
    async fn process(&self, search: SearchEvents) -> Result<Vec<EventSearchRow>, sqlx::Error> {
        let mut builder = sqlx::QueryBuilder::<sqlx::Sqlite>::new(
            "SELECT e.event_id, e.name, e.description, e.location, e.start, \
                 e.close_registration, e.max_attendees, e.status, \
                 u.user_id AS creator_id, u.first_name, u.last_name, u.email \
             FROM events e JOIN users u ON e.creator_id = u.user_id \
             WHERE 1 = 1",
        );

        if let Some(text) = search.text.as_deref().filter(|text| !text.is_empty()) {
            let pattern = format!("%{text}%");
            builder
                .push(" AND (e.name LIKE ")
                .push_bind(pattern.clone())
                .push(" OR e.description LIKE ")
                .push_bind(pattern.clone())
                .push(" OR e.location LIKE ")
                .push_bind(pattern)
                .push(")");
        }

        if !search.categories.is_empty() {
            builder.push(
                " AND EXISTS (SELECT 1 FROM event_categories c \
                 WHERE c.event_id = e.event_id AND c.category IN (",
            );
            let mut separated = builder.separated(", ");
            for category in &search.categories {
                separated.push_bind(category.clone());
            }
            builder.push("))");
        }

        match search.scope {
            SearchScope::Any => {}
            SearchScope::Open => {
                builder
                    .push(" AND e.status = ")
                    .push_bind(EventStatus::Active)
                    .push(" AND e.close_registration >= ")
                    .push_bind(search.now);
            }
            SearchScope::Archive => {
                builder
                    .push(" AND (e.status = ")
                    .push_bind(EventStatus::Archived)
                    .push(" OR e.close_registration < ")
                    .push_bind(search.now)
                    .push(")");
            }
            SearchScope::MyEvents(actor_id) => {
                builder.push(" AND e.creator_id = ").push_bind(actor_id);
            }
            SearchScope::Attending(actor_id) => {
                builder
                    .push(" AND EXISTS (SELECT 1 FROM attendees a \
                           WHERE a.event_id = e.event_id AND a.user_id = ")
                    .push_bind(actor_id)
                    .push(")");
            }
        }

        builder
            .push(" ORDER BY e.start DESC LIMIT ")
            .push_bind(search.limit)
            .push(" OFFSET ")
            .push_bind(search.offset);

        builder
            .build_query_as::<EventSearchRow>()
            .fetch_all(&self.pool)
            .await
    }
}
