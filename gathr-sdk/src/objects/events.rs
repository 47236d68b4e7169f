//! Event request and response types.
//!
//! Timestamps are unix milliseconds throughout, matching the storage
//! format. `close_registration` must precede `start` at creation; archival
//! is an explicit state, not a sentinel timestamp.

use serde::{Deserialize, Serialize};

use super::Pagination;
use super::questions::QuestionSummary;
use super::users::UserSummary;

/// Lifecycle state of an event as exposed over the wire.
///
/// This is the API/DTO version. For the sqlx::Type version used by the
/// storage layer, see `gathr_core::entities::EventStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventState {
    Active,
    Archived,
}

/// Request body for creating an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub name: String,
    pub description: String,
    pub location: String,
    pub start: i64,
    pub close_registration: i64,
    pub max_attendees: i64,
    #[serde(default)]
    pub categories: Vec<String>,
}

/// Response returned after an event is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateEventResponse {
    pub event_id: i64,
}

/// Request body for a partial event update.
///
/// Absent fields are left untouched; present fields replace the stored
/// value. `categories`, when present, replaces the whole set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateEventRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_registration: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attendees: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
}

/// Full event detail, returned by `GET /events/{event_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetailResponse {
    pub event_id: i64,
    pub creator: UserSummary,
    pub name: String,
    pub description: String,
    pub location: String,
    pub start: i64,
    pub close_registration: i64,
    pub max_attendees: i64,
    pub state: EventState,
    pub categories: Vec<String>,
    /// Ledger rows plus the creator's implicit seat.
    pub number_attending: i64,
    pub attendees: Vec<UserSummary>,
    pub questions: Vec<QuestionSummary>,
}

/// One search hit: the event plus its creator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSummary {
    pub event_id: i64,
    pub name: String,
    pub description: String,
    pub location: String,
    pub start: i64,
    pub close_registration: i64,
    pub max_attendees: i64,
    pub state: EventState,
    pub creator: UserSummary,
}

/// Search status filter.
///
/// `MyEvents` and `Attending` are membership filters and require an
/// authenticated caller; `Open`/`Archive` classify by lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusFilter {
    Open,
    Archive,
    MyEvents,
    Attending,
}

/// Query parameters accepted by `GET /search`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free-text match over name, description and location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusFilter>,
    /// Comma-separated category list; an event matches if it carries any
    /// of them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
}

/// Response body of `GET /search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub events: Vec<EventSummary>,
    pub pagination: Pagination,
}

/// Response returned after a successful attendance registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationResponse {
    pub event_id: i64,
    pub user_id: i64,
    pub registered_at: i64,
}
