pub mod attendees;
pub mod events;
pub mod questions;
pub mod users;

use gathr_sdk::objects::events::EventState;

/// Unix timestamp in milliseconds, the time unit of the whole API.
pub type UnixMillis = i64;

/// Event lifecycle state for database operations.
///
/// This is the sqlx::Type version, stored as lowercase text. For API/DTO
/// use, see `gathr_sdk::objects::events::EventState`. An explicit state
/// column replaces the original system's sentinel encoding (a magic
/// `close_registration` value standing in for "archived").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
pub enum EventStatus {
    Active,
    Archived,
}

impl From<EventStatus> for EventState {
    fn from(value: EventStatus) -> Self {
        match value {
            EventStatus::Active => EventState::Active,
            EventStatus::Archived => EventState::Archived,
        }
    }
}

impl From<EventState> for EventStatus {
    fn from(value: EventState) -> Self {
        match value {
            EventState::Active => EventStatus::Active,
            EventState::Archived => EventStatus::Archived,
        }
    }
}
