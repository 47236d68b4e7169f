//! Event handlers.
//!
//! # Endpoints
//!
//! - `POST   /events`            – create an event
//! - `GET    /events/{event_id}` – full event detail
//! - `PATCH  /events/{event_id}` – partial update (creator only)
//! - `POST   /events/{event_id}` – register attendance
//! - `DELETE /events/{event_id}` – archive (creator only)
//! - `GET    /search`            – search events

use axum::{
    Router,
    routing::{get, post},
};

use gathr_core::store::EventDetail;
use gathr_sdk::objects::events::EventDetailResponse;

use crate::state::AppState;

mod archive_event;
mod create_event;
mod get_event;
mod register_attendance;
mod search_events;
mod update_event;

/// Build the events router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", post(create_event::create_event))
        .route(
            "/events/{event_id}",
            get(get_event::get_event)
                .patch(update_event::update_event)
                .post(register_attendance::register_attendance)
                .delete(archive_event::archive_event),
        )
        .route("/search", get(search_events::search_events))
}

/// Convert the store's `EventDetail` (DB models) into the API model.
fn detail_to_response(detail: EventDetail) -> EventDetailResponse {
    EventDetailResponse {
        event_id: detail.event.event_id,
        creator: detail.creator.into(),
        name: detail.event.name,
        description: detail.event.description,
        location: detail.event.location,
        start: detail.event.start,
        close_registration: detail.event.close_registration,
        max_attendees: detail.event.max_attendees,
        state: detail.event.status.into(),
        categories: detail.categories,
        number_attending: detail.number_attending,
        attendees: detail.attendees.into_iter().map(Into::into).collect(),
        questions: detail.questions.into_iter().map(Into::into).collect(),
    }
}
