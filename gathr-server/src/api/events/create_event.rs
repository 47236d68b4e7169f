use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use gathr_core::store::{EventDraft, EventStore};
use gathr_sdk::objects::events::{CreateEventRequest, CreateEventResponse};

use crate::api::extractors::AuthUser;
use crate::api::{ApiError, now_ms};
use crate::state::AppState;

/// `POST /events` — create a new event owned by the caller.
pub(super) async fn create_event(
    state: State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let store = EventStore::new(state.db.clone());
    let event_id = store
        .create(
            user_id,
            EventDraft {
                name: body.name,
                description: body.description,
                location: body.location,
                start: body.start,
                close_registration: body.close_registration,
                max_attendees: body.max_attendees,
                categories: body.categories,
            },
            now_ms(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(CreateEventResponse { event_id })))
}
