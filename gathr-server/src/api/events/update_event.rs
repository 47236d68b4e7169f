use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use gathr_core::store::{EventPatch, EventStore};
use gathr_sdk::objects::MessageResponse;
use gathr_sdk::objects::events::UpdateEventRequest;

use crate::api::ApiError;
use crate::api::extractors::AuthUser;
use crate::state::AppState;

/// `PATCH /events/{event_id}` — partial update, creator only. Fields
/// absent from the body keep their stored values.
pub(super) async fn update_event(
    state: State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(event_id): Path<i64>,
    Json(body): Json<UpdateEventRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let store = EventStore::new(state.db.clone());
    store
        .update(
            event_id,
            user_id,
            EventPatch {
                name: body.name,
                description: body.description,
                location: body.location,
                start: body.start,
                close_registration: body.close_registration,
                max_attendees: body.max_attendees,
                categories: body.categories,
            },
        )
        .await?;

    Ok(Json(MessageResponse {
        message: "event updated".to_owned(),
    }))
}
