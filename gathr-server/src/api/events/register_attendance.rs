use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use gathr_core::registration::RegistrationService;
use gathr_sdk::objects::events::RegistrationResponse;

use crate::api::extractors::AuthUser;
use crate::api::{ApiError, now_ms};
use crate::state::AppState;

/// `POST /events/{event_id}` — register the caller as an attendee.
///
/// The seat reservation is atomic in the storage layer; under concurrent
/// requests for the last seat exactly one caller gets a 201.
pub(super) async fn register_attendance(
    state: State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(event_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let record = RegistrationService::new(state.db.clone())
        .register(event_id, user_id, now_ms())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegistrationResponse {
            event_id: record.event_id,
            user_id: record.user_id,
            registered_at: record.registered_at,
        }),
    ))
}
