use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use gathr_core::lifecycle;
use gathr_sdk::objects::MessageResponse;

use crate::api::ApiError;
use crate::api::extractors::AuthUser;
use crate::state::AppState;

/// `DELETE /events/{event_id}` — archive an event (creator only).
///
/// Soft delete: registration closes permanently, history stays. Archiving
/// an already archived event succeeds again.
pub(super) async fn archive_event(
    state: State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(event_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    lifecycle::archive(&state.db, event_id, user_id).await?;
    Ok(Json(MessageResponse {
        message: "event archived".to_owned(),
    }))
}
