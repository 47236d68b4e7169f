use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use gathr_core::store::EventStore;

use super::detail_to_response;
use crate::api::ApiError;
use crate::api::extractors::AuthUser;
use crate::state::AppState;

/// `GET /events/{event_id}` — full event detail, including the creator,
/// attendance and the question list (most-voted first).
pub(super) async fn get_event(
    state: State<AppState>,
    _auth: AuthUser,
    Path(event_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = EventStore::new(state.db.clone()).get_detail(event_id).await?;
    Ok(Json(detail_to_response(detail)))
}
