use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use gathr_core::questions::QuestionBoard;
use gathr_sdk::objects::MessageResponse;

use crate::api::ApiError;
use crate::api::extractors::AuthUser;
use crate::state::AppState;

/// `DELETE /question/{question_id}` — delete a question and its votes.
/// Allowed for the question author and the event creator.
pub(super) async fn delete_question(
    state: State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(question_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    QuestionBoard::new(state.db.clone())
        .remove(question_id, user_id)
        .await?;
    Ok(Json(MessageResponse {
        message: "question deleted".to_owned(),
    }))
}
