use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use gathr_core::questions::QuestionBoard;
use gathr_sdk::objects::MessageResponse;

use crate::api::extractors::AuthUser;
use crate::api::{ApiError, now_ms};
use crate::state::AppState;

/// `POST /question/{question_id}/vote` — upvote a question, at most once
/// per user.
pub(super) async fn cast_vote(
    state: State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(question_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    QuestionBoard::new(state.db.clone())
        .upvote(question_id, user_id, now_ms())
        .await?;
    Ok(Json(MessageResponse {
        message: "vote recorded".to_owned(),
    }))
}

/// `DELETE /question/{question_id}/vote` — retract a previous upvote.
pub(super) async fn retract_vote(
    state: State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(question_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    QuestionBoard::new(state.db.clone())
        .retract_vote(question_id, user_id)
        .await?;
    Ok(Json(MessageResponse {
        message: "vote removed".to_owned(),
    }))
}
