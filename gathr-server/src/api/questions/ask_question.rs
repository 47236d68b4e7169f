use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use gathr_core::questions::QuestionBoard;
use gathr_sdk::objects::questions::{AskQuestionRequest, AskQuestionResponse};

use crate::api::extractors::AuthUser;
use crate::api::{ApiError, now_ms};
use crate::state::AppState;

/// `POST /events/{event_id}/question` — ask a question on an event.
/// Open to the event creator and registered attendees.
pub(super) async fn ask_question(
    state: State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(event_id): Path<i64>,
    Json(body): Json<AskQuestionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let question_id = QuestionBoard::new(state.db.clone())
        .ask(event_id, user_id, &body.question, now_ms())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AskQuestionResponse { question_id }),
    ))
}
