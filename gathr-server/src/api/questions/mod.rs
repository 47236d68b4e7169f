//! Question-board handlers.
//!
//! # Endpoints
//!
//! - `POST   /events/{event_id}/question` – ask a question
//! - `DELETE /question/{question_id}`      – delete (author or event creator)
//! - `POST   /question/{question_id}/vote` – upvote, once per user
//! - `DELETE /question/{question_id}/vote` – retract an upvote

use axum::{
    Router,
    routing::{delete, post},
};

use crate::state::AppState;

mod ask_question;
mod delete_question;
mod vote_question;

/// Build the question-board router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/events/{event_id}/question",
            post(ask_question::ask_question),
        )
        .route(
            "/question/{question_id}",
            delete(delete_question::delete_question),
        )
        .route(
            "/question/{question_id}/vote",
            post(vote_question::cast_vote).delete(vote_question::retract_vote),
        )
}
