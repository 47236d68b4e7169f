use axum::{Json, extract::State, response::IntoResponse};
use kanau::processor::Processor;

use gathr_core::entities::users::SetSessionToken;
use gathr_core::framework::DatabaseProcessor;
use gathr_sdk::objects::MessageResponse;

use super::UsersApiError;
use crate::api::extractors::AuthUser;
use crate::state::AppState;

/// `POST /logout` — clear the caller's session token.
pub(super) async fn logout(
    state: State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<impl IntoResponse, UsersApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };
    processor
        .process(SetSessionToken {
            user_id,
            token: None,
        })
        .await
        .map_err(UsersApiError::Database)?;

    Ok(Json(MessageResponse {
        message: "successfully logged out".to_owned(),
    }))
}
