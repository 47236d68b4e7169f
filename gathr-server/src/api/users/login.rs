use axum::{Json, extract::State, response::IntoResponse};
use kanau::processor::Processor;

use gathr_core::entities::users::{GetUserByEmail, SetSessionToken};
use gathr_core::framework::DatabaseProcessor;
use gathr_sdk::objects::users::{LoginRequest, LoginResponse};

use super::{UsersApiError, new_session_token, verify_password};
use crate::state::AppState;

/// `POST /login` — exchange credentials for a session token.
///
/// A fresh token replaces any previous one, so logging in again
/// invalidates older sessions.
pub(super) async fn login(
    state: State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, UsersApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };

    let user = processor
        .process(GetUserByEmail {
            email: body.email.trim().to_owned(),
        })
        .await
        .map_err(UsersApiError::Database)?
        .ok_or(UsersApiError::BadCredentials)?;

    if !verify_password(&body.password, &user.password_hash)? {
        return Err(UsersApiError::BadCredentials);
    }

    let session_token = new_session_token();
    processor
        .process(SetSessionToken {
            user_id: user.user_id,
            token: Some(session_token.clone()),
        })
        .await
        .map_err(UsersApiError::Database)?;

    Ok(Json(LoginResponse {
        user_id: user.user_id,
        session_token,
    }))
}
