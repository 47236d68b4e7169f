//! Custom Axum extractors for request authentication.
//!
//! Provides:
//! - `AuthUser` — resolves the opaque `X-Authorization` session token to
//!   a user id; rejects the request when the token is missing or unknown.
//! - `MaybeAuthUser` — the same lookup, but a missing or unknown token
//!   yields an anonymous request instead of a rejection (used by
//!   `/search`).
//!
//! Session tokens are issued by the login endpoint and stored on the user
//! row; this layer only looks them up.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use kanau::processor::Processor;

use gathr_core::entities::users::GetUserBySession;
use gathr_core::framework::DatabaseProcessor;
use gathr_sdk::objects::AUTH_HEADER;

use crate::api::error_body;
use crate::state::AppState;

/// An authenticated request actor.
pub struct AuthUser(pub i64);

/// Errors that can occur during session-token authentication.
#[derive(Debug)]
pub enum AuthRejection {
    MissingHeader,
    InvalidHeader,
    UnknownToken,
    Database(sqlx::Error),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            AuthRejection::MissingHeader => {
                (StatusCode::UNAUTHORIZED, error_body("authentication required")).into_response()
            }
            AuthRejection::InvalidHeader => (
                StatusCode::UNAUTHORIZED,
                error_body("invalid X-Authorization header"),
            )
                .into_response(),
            AuthRejection::UnknownToken => {
                (StatusCode::UNAUTHORIZED, error_body("invalid session token")).into_response()
            }
            AuthRejection::Database(e) => {
                tracing::error!(error = %e, "session lookup failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_body("internal server error"),
                )
                    .into_response()
            }
        }
    }
}

async fn resolve_token(state: &AppState, token: &str) -> Result<Option<i64>, sqlx::Error> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };
    processor
        .process(GetUserBySession {
            token: token.to_owned(),
        })
        .await
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTH_HEADER)
            .ok_or(AuthRejection::MissingHeader)?
            .to_str()
            .map_err(|_| AuthRejection::InvalidHeader)?;

        match resolve_token(state, token).await {
            Ok(Some(user_id)) => Ok(AuthUser(user_id)),
            Ok(None) => Err(AuthRejection::UnknownToken),
            Err(e) => Err(AuthRejection::Database(e)),
        }
    }
}

/// An optionally authenticated request actor.
///
/// A missing or unknown token degrades to `None` rather than rejecting;
/// only storage failures surface as errors.
pub struct MaybeAuthUser(pub Option<i64>);

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(AUTH_HEADER) else {
            return Ok(MaybeAuthUser(None));
        };
        let Ok(token) = header.to_str() else {
            return Ok(MaybeAuthUser(None));
        };
        match resolve_token(state, token).await {
            Ok(user_id) => Ok(MaybeAuthUser(user_id)),
            Err(e) => Err(AuthRejection::Database(e)),
        }
    }
}
