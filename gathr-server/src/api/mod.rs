//! HTTP API: routers, shared error mapping and the wall clock.

pub mod events;
pub mod extractors;
pub mod questions;
pub mod users;

use axum::{Json, Router, http::StatusCode, response::IntoResponse};
use gathr_core::error::DomainError;
use gathr_sdk::objects::ErrorBody;

use crate::state::AppState;

/// Assemble all resource routers.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(users::router())
        .merge(events::router())
        .merge(questions::router())
}

/// Wall clock in the unit the domain speaks: unix milliseconds.
pub(crate) fn now_ms() -> i64 {
    (time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

pub(crate) fn error_body(message: impl Into<String>) -> Json<ErrorBody> {
    Json(ErrorBody {
        error_message: message.into(),
    })
}

/// Domain outcomes mapped onto the HTTP taxonomy.
///
/// All denial kinds (forbidden, closed window, capacity, duplicate
/// registration) share 403; the body message distinguishes them.
pub(crate) struct ApiError(DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::Forbidden(_)
            | DomainError::RegistrationClosed
            | DomainError::Capacity
            | DomainError::AlreadyRegistered => StatusCode::FORBIDDEN,
            DomainError::Unauthorized => StatusCode::UNAUTHORIZED,
            DomainError::Validation(_) => StatusCode::BAD_REQUEST,
            DomainError::Storage(e) => {
                tracing::error!(error = %e, "storage failure");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_body("internal server error"),
                )
                    .into_response();
            }
        };
        (status, error_body(self.0.to_string())).into_response()
    }
}
