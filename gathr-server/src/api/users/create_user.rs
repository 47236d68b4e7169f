use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use kanau::processor::Processor;

use gathr_core::entities::users::InsertUser;
use gathr_core::framework::DatabaseProcessor;
use gathr_sdk::objects::users::{CreateUserRequest, CreateUserResponse};

use super::{UsersApiError, hash_password};
use crate::state::AppState;

const MIN_PASSWORD_LEN: usize = 8;
const MAX_PASSWORD_LEN: usize = 64;

/// `POST /users` — create a new account.
pub(super) async fn create_user(
    state: State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, UsersApiError> {
    let first_name = body.first_name.trim();
    let last_name = body.last_name.trim();
    let email = body.email.trim();

    if first_name.is_empty() {
        return Err(UsersApiError::Validation(
            "first_name must not be empty".to_owned(),
        ));
    }
    if last_name.is_empty() {
        return Err(UsersApiError::Validation(
            "last_name must not be empty".to_owned(),
        ));
    }
    if !is_plausible_email(email) {
        return Err(UsersApiError::Validation(
            "email must be a valid address".to_owned(),
        ));
    }
    if !(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&body.password.len()) {
        return Err(UsersApiError::Validation(format!(
            "password must be between {MIN_PASSWORD_LEN} and {MAX_PASSWORD_LEN} characters"
        )));
    }

    let password_hash = hash_password(&body.password)?;

    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };
    let result = processor
        .process(InsertUser {
            first_name: first_name.to_owned(),
            last_name: last_name.to_owned(),
            email: email.to_owned(),
            password_hash,
        })
        .await;

    match result {
        Ok(user_id) => Ok((StatusCode::CREATED, Json(CreateUserResponse { user_id }))),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            Err(UsersApiError::EmailTaken)
        }
        Err(e) => Err(UsersApiError::Database(e)),
    }
}

/// Cheap structural check; real deliverability is out of scope.
fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}
