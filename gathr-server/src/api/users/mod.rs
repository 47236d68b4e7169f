//! Account and session handlers.
//!
//! # Endpoints
//!
//! - `POST /users`  – create an account
//! - `POST /login`  – exchange credentials for a session token
//! - `POST /logout` – invalidate the current session token

use axum::{
    Router,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};

use crate::api::error_body;
use crate::state::AppState;

mod create_user;
mod login;
mod logout;

/// Build the users/session router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user::create_user))
        .route("/login", post(login::login))
        .route("/logout", post(logout::logout))
}

/// Errors that can occur in account and session handlers.
#[derive(Debug)]
pub(super) enum UsersApiError {
    /// A database query failed.
    Database(sqlx::Error),
    /// Malformed account data.
    Validation(String),
    /// The email is already registered.
    EmailTaken,
    /// Unknown email or wrong password.
    BadCredentials,
    /// Password hashing or verification failed internally.
    Credential,
}

impl IntoResponse for UsersApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            UsersApiError::Database(e) => {
                tracing::error!(error = %e, "users API database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_body("internal server error"),
                )
                    .into_response()
            }
            UsersApiError::Validation(message) => {
                (StatusCode::BAD_REQUEST, error_body(message)).into_response()
            }
            UsersApiError::EmailTaken => {
                (StatusCode::BAD_REQUEST, error_body("email already in use")).into_response()
            }
            UsersApiError::BadCredentials => (
                StatusCode::BAD_REQUEST,
                error_body("invalid email or password"),
            )
                .into_response(),
            UsersApiError::Credential => {
                tracing::error!("password hashing failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_body("internal server error"),
                )
                    .into_response()
            }
        }
    }
}

/// Hash a password into the argon2 PHC string format.
pub(super) fn hash_password(plaintext: &str) -> Result<String, UsersApiError> {
    use argon2::{
        Argon2, PasswordHasher,
        password_hash::{SaltString, rand_core::OsRng},
    };

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| UsersApiError::Credential)
}

/// Check a password against a stored PHC hash.
pub(super) fn verify_password(plaintext: &str, stored: &str) -> Result<bool, UsersApiError> {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};

    let parsed = PasswordHash::new(stored).map_err(|_| UsersApiError::Credential)?;
    Ok(Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok())
}

/// Mint a fresh opaque session token.
pub(super) fn new_session_token() -> String {
    use rand::RngCore;

    let mut bytes = [0u8; 24];
    rand::rng().fill_bytes(&mut bytes);
    fast32::base32::RFC4648_NOPAD.encode(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("hunter2hunter2").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("hunter2hunter2", &hash).unwrap());
        assert!(!verify_password("wrong-password", &hash).unwrap());
    }

    #[test]
    fn test_session_tokens_are_distinct() {
        let a = new_session_token();
        let b = new_session_token();
        assert_ne!(a, b);
        assert!(a.len() > 30);
    }
}
