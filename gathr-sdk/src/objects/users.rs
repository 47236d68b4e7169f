//! Account and session request/response types.

use serde::{Deserialize, Serialize};

/// Request body for creating a new account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Response returned after an account is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUserResponse {
    pub user_id: i64,
}

/// Request body for logging in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response returned after a successful login.
///
/// The `session_token` must be sent back in the `X-Authorization` header
/// on every authenticated request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user_id: i64,
    pub session_token: String,
}

/// Public view of a user, embedded in event details and search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}
