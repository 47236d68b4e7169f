pub mod events;
pub mod questions;
pub mod users;

use serde::{Deserialize, Serialize};

/// Header carrying the opaque session token issued at login.
pub const AUTH_HEADER: &str = "X-Authorization";

/// Error envelope returned by every failing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error_message: String,
}

/// Echo of the paging window applied to a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
    pub total: i64,
}

/// Generic acknowledgement body for endpoints with no richer payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
