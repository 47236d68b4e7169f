//! Typed HTTP client for the Gathr server.
//!
//! All authenticated requests carry the opaque session token from
//! [`LoginResponse`](crate::objects::users::LoginResponse) in the
//! `X-Authorization` header.

mod events;
mod users;

use reqwest::{Client, RequestBuilder};
use url::Url;

use crate::objects::{AUTH_HEADER, ErrorBody};

/// Errors returned by [`GathrClient`] calls.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("server returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("endpoint requires authentication but no session token is set")]
    MissingToken,
}

/// Typed HTTP client for the Gathr API.
///
/// Create one with [`GathrClient::new`], then attach the session token from
/// a login via [`GathrClient::with_session_token`] to call authenticated
/// endpoints.
#[derive(Debug, Clone)]
pub struct GathrClient {
    http: Client,
    base_url: Url,
    token: Option<String>,
}

impl GathrClient {
    /// Create a new client against the given server root URL.
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
            token: None,
        }
    }

    /// Replace the default `reqwest::Client` with a custom one (e.g. to
    /// configure timeouts or a proxy).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// Attach a session token for authenticated endpoints.
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Forget the session token (e.g. after logout).
    pub fn clear_session_token(&mut self) {
        self.token = None;
    }

    pub(crate) fn url(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base_url.join(path)?)
    }

    pub(crate) fn authed(&self, builder: RequestBuilder) -> Result<RequestBuilder, ClientError> {
        let token = self.token.as_deref().ok_or(ClientError::MissingToken)?;
        Ok(builder.header(AUTH_HEADER, token))
    }
}

/// Decode a successful body or lift the server's error envelope.
pub(crate) async fn parse_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json::<T>().await?);
    }
    let message = resp
        .json::<ErrorBody>()
        .await
        .map(|body| body.error_message)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_owned()
        });
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}
