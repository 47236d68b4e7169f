//! Account and session endpoints.

use super::{ClientError, GathrClient, parse_response};
use crate::objects::MessageResponse;
use crate::objects::users::{CreateUserRequest, CreateUserResponse, LoginRequest, LoginResponse};

impl GathrClient {
    /// `POST /users` – create a new account.
    pub async fn create_account(
        &self,
        request: CreateUserRequest,
    ) -> Result<CreateUserResponse, ClientError> {
        let resp = self
            .http
            .post(self.url("/users")?)
            .json(&request)
            .send()
            .await?;
        parse_response(resp).await
    }

    /// `POST /login` – exchange credentials for a session token.
    ///
    /// The token is *not* stored on the client automatically; pass it to
    /// [`GathrClient::with_session_token`].
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, ClientError> {
        let resp = self
            .http
            .post(self.url("/login")?)
            .json(&request)
            .send()
            .await?;
        parse_response(resp).await
    }

    /// `POST /logout` – invalidate the current session token.
    pub async fn logout(&self) -> Result<MessageResponse, ClientError> {
        let resp = self
            .authed(self.http.post(self.url("/logout")?))?
            .send()
            .await?;
        parse_response(resp).await
    }
}
