//! Event and question-board endpoints.

use super::{ClientError, GathrClient, parse_response};
use crate::objects::MessageResponse;
use crate::objects::events::{
    CreateEventRequest, CreateEventResponse, EventDetailResponse, RegistrationResponse,
    SearchQuery, SearchResponse, UpdateEventRequest,
};
use crate::objects::questions::{AskQuestionRequest, AskQuestionResponse};

impl GathrClient {
    /// `POST /events` – create a new event.
    pub async fn create_event(
        &self,
        request: CreateEventRequest,
    ) -> Result<CreateEventResponse, ClientError> {
        let resp = self
            .authed(self.http.post(self.url("/events")?))?
            .json(&request)
            .send()
            .await?;
        parse_response(resp).await
    }

    /// `GET /events/{event_id}` – fetch full event detail.
    pub async fn get_event(&self, event_id: i64) -> Result<EventDetailResponse, ClientError> {
        let resp = self
            .authed(self.http.get(self.url(&format!("/events/{event_id}"))?))?
            .send()
            .await?;
        parse_response(resp).await
    }

    /// `PATCH /events/{event_id}` – partially update an event (creator only).
    pub async fn update_event(
        &self,
        event_id: i64,
        patch: UpdateEventRequest,
    ) -> Result<MessageResponse, ClientError> {
        let resp = self
            .authed(self.http.patch(self.url(&format!("/events/{event_id}"))?))?
            .json(&patch)
            .send()
            .await?;
        parse_response(resp).await
    }

    /// `POST /events/{event_id}` – register attendance for the current user.
    pub async fn register(&self, event_id: i64) -> Result<RegistrationResponse, ClientError> {
        let resp = self
            .authed(self.http.post(self.url(&format!("/events/{event_id}"))?))?
            .send()
            .await?;
        parse_response(resp).await
    }

    /// `DELETE /events/{event_id}` – archive an event (creator only).
    pub async fn archive_event(&self, event_id: i64) -> Result<MessageResponse, ClientError> {
        let resp = self
            .authed(
                self.http
                    .delete(self.url(&format!("/events/{event_id}"))?),
            )?
            .send()
            .await?;
        parse_response(resp).await
    }

    /// `GET /search` – search events.
    ///
    /// Works without a session token, but the `MY_EVENTS` and `ATTENDING`
    /// status filters require one.
    pub async fn search(&self, query: SearchQuery) -> Result<SearchResponse, ClientError> {
        let mut builder = self.http.get(self.url("/search")?).query(&query);
        if let Some(token) = self.token.as_deref() {
            builder = builder.header(crate::objects::AUTH_HEADER, token);
        }
        let resp = builder.send().await?;
        parse_response(resp).await
    }

    /// `POST /events/{event_id}/question` – ask a question on an event.
    pub async fn ask_question(
        &self,
        event_id: i64,
        question: impl Into<String>,
    ) -> Result<AskQuestionResponse, ClientError> {
        let request = AskQuestionRequest {
            question: question.into(),
        };
        let resp = self
            .authed(
                self.http
                    .post(self.url(&format!("/events/{event_id}/question"))?),
            )?
            .json(&request)
            .send()
            .await?;
        parse_response(resp).await
    }

    /// `DELETE /question/{question_id}` – delete a question (author or
    /// event creator).
    pub async fn delete_question(&self, question_id: i64) -> Result<MessageResponse, ClientError> {
        let resp = self
            .authed(
                self.http
                    .delete(self.url(&format!("/question/{question_id}"))?),
            )?
            .send()
            .await?;
        parse_response(resp).await
    }

    /// `POST /question/{question_id}/vote` – upvote a question.
    pub async fn upvote_question(&self, question_id: i64) -> Result<MessageResponse, ClientError> {
        let resp = self
            .authed(
                self.http
                    .post(self.url(&format!("/question/{question_id}/vote"))?),
            )?
            .send()
            .await?;
        parse_response(resp).await
    }

    /// `DELETE /question/{question_id}/vote` – retract a previous upvote.
    pub async fn retract_vote(&self, question_id: i64) -> Result<MessageResponse, ClientError> {
        let resp = self
            .authed(
                self.http
                    .delete(self.url(&format!("/question/{question_id}/vote"))?),
            )?
            .send()
            .await?;
        parse_response(resp).await
    }
}
