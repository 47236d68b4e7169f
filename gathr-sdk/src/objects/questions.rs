//! Question-board request and response types.

use serde::{Deserialize, Serialize};

/// Request body for asking a question on an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskQuestionRequest {
    pub question: String,
}

/// Response returned after a question is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskQuestionResponse {
    pub question_id: i64,
}

/// A question as embedded in event details, ordered by vote count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSummary {
    pub question_id: i64,
    pub question: String,
    pub asked_by: i64,
    pub votes: i64,
    pub created_at: i64,
}
