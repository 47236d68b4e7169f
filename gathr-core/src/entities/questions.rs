use kanau::processor::Processor;

use crate::entities::UnixMillis;
use crate::framework::DatabaseProcessor;
use crate::membership::MembershipTable;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Question {
    pub question_id: i64,
    pub event_id: i64,
    pub asked_by: i64,
    pub question: String,
    /// Denormalized vote counter, kept in step with the vote table inside
    /// the same transaction.
    pub votes: i64,
    pub created_at: UnixMillis,
}

impl From<Question> for gathr_sdk::objects::questions::QuestionSummary {
    fn from(value: Question) -> Self {
        Self {
            question_id: value.question_id,
            question: value.question,
            asked_by: value.asked_by,
            votes: value.votes,
            created_at: value.created_at,
        }
    }
}

/// Vote-table descriptor for the membership primitive. Same shape as the
/// attendance ledger, without a capacity bound.
pub const VOTE_MEMBERSHIP: MembershipTable = MembershipTable {
    member_table: "votes",
    parent_col: "question_id",
    actor_col: "voter_id",
    recorded_col: "voted_at",
};

#[derive(Debug, Clone)]
pub struct InsertQuestion {
    pub event_id: i64,
    pub asked_by: i64,
    pub question: String,
    pub created_at: UnixMillis,
}

impl Processor<InsertQuestion> for DatabaseProcessor {
    type Output = i64;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:InsertQuestion")]
    async fn process(&self, insert: InsertQuestion) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO questions (event_id, asked_by, question, votes, created_at) \
             VALUES (?, ?, ?, 0, ?)",
        )
        .bind(insert.event_id)
        .bind(insert.asked_by)
        .bind(&insert.question)
        .bind(insert.created_at)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GetQuestionById {
    pub question_id: i64,
}

impl Processor<GetQuestionById> for DatabaseProcessor {
    type Output = Option<Question>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetQuestionById")]
    async fn process(&self, query: GetQuestionById) -> Result<Option<Question>, sqlx::Error> {
        sqlx::query_as::<_, Question>(
            "SELECT question_id, event_id, asked_by, question, votes, created_at \
             FROM questions WHERE question_id = ?",
        )
        .bind(query.question_id)
        .fetch_optional(&self.pool)
        .await
    }
}

/// Question joined with its event's creator, for delete authorization.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct QuestionOwnership {
    pub question_id: i64,
    pub event_id: i64,
    pub asked_by: i64,
    pub event_creator: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct GetQuestionOwnership {
    pub question_id: i64,
}

impl Processor<GetQuestionOwnership> for DatabaseProcessor {
    type Output = Option<QuestionOwnership>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetQuestionOwnership")]
    async fn process(
        &self,
        query: GetQuestionOwnership,
    ) -> Result<Option<QuestionOwnership>, sqlx::Error> {
        sqlx::query_as::<_, QuestionOwnership>(
            "SELECT q.question_id, q.event_id, q.asked_by, e.creator_id AS event_creator \
             FROM questions q JOIN events e ON q.event_id = e.event_id \
             WHERE q.question_id = ?",
        )
        .bind(query.question_id)
        .fetch_optional(&self.pool)
        .await
    }
}

/// Questions of an event, most-voted first.
#[derive(Debug, Clone, Copy)]
pub struct ListEventQuestions {
    pub event_id: i64,
}

impl Processor<ListEventQuestions> for DatabaseProcessor {
    type Output = Vec<Question>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListEventQuestions")]
    async fn process(&self, query: ListEventQuestions) -> Result<Vec<Question>, sqlx::Error> {
        sqlx::query_as::<_, Question>(
            "SELECT question_id, event_id, asked_by, question, votes, created_at \
             FROM questions WHERE event_id = ? \
             ORDER BY votes DESC, question_id",
        )
        .bind(query.event_id)
        .fetch_all(&self.pool)
        .await
    }
}

impl Question {
    /// Delete a question together with its votes.
    pub async fn delete_with_votes_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        question_id: i64,
    ) -> Result<u64, sqlx::Error> {
        sqlx::query("DELETE FROM votes WHERE question_id = ?")
            .bind(question_id)
            .execute(&mut **tx)
            .await?;
        let result = sqlx::query("DELETE FROM questions WHERE question_id = ?")
            .bind(question_id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn increment_votes_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        question_id: i64,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE questions SET votes = votes + 1 WHERE question_id = ?")
            .bind(question_id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }

    /// Decrement the counter, floored at zero.
    pub async fn decrement_votes_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        question_id: i64,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE questions SET votes = votes - 1 WHERE question_id = ? AND votes > 0",
        )
        .bind(question_id)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete all questions (and their votes) of an event. Only the
    /// hard-delete path uses this.
    pub async fn remove_all_for_event_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        event_id: i64,
    ) -> Result<u64, sqlx::Error> {
        sqlx::query(
            "DELETE FROM votes WHERE question_id IN \
                 (SELECT question_id FROM questions WHERE event_id = ?)",
        )
        .bind(event_id)
        .execute(&mut **tx)
        .await?;
        let result = sqlx::query("DELETE FROM questions WHERE event_id = ?")
            .bind(event_id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }
}
