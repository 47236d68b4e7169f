//! Question board: attendees and creators raise questions on an event,
//! everyone with an account upvotes at most once.
//!
//! Voting reuses the membership primitive that backs the attendance
//! ledger (a vote is a `(question_id, voter_id)` fact with no capacity
//! bound) and keeps the denormalized counter on the question row in the
//! same transaction as the fact itself.

use kanau::processor::Processor;
use sqlx::SqlitePool;

use crate::entities::attendees::AttendeeExists;
use crate::entities::events::GetEventById;
use crate::entities::questions::{
    GetQuestionById, GetQuestionOwnership, InsertQuestion, Question, VOTE_MEMBERSHIP,
};
use crate::entities::{EventStatus, UnixMillis};
use crate::error::DomainError;
use crate::framework::DatabaseProcessor;
use crate::membership::MembershipWrite;

const MIN_QUESTION_LEN: usize = 5;
const MAX_QUESTION_LEN: usize = 500;

pub struct QuestionBoard {
    pool: SqlitePool,
}

impl QuestionBoard {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn processor(&self) -> DatabaseProcessor {
        DatabaseProcessor {
            pool: self.pool.clone(),
        }
    }

    /// Ask a question on an event. Open to the creator and registered
    /// attendees only.
    #[tracing::instrument(skip(self, question), err)]
    pub async fn ask(
        &self,
        event_id: i64,
        user_id: i64,
        question: &str,
        now: UnixMillis,
    ) -> Result<i64, DomainError> {
        let question = question.trim();
        if question.len() < MIN_QUESTION_LEN {
            return Err(DomainError::validation(format!(
                "question must be at least {MIN_QUESTION_LEN} characters"
            )));
        }
        if question.len() > MAX_QUESTION_LEN {
            return Err(DomainError::validation(format!(
                "question must be at most {MAX_QUESTION_LEN} characters"
            )));
        }

        let processor = self.processor();
        let event = processor
            .process(GetEventById { event_id })
            .await?
            .ok_or(DomainError::NotFound("event"))?;
        if event.status == EventStatus::Archived {
            return Err(DomainError::Forbidden(
                "questions are closed on archived events",
            ));
        }
        let is_attendee = processor
            .process(AttendeeExists { event_id, user_id })
            .await?;
        if event.creator_id != user_id && !is_attendee {
            return Err(DomainError::Forbidden(
                "only the creator or registered attendees can ask questions",
            ));
        }

        let question_id = processor
            .process(InsertQuestion {
                event_id,
                asked_by: user_id,
                question: question.to_owned(),
                created_at: now,
            })
            .await?;
        Ok(question_id)
    }

    /// Delete a question. Allowed for its author and for the event
    /// creator; votes go with it.
    #[tracing::instrument(skip(self), err)]
    pub async fn remove(&self, question_id: i64, actor_id: i64) -> Result<(), DomainError> {
        let ownership = self
            .processor()
            .process(GetQuestionOwnership { question_id })
            .await?
            .ok_or(DomainError::NotFound("question"))?;
        if ownership.asked_by != actor_id && ownership.event_creator != actor_id {
            return Err(DomainError::Forbidden(
                "only the question author or the event creator can delete a question",
            ));
        }

        let mut tx = self.pool.begin().await?;
        Question::delete_with_votes_tx(&mut tx, question_id).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Record an upvote, at most once per user and question.
    #[tracing::instrument(skip(self), err)]
    pub async fn upvote(
        &self,
        question_id: i64,
        voter_id: i64,
        now: UnixMillis,
    ) -> Result<(), DomainError> {
        self.processor()
            .process(GetQuestionById { question_id })
            .await?
            .ok_or(DomainError::NotFound("question"))?;

        let mut tx = self.pool.begin().await?;
        let outcome = VOTE_MEMBERSHIP
            .insert_if_absent(&mut tx, question_id, voter_id, now, None)
            .await?;
        match outcome {
            MembershipWrite::Inserted => {
                Question::increment_votes_tx(&mut tx, question_id).await?;
                tx.commit().await?;
                Ok(())
            }
            MembershipWrite::Duplicate => Err(DomainError::Forbidden(
                "you have already voted on this question",
            )),
            // Votes carry no capacity guard; the primitive cannot report
            // exhaustion here.
            MembershipWrite::CapacityExhausted => Err(DomainError::Forbidden(
                "you have already voted on this question",
            )),
        }
    }

    /// Remove a previously recorded upvote.
    #[tracing::instrument(skip(self), err)]
    pub async fn retract_vote(&self, question_id: i64, voter_id: i64) -> Result<(), DomainError> {
        self.processor()
            .process(GetQuestionById { question_id })
            .await?
            .ok_or(DomainError::NotFound("question"))?;

        let mut tx = self.pool.begin().await?;
        let deleted = sqlx::query("DELETE FROM votes WHERE question_id = ? AND voter_id = ?")
            .bind(question_id)
            .bind(voter_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if deleted == 0 {
            return Err(DomainError::Forbidden(
                "you have not voted on this question",
            ));
        }
        Question::decrement_votes_tx(&mut tx, question_id).await?;
        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registration::RegistrationService;
    use crate::testing;

    async fn votes_of(pool: &SqlitePool, question_id: i64) -> i64 {
        sqlx::query_scalar("SELECT votes FROM questions WHERE question_id = ?")
            .bind(question_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn asking_requires_creator_or_attendee() {
        let db = testing::test_db().await;
        let creator = testing::seed_user(&db.pool, "ada", "ada@example.com").await;
        let attendee = testing::seed_user(&db.pool, "bob", "bob@example.com").await;
        let stranger = testing::seed_user(&db.pool, "eve", "eve@example.com").await;
        let event_id = testing::seed_event(&db.pool, creator, 1_000, 2_000, 5).await;
        RegistrationService::new(db.pool.clone())
            .register(event_id, attendee, 500)
            .await
            .unwrap();

        let board = QuestionBoard::new(db.pool.clone());
        board.ask(event_id, creator, "will there be food?", 600).await.unwrap();
        board.ask(event_id, attendee, "is there parking?", 600).await.unwrap();
        assert!(matches!(
            board.ask(event_id, stranger, "can I come too?", 600).await,
            Err(DomainError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn question_text_bounds_are_enforced_after_trimming() {
        let db = testing::test_db().await;
        let creator = testing::seed_user(&db.pool, "ada", "ada@example.com").await;
        let event_id = testing::seed_event(&db.pool, creator, 1_000, 2_000, 5).await;
        let board = QuestionBoard::new(db.pool.clone());

        assert!(matches!(
            board.ask(event_id, creator, "  hm  ", 600).await,
            Err(DomainError::Validation(_))
        ));
        let long = "x".repeat(501);
        assert!(matches!(
            board.ask(event_id, creator, &long, 600).await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn archived_events_take_no_questions() {
        let db = testing::test_db().await;
        let creator = testing::seed_user(&db.pool, "ada", "ada@example.com").await;
        let event_id = testing::seed_event(&db.pool, creator, 1_000, 2_000, 5).await;
        crate::lifecycle::archive(&db.pool, event_id, creator)
            .await
            .unwrap();

        let board = QuestionBoard::new(db.pool.clone());
        assert!(matches!(
            board.ask(event_id, creator, "anyone there?", 600).await,
            Err(DomainError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn delete_is_author_or_event_creator_only() {
        let db = testing::test_db().await;
        let creator = testing::seed_user(&db.pool, "ada", "ada@example.com").await;
        let attendee = testing::seed_user(&db.pool, "bob", "bob@example.com").await;
        let stranger = testing::seed_user(&db.pool, "eve", "eve@example.com").await;
        let event_id = testing::seed_event(&db.pool, creator, 1_000, 2_000, 5).await;
        RegistrationService::new(db.pool.clone())
            .register(event_id, attendee, 500)
            .await
            .unwrap();

        let board = QuestionBoard::new(db.pool.clone());
        let by_attendee = board
            .ask(event_id, attendee, "is there parking?", 600)
            .await
            .unwrap();

        assert!(matches!(
            board.remove(by_attendee, stranger).await,
            Err(DomainError::Forbidden(_))
        ));
        // The event creator may prune anyone's question.
        board.remove(by_attendee, creator).await.unwrap();
        assert!(matches!(
            board.remove(by_attendee, creator).await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn double_votes_are_rejected_and_counter_stays_in_step() {
        let db = testing::test_db().await;
        let creator = testing::seed_user(&db.pool, "ada", "ada@example.com").await;
        let voter = testing::seed_user(&db.pool, "bob", "bob@example.com").await;
        let event_id = testing::seed_event(&db.pool, creator, 1_000, 2_000, 5).await;
        let question_id =
            testing::seed_question(&db.pool, event_id, creator, "best crate?").await;

        let board = QuestionBoard::new(db.pool.clone());
        board.upvote(question_id, voter, 600).await.unwrap();
        assert!(matches!(
            board.upvote(question_id, voter, 601).await,
            Err(DomainError::Forbidden(_))
        ));
        assert_eq!(votes_of(&db.pool, question_id).await, 1);

        board.retract_vote(question_id, voter).await.unwrap();
        assert_eq!(votes_of(&db.pool, question_id).await, 0);
        assert!(matches!(
            board.retract_vote(question_id, voter).await,
            Err(DomainError::Forbidden(_))
        ));
        assert_eq!(votes_of(&db.pool, question_id).await, 0);
    }

    #[tokio::test]
    async fn votes_on_missing_questions_are_not_found() {
        let db = testing::test_db().await;
        let voter = testing::seed_user(&db.pool, "bob", "bob@example.com").await;
        let board = QuestionBoard::new(db.pool.clone());
        assert!(matches!(
            board.upvote(404, voter, 600).await,
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(
            board.retract_vote(404, voter).await,
            Err(DomainError::NotFound(_))
        ));
    }
}
