use kanau::processor::Processor;

use crate::framework::DatabaseProcessor;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct User {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub session_token: Option<String>,
}

/// Public projection of a user row, embedded in event details and search
/// results.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct UserSummary {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<UserSummary> for gathr_sdk::objects::users::UserSummary {
    fn from(value: UserSummary) -> Self {
        Self {
            user_id: value.user_id,
            first_name: value.first_name,
            last_name: value.last_name,
            email: value.email,
        }
    }
}

/// Insert a new account row. The password hash is produced at the server
/// edge; this layer only stores it.
#[derive(Debug, Clone)]
pub struct InsertUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
}

impl Processor<InsertUser> for DatabaseProcessor {
    type Output = i64;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:InsertUser")]
    async fn process(&self, insert: InsertUser) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO users (first_name, last_name, email, password_hash) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(&insert.first_name)
        .bind(&insert.last_name)
        .bind(&insert.email)
        .bind(&insert.password_hash)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }
}

#[derive(Debug, Clone)]
pub struct GetUserByEmail {
    pub email: String,
}

impl Processor<GetUserByEmail> for DatabaseProcessor {
    type Output = Option<User>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetUserByEmail")]
    async fn process(&self, query: GetUserByEmail) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT user_id, first_name, last_name, email, password_hash, session_token \
             FROM users WHERE email = ?",
        )
        .bind(&query.email)
        .fetch_optional(&self.pool)
        .await
    }
}

/// Resolve an opaque session token to a user id.
#[derive(Debug, Clone)]
pub struct GetUserBySession {
    pub token: String,
}

impl Processor<GetUserBySession> for DatabaseProcessor {
    type Output = Option<i64>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetUserBySession")]
    async fn process(&self, query: GetUserBySession) -> Result<Option<i64>, sqlx::Error> {
        sqlx::query_scalar("SELECT user_id FROM users WHERE session_token = ?")
            .bind(&query.token)
            .fetch_optional(&self.pool)
            .await
    }
}

/// Set or clear (`None`) a user's session token.
#[derive(Debug, Clone)]
pub struct SetSessionToken {
    pub user_id: i64,
    pub token: Option<String>,
}

impl Processor<SetSessionToken> for DatabaseProcessor {
    type Output = u64;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:SetSessionToken")]
    async fn process(&self, update: SetSessionToken) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET session_token = ? WHERE user_id = ?")
            .bind(&update.token)
            .bind(update.user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[derive(Debug, Clone)]
pub struct GetUserSummary {
    pub user_id: i64,
}

impl Processor<GetUserSummary> for DatabaseProcessor {
    type Output = Option<UserSummary>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetUserSummary")]
    async fn process(&self, query: GetUserSummary) -> Result<Option<UserSummary>, sqlx::Error> {
        sqlx::query_as::<_, UserSummary>(
            "SELECT user_id, first_name, last_name, email FROM users WHERE user_id = ?",
        )
        .bind(query.user_id)
        .fetch_optional(&self.pool)
        .await
    }
}
