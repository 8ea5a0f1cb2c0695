use crate::adapters::database::DbPool;
use crate::domain::submission::Submission;
use crate::error::Result;
use crate::services::store::SubmissionStore;
use async_trait::async_trait;
use std::net::IpAddr;
use time::OffsetDateTime;

/// Postgres-backed submission store. Inserts are single-row and append-only;
/// the windowed counts back the rate limiter.
#[derive(Clone, Debug)]
pub struct RsvpRepository {
    pool: DbPool,
}

impl RsvpRepository {
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubmissionStore for RsvpRepository {
    #[tracing::instrument(level = "debug", skip(self, submission))]
    async fn insert(&self, submission: &Submission) -> Result<i64> {
        let companion = submission.plus_one.as_ref();

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO rsvps (
                first_name, last_name, email, attending, vegetarian,
                plus_one, plus_one_first_name, plus_one_last_name, plus_one_vegetarian,
                message, language, submitted_at, ip_address, user_agent
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING id
            "#,
        )
        .bind(&submission.first_name)
        .bind(&submission.last_name)
        .bind(&submission.email)
        .bind(submission.attendance.as_str())
        .bind(submission.vegetarian)
        .bind(companion.is_some())
        .bind(companion.map(|c| c.first_name.as_str()))
        .bind(companion.map(|c| c.last_name.as_str()))
        .bind(companion.is_some_and(|c| c.vegetarian))
        .bind(submission.message.as_deref())
        .bind(submission.locale.as_str())
        .bind(submission.submitted_at)
        .bind(submission.origin.to_string())
        .bind(submission.user_agent.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    #[tracing::instrument(level = "debug", skip(self, email))]
    async fn count_by_email_since(&self, email: &str, floor: OffsetDateTime) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM rsvps WHERE email = $1 AND submitted_at >= $2")
                .bind(email)
                .bind(floor)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn count_by_origin_since(&self, origin: IpAddr, floor: OffsetDateTime) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM rsvps WHERE ip_address = $1 AND submitted_at >= $2")
                .bind(origin.to_string())
                .bind(floor)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}
