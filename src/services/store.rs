use crate::domain::submission::Submission;
use crate::error::Result;
use async_trait::async_trait;
use std::net::IpAddr;
use time::OffsetDateTime;

/// Durable append-only store for submissions.
///
/// The pipeline consumes this seam; it never updates or deletes rows. The
/// windowed counts read committed history only, which is what makes the rate
/// limiter a soft limit (see `RateLimitService`).
#[async_trait]
pub trait SubmissionStore: Send + Sync + std::fmt::Debug {
    /// Persists one submission and returns the new row id.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the insert fails.
    async fn insert(&self, submission: &Submission) -> Result<i64>;

    /// Counts prior submissions from an email address since `floor`.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    async fn count_by_email_since(&self, email: &str, floor: OffsetDateTime) -> Result<i64>;

    /// Counts prior submissions from an origin address since `floor`.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    async fn count_by_origin_since(&self, origin: IpAddr, floor: OffsetDateTime) -> Result<i64>;
}
