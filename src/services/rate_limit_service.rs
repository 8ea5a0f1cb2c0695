use crate::config::RateLimitConfig;
use crate::error::Result;
use crate::services::store::SubmissionStore;
use std::net::IpAddr;
use std::sync::Arc;
use time::{Duration, OffsetDateTime};

/// Outcome of one rate-limit check, with the counts that produced it.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub email_count: i64,
    pub origin_count: i64,
}

/// Soft limiter over persisted submission history.
///
/// The check is read-only; the insert that follows it is what counts toward
/// future windows. Two concurrent submissions from the same identity can both
/// pass before either is persisted. That race is accepted: this is a soft
/// limit, not a hard quota.
#[derive(Clone, Debug)]
pub struct RateLimitService {
    store: Arc<dyn SubmissionStore>,
    config: RateLimitConfig,
}

impl RateLimitService {
    #[must_use]
    pub fn new(store: Arc<dyn SubmissionStore>, config: RateLimitConfig) -> Self {
        Self { store, config }
    }

    /// Checks whether a submission attempt is within the per-email and
    /// per-origin ceilings for the trailing window.
    ///
    /// # Errors
    /// Returns `AppError::Database` if a count query fails.
    #[tracing::instrument(level = "debug", skip(self, email), fields(origin = %origin))]
    pub async fn check(&self, email: &str, origin: IpAddr, now: OffsetDateTime) -> Result<RateLimitDecision> {
        let floor = now - Duration::seconds(self.config.window_secs);

        let email_count = self.store.count_by_email_since(email, floor).await?;
        let origin_count = self.store.count_by_origin_since(origin, floor).await?;

        let allowed = email_count < self.config.max_per_email && origin_count < self.config.max_per_origin;

        Ok(RateLimitDecision { allowed, email_count, origin_count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::submission::{Attendance, Locale, Submission};
    use crate::error::Result;
    use async_trait::async_trait;
    use std::net::Ipv4Addr;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct MemoryStore {
        rows: Mutex<Vec<Submission>>,
    }

    #[async_trait]
    impl SubmissionStore for MemoryStore {
        async fn insert(&self, submission: &Submission) -> Result<i64> {
            let mut rows = self.rows.lock().expect("store lock");
            rows.push(submission.clone());
            Ok(rows.len() as i64)
        }

        async fn count_by_email_since(&self, email: &str, floor: OffsetDateTime) -> Result<i64> {
            let rows = self.rows.lock().expect("store lock");
            Ok(rows.iter().filter(|s| s.email == email && s.submitted_at >= floor).count() as i64)
        }

        async fn count_by_origin_since(&self, origin: IpAddr, floor: OffsetDateTime) -> Result<i64> {
            let rows = self.rows.lock().expect("store lock");
            Ok(rows.iter().filter(|s| s.origin == origin && s.submitted_at >= floor).count() as i64)
        }
    }

    fn submission(email: &str, origin: IpAddr, submitted_at: OffsetDateTime) -> Submission {
        Submission {
            first_name: "Ana".to_string(),
            last_name: "Pop".to_string(),
            email: email.to_string(),
            attendance: Attendance::Attending,
            vegetarian: false,
            plus_one: None,
            message: None,
            locale: Locale::En,
            submitted_at,
            origin,
            user_agent: None,
        }
    }

    fn config() -> RateLimitConfig {
        RateLimitConfig { max_per_email: 10, max_per_origin: 10, window_secs: 3600 }
    }

    const ORIGIN_A: IpAddr = IpAddr::V4(Ipv4Addr::new(203, 0, 113, 7));
    const ORIGIN_B: IpAddr = IpAddr::V4(Ipv4Addr::new(198, 51, 100, 4));

    #[tokio::test]
    async fn denies_the_eleventh_submission_from_one_email() {
        let store = Arc::new(MemoryStore::default());
        let now = OffsetDateTime::UNIX_EPOCH + Duration::hours(48);

        for i in 0..10u8 {
            // Spread origins so only the email ceiling is in play.
            let origin = IpAddr::V4(Ipv4Addr::new(10, 0, 0, i));
            store.insert(&submission("ana@example.com", origin, now - Duration::minutes(5))).await.expect("insert");
        }

        let limiter = RateLimitService::new(store, config());
        let decision = limiter.check("ana@example.com", ORIGIN_A, now).await.expect("check");
        assert!(!decision.allowed);
        assert_eq!(decision.email_count, 10);

        let other = limiter.check("ion@example.com", ORIGIN_B, now).await.expect("check");
        assert!(other.allowed);
        assert_eq!(other.email_count, 0);
    }

    #[tokio::test]
    async fn allows_under_the_ceiling() {
        let store = Arc::new(MemoryStore::default());
        let now = OffsetDateTime::UNIX_EPOCH + Duration::hours(48);

        for _ in 0..9 {
            store.insert(&submission("ana@example.com", ORIGIN_A, now - Duration::minutes(5))).await.expect("insert");
        }

        let limiter = RateLimitService::new(store, config());
        let decision = limiter.check("ana@example.com", ORIGIN_A, now).await.expect("check");
        assert!(decision.allowed);
        assert_eq!(decision.email_count, 9);
        assert_eq!(decision.origin_count, 9);
    }

    #[tokio::test]
    async fn ignores_submissions_outside_the_window() {
        let store = Arc::new(MemoryStore::default());
        let now = OffsetDateTime::UNIX_EPOCH + Duration::hours(48);

        for _ in 0..10 {
            store.insert(&submission("ana@example.com", ORIGIN_A, now - Duration::hours(2))).await.expect("insert");
        }

        let limiter = RateLimitService::new(store, config());
        let decision = limiter.check("ana@example.com", ORIGIN_A, now).await.expect("check");
        assert!(decision.allowed);
        assert_eq!(decision.email_count, 0);
    }

    #[tokio::test]
    async fn denies_on_the_origin_ceiling_alone() {
        let store = Arc::new(MemoryStore::default());
        let now = OffsetDateTime::UNIX_EPOCH + Duration::hours(48);

        for i in 0..10 {
            let email = format!("guest{i}@example.com");
            store.insert(&submission(&email, ORIGIN_A, now - Duration::minutes(5))).await.expect("insert");
        }

        let limiter = RateLimitService::new(store, config());
        let decision = limiter.check("ana@example.com", ORIGIN_A, now).await.expect("check");
        assert!(!decision.allowed);
        assert_eq!(decision.email_count, 0);
        assert_eq!(decision.origin_count, 10);
    }
}
