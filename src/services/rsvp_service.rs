use crate::api::schemas::RsvpForm;
use crate::error::{AppError, Result};
use crate::services::events::{EventSink, PipelineEvent};
use crate::services::notification::dispatcher::NotificationDispatcher;
use crate::services::rate_limit_service::RateLimitService;
use crate::services::store::SubmissionStore;
use crate::services::validation;
use std::net::IpAddr;
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::Instrument;

/// Success outcome of one submission. Notification outcomes are deliberately
/// absent: persistence is the sole success criterion.
#[derive(Debug, Clone, Copy)]
pub struct SubmissionAccepted {
    pub id: i64,
}

/// Orchestrates one submission: validate, rate-limit, persist, then dispatch
/// notifications on a detached task.
#[derive(Clone, Debug)]
pub struct RsvpService {
    store: Arc<dyn SubmissionStore>,
    rate_limiter: RateLimitService,
    dispatcher: NotificationDispatcher,
    sink: Arc<dyn EventSink>,
}

impl RsvpService {
    #[must_use]
    pub fn new(
        store: Arc<dyn SubmissionStore>,
        rate_limiter: RateLimitService,
        dispatcher: NotificationDispatcher,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self { store, rate_limiter, dispatcher, sink }
    }

    /// Runs the submission pipeline for one RSVP attempt.
    ///
    /// # Errors
    /// Returns `AppError::Validation` with every invalid field,
    /// `AppError::RateLimited` when a submission ceiling is reached, or
    /// `AppError::Database` when the insert (or a rate-limit count) fails.
    #[tracing::instrument(err(level = "warn"), skip(self, form, user_agent), fields(origin = %origin))]
    pub async fn submit(
        &self,
        form: &RsvpForm,
        origin: IpAddr,
        user_agent: Option<String>,
    ) -> Result<SubmissionAccepted> {
        let submitted_at = OffsetDateTime::now_utc();

        let submission = match validation::validate(form, submitted_at, origin, user_agent) {
            Ok(submission) => submission,
            Err(fields) => {
                self.sink.record(&PipelineEvent::ValidationFailed {
                    fields: fields.iter().map(|e| e.field).collect(),
                });
                return Err(AppError::Validation(fields));
            }
        };

        let decision = self.rate_limiter.check(&submission.email, origin, submitted_at).await?;
        if !decision.allowed {
            self.sink.record(&PipelineEvent::RateLimited {
                email: submission.email.clone(),
                origin,
                email_count: decision.email_count,
                origin_count: decision.origin_count,
            });
            return Err(AppError::RateLimited);
        }

        let id = match self.store.insert(&submission).await {
            Ok(id) => id,
            Err(e) => {
                self.sink.record(&PipelineEvent::PersistenceFailed { error: e.to_string() });
                return Err(e);
            }
        };
        self.sink.record(&PipelineEvent::SubmissionStored { id });

        // The row is durable; the response no longer depends on anything below.
        // Notification retries outlive the request on a detached task.
        let dispatcher = self.dispatcher.clone();
        tokio::spawn(
            async move {
                dispatcher.dispatch(id, &submission).await;
            }
            .instrument(tracing::info_span!("dispatch_notifications", id)),
        );

        Ok(SubmissionAccepted { id })
    }
}
