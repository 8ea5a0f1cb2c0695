use crate::config::EmailConfig;
use crate::domain::delivery::{Channel, DeliveryResult};
use crate::domain::submission::Submission;
use crate::services::events::{EventSink, PipelineEvent};
use crate::services::notification::composer::NotificationComposer;
use crate::services::notification::provider::OutboundEmail;
use crate::services::notification::sender::{RetryPolicy, RetryingSender};
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

#[derive(Debug)]
pub struct DispatchOutcome {
    pub guest: DeliveryResult,
    pub admin: DeliveryResult,
}

/// Issues both channel sends concurrently and independently. The failure of
/// one channel never cancels or alters the other, and the dispatcher itself
/// cannot fail: a panicked send task becomes a failure result.
#[derive(Clone, Debug)]
pub struct NotificationDispatcher {
    composer: NotificationComposer,
    sender: RetryingSender,
    sink: Arc<dyn EventSink>,
    from: String,
    admin_recipients: Vec<String>,
    guest_policy: RetryPolicy,
    admin_policy: RetryPolicy,
}

impl NotificationDispatcher {
    #[must_use]
    pub fn new(
        composer: NotificationComposer,
        sender: RetryingSender,
        sink: Arc<dyn EventSink>,
        config: &EmailConfig,
    ) -> Self {
        Self {
            composer,
            sender,
            sink,
            from: config.from.clone(),
            admin_recipients: config.admin_recipients.clone(),
            guest_policy: RetryPolicy {
                max_attempts: config.guest_max_attempts,
                base_delay: Duration::from_millis(config.guest_retry_base_ms),
            },
            admin_policy: RetryPolicy {
                max_attempts: config.admin_max_attempts,
                base_delay: Duration::from_millis(config.admin_retry_base_ms),
            },
        }
    }

    #[tracing::instrument(skip(self, submission), fields(id = id))]
    pub async fn dispatch(&self, id: i64, submission: &Submission) -> DispatchOutcome {
        let composed = self.composer.compose(submission);

        let guest_email = OutboundEmail {
            from: self.from.clone(),
            to: vec![submission.email.clone()],
            subject: composed.guest.subject,
            html: composed.guest.html,
            tags: composed.guest.tags,
        };
        let admin_email = OutboundEmail {
            from: self.from.clone(),
            to: self.admin_recipients.clone(),
            subject: composed.admin.subject,
            html: composed.admin.html,
            tags: composed.admin.tags,
        };

        let guest_task = {
            let sender = self.sender.clone();
            let policy = self.guest_policy;
            tokio::spawn(
                async move { sender.send(Channel::Guest, &guest_email, policy).await }.in_current_span(),
            )
        };
        let admin_task = {
            let sender = self.sender.clone();
            let policy = self.admin_policy;
            tokio::spawn(
                async move { sender.send(Channel::Admin, &admin_email, policy).await }.in_current_span(),
            )
        };

        let (guest, admin) = tokio::join!(guest_task, admin_task);
        let guest = guest.unwrap_or_else(|e| {
            DeliveryResult::Failed { error: format!("Guest delivery task failed: {e}"), attempts: 0 }
        });
        let admin = admin.unwrap_or_else(|e| {
            DeliveryResult::Failed { error: format!("Admin delivery task failed: {e}"), attempts: 0 }
        });

        self.sink.record(&PipelineEvent::DispatchSettled {
            id,
            guest_delivered: guest.is_delivered(),
            admin_delivered: admin.is_delivered(),
        });

        DispatchOutcome { guest, admin }
    }
}
